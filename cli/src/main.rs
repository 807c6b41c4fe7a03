use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use wavegen::{vcd::write_vcd, Options, Payload, Registry, Trace};

/// Synthesize protocol waveforms from a bit string.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Protocol: i2c, spi or uart.
    protocol: String,

    /// Payload bits, e.g. 10110010. Hex digits with --hex.
    data: String,

    /// Read the payload as hex bytes instead of bits.
    #[arg(long)]
    hex: bool,

    /// Protocol option as name=value, e.g. `-o clockPolarity=1`. Can be
    /// repeated.
    #[arg(short = 'o', long = "option", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `{"signals": [{"name": ..., "data": [...]}]}`
    Json,
    /// Value Change Dump, for GTKWave and friends.
    Vcd,
}

fn parse_option(s: &str) -> Result<(String, String)> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_owned(), value.to_owned()))
        }
        _ => bail!("expected name=value, got {s:?}"),
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    // Values stay strings, exactly as they would arrive in a query string.
    let options: Options = args.options.iter().cloned().collect();

    let data = if args.hex {
        match Payload::from_hex(args.data.trim()) {
            Ok(p) => p.to_string(),
            Err(e) => return report(&e),
        }
    } else {
        args.data.clone()
    };

    let registry = Registry::default();
    let trace = match registry.synthesize(&args.protocol, &data, &options) {
        Ok(t) => t,
        Err(e) => return report(&e),
    };
    info!(
        "{} channels, {} ticks",
        trace.channels().len(),
        trace.duration()
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_trace(&trace, &args, &mut BufWriter::new(file))?;
        }
        None => write_trace(&trace, &args, &mut io::stdout().lock())?,
    }
    Ok(ExitCode::SUCCESS)
}

fn write_trace(trace: &Trace, args: &Args, out: &mut impl Write) -> Result<()> {
    match args.format {
        Format::Json => {
            serde_json::to_writer(&mut *out, &trace.to_signals())?;
            writeln!(out)?;
        }
        Format::Vcd => {
            let scope = args.protocol.trim().to_ascii_lowercase();
            write_vcd(trace, &scope, &mut *out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Engine errors go to stderr in their wire form.
fn report(e: &wavegen::SynthError) -> Result<ExitCode> {
    eprintln!("{}", serde_json::to_string(&e.report())?);
    Ok(ExitCode::from(2))
}
