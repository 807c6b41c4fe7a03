//! Value Change Dump output, so a trace can be opened in GTKWave or any other
//! waveform viewer.
//!
//! One tick is written as one nanosecond.

use std::io::{self, Write};

use crate::timing::{Level, Ticks, Trace};

/// VCD identifier codes use the printable characters `!` to `~`.
const ID_CHARS: usize = 94;

fn identifier(mut index: usize) -> String {
    let mut id = String::new();
    loop {
        id.push(char::from(b'!' + (index % ID_CHARS) as u8));
        index /= ID_CHARS;
        if index == 0 {
            return id;
        }
        index -= 1;
    }
}

/// Write `trace` as a VCD file with all channels as 1-bit wires inside a
/// module called `scope`.
pub fn write_vcd(trace: &Trace, scope: &str, out: &mut impl Write) -> io::Result<()> {
    let channels = trace.channels();
    let ids: Vec<String> = (0..channels.len()).map(identifier).collect();

    writeln!(out, "$version wavegen {} $end", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "$timescale 1ns $end")?;
    writeln!(out, "$scope module {scope} $end")?;
    for (channel, id) in channels.iter().zip(&ids) {
        writeln!(out, "$var wire 1 {id} {} $end", channel.name)?;
    }
    writeln!(out, "$upscope $end")?;
    writeln!(out, "$enddefinitions $end")?;

    writeln!(out, "#0")?;
    writeln!(out, "$dumpvars")?;
    for (channel, id) in channels.iter().zip(&ids) {
        writeln!(out, "{}{id}", channel.level_at(0).bit())?;
    }
    writeln!(out, "$end")?;

    // Merge the channels' transitions into one time ordered list. Anything at
    // time 0 is already in $dumpvars.
    let mut changes: Vec<(Ticks, usize, Level)> = channels
        .iter()
        .enumerate()
        .flat_map(|(index, channel)| {
            channel
                .transitions()
                .iter()
                .filter(|&&(time, _)| time > 0)
                .map(move |&(time, level)| (time, index, level))
        })
        .collect();
    changes.sort_unstable_by_key(|&(time, index, _)| (time, index));

    let mut now = 0;
    for (time, index, level) in changes {
        if time != now {
            writeln!(out, "#{time}")?;
            now = time;
        }
        writeln!(out, "{}{}", level.bit(), ids[index])?;
    }

    // Mark the end so viewers show the trailing hold.
    let end = trace.duration();
    if end > now {
        writeln!(out, "#{end}")?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;
    use crate::{options::Options, registry::synthesize};

    #[test]
    fn test_uart_dump() {
        let trace = synthesize("uart", "1", &Options::new()).unwrap();
        let mut out = Vec::new();
        write_vcd(&trace, "uart", &mut out).unwrap();

        let expected = format!(
            "$version wavegen {} $end\n\
             $timescale 1ns $end\n\
             $scope module uart $end\n\
             $var wire 1 ! TX $end\n\
             $upscope $end\n\
             $enddefinitions $end\n\
             #0\n\
             $dumpvars\n\
             1!\n\
             $end\n\
             #4\n\
             0!\n\
             #8\n\
             1!\n\
             #16\n",
            env!("CARGO_PKG_VERSION")
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_changes_are_time_ordered() {
        let trace = synthesize("i2c", "10110", &Options::new()).unwrap();
        let mut out = Vec::new();
        write_vcd(&trace, "i2c", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let times: Vec<u64> = text
            .lines()
            .filter_map(|l| l.strip_prefix('#'))
            .map(|t| t.parse().unwrap())
            .collect();
        assert_eq!(times.first(), Some(&0));
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(times.last(), Some(&trace.duration()));

        let value_changes = text
            .lines()
            .skip_while(|l| *l != "$end")
            .filter(|l| l.starts_with('0') || l.starts_with('1'))
            .count();
        let transitions: usize = trace
            .channels()
            .iter()
            .map(|c| c.transitions().len())
            .sum();
        assert_eq!(value_changes, transitions);
    }

    #[test]
    fn test_identifiers_unique() {
        assert_eq!(identifier(0), "!");
        assert_eq!(identifier(93), "~");
        let ids: HashSet<String> = (0..20000).map(identifier).collect();
        assert_eq!(ids.len(), 20000);
    }
}
