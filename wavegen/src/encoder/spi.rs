//! SPI: CLK, MOSI, and optionally MISO and an active-low CS.
//!
//! Each bit slot is CLK at its idle level (the polarity) for half a bit, then
//! at the active level for half a bit. With phase 0 data is sampled on the
//! leading (idle → active) edge so it changes in the middle of the idle half.
//! With phase 1 it is sampled on the trailing edge and changes in the middle of
//! the active half. Either way a data line never changes on the same tick as a
//! clock edge.

use log::{debug, info};

use crate::{
    descriptor::{Protocol, TransactionDescriptor},
    encoder::Encoder,
    error::{Result, SynthError},
    options::CLOCK_DIVISOR,
    payload::Payload,
    timing::{Channel, Level, Sampling, Ticks, Trace},
};

pub const CLOCK_POLARITY: &str = "clockPolarity";
pub const CLOCK_PHASE: &str = "clockPhase";
pub const MISO: &str = "miso";
pub const CHIP_SELECT: &str = "chipSelect";

const OPTIONS: &[&str] = &[CLOCK_DIVISOR, CLOCK_POLARITY, CLOCK_PHASE, MISO, CHIP_SELECT];

/// Which clock edge the receiver samples on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Leading,
    Trailing,
}

#[derive(Debug, Default, Copy, Clone)]
pub struct SpiEncoder;

impl Encoder for SpiEncoder {
    fn protocol(&self) -> Protocol {
        Protocol::Spi
    }

    fn options(&self) -> &'static [&'static str] {
        OPTIONS
    }

    fn encode(&self, descriptor: &TransactionDescriptor) -> Result<Trace> {
        let options = descriptor.options();
        let time_base = options.time_base()?;
        let q = time_base.quarter();

        let idle = options.level(CLOCK_POLARITY)?.unwrap_or(Level::Low);
        let phase = match options.level(CLOCK_PHASE)? {
            Some(Level::High) => Phase::Trailing,
            _ => Phase::Leading,
        };
        let chip_select = options.flag(CHIP_SELECT)?.unwrap_or(false);

        let mosi_bits = descriptor.payload().bits();
        let miso_bits = match options.text(MISO)? {
            Some(text) => {
                let miso = Payload::parse(&text).map_err(|e| {
                    SynthError::invalid_parameter(MISO, format!("not a bit string: {e}"))
                })?;
                if miso.len() != mosi_bits.len() {
                    return Err(SynthError::invalid_parameter(
                        MISO,
                        format!(
                            "has {} bits but the payload has {}",
                            miso.len(),
                            mosi_bits.len()
                        ),
                    ));
                }
                Some(miso)
            }
            None => None,
        };

        let n = mosi_bits.len() as Ticks;
        // Half a bit of idle clock either side of the data.
        let lead = 2 * q;
        let total = lead + 4 * q * n + lead;

        let (shift, sample) = match phase {
            Phase::Leading => (q, 2 * q),
            Phase::Trailing => (3 * q, 4 * q),
        };
        debug!(
            "SPI mode CPOL={} CPHA={:?}: data changes {} ticks into a slot",
            idle.bit(),
            phase,
            shift
        );

        let mut clk = Channel::new("CLK", idle);
        clk.append_level(idle, lead)?;
        for _ in 0..n {
            clk.append_level(idle, 2 * q)?;
            clk.append_level(!idle, 2 * q)?;
        }
        clk.append_level(idle, lead)?;
        clk.set_sampling(Sampling {
            offset: lead + q,
            period: 2 * q,
            count: 2 * mosi_bits.len(),
        });

        let data_sampling = Sampling {
            offset: lead + sample,
            period: 4 * q,
            count: mosi_bits.len(),
        };

        let mut trace = Trace::new(time_base);
        trace.add_channel(clk);
        trace.add_channel(shift_out("MOSI", mosi_bits, lead + shift, total, q, data_sampling)?);
        if let Some(miso) = miso_bits {
            trace.add_channel(shift_out("MISO", miso.bits(), lead + shift, total, q, data_sampling)?);
        }
        if chip_select {
            // Asserted a quarter into the lead-in, released a quarter before
            // the end; the clock is idle at both points.
            let mut cs = Channel::new("CS", Level::High);
            cs.append_level(Level::High, q)?;
            cs.append_level(Level::Low, total - 2 * q)?;
            cs.append_level(Level::High, q)?;
            cs.set_sampling(data_sampling);
            trace.add_channel(cs);
        }
        trace.align_channels();

        info!(
            "SPI: {} bits, {} channels, {} ticks",
            n,
            trace.channels().len(),
            trace.duration()
        );
        Ok(trace)
    }
}

/// A data line that is low until `first_change`, then holds each bit for one
/// bit period. The last bit is held to `total`.
fn shift_out(
    name: &str,
    bits: &[Level],
    first_change: Ticks,
    total: Ticks,
    q: Ticks,
    sampling: Sampling,
) -> Result<Channel> {
    let mut channel = Channel::new(name, Level::Low);
    channel.append_level(Level::Low, if bits.is_empty() { total } else { first_change })?;
    for (i, &bit) in bits.iter().enumerate() {
        let hold = if i + 1 < bits.len() {
            4 * q
        } else {
            total - channel.duration()
        };
        channel.append_level(bit, hold)?;
    }
    channel.set_sampling(sampling);
    Ok(channel)
}
