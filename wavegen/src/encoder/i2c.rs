//! I2C: SCL and SDA.
//!
//! ```text
//!        START   bit     bit     ACK     STOP
//! SCL  ⎺⎺⎺⎺⎺⎺⎺⎺\___/⎺⎺⎺\___/⎺⎺⎺\___/⎺⎺⎺\___/⎺⎺⎺⎺
//! SDA  ⎺⎺⎺⎺\___XXXXXXXXXXXXXXXXXX________/⎺⎺
//! ```
//!
//! Every bit slot is SCL low for half a bit then high for half a bit. SDA only
//! changes a quarter into the low half, except for the START (falls while SCL
//! is high) and STOP (rises while SCL is high) conditions. An ACK slot follows
//! each complete byte.

use log::{debug, info};

use crate::{
    descriptor::{Protocol, TransactionDescriptor},
    encoder::Encoder,
    error::{Result, SynthError},
    options::{Options, CLOCK_DIVISOR},
    payload::msb_first,
    timing::{Channel, Level, Sampling, Ticks, Trace},
};

pub const ADDRESS: &str = "address";
pub const ADDRESS_WIDTH: &str = "addressWidth";
pub const READ: &str = "read";

const OPTIONS: &[&str] = &[CLOCK_DIVISOR, ADDRESS, ADDRESS_WIDTH, READ];

/// First five bits of the first byte of a 10-bit address.
const TEN_BIT_PREFIX: u64 = 0b11110;

#[derive(Debug, Default, Copy, Clone)]
pub struct I2cEncoder;

impl Encoder for I2cEncoder {
    fn protocol(&self) -> Protocol {
        Protocol::I2c
    }

    fn options(&self) -> &'static [&'static str] {
        OPTIONS
    }

    fn encode(&self, descriptor: &TransactionDescriptor) -> Result<Trace> {
        let options = descriptor.options();
        let time_base = options.time_base()?;
        let q = time_base.quarter();
        let read = options.flag(READ)?.unwrap_or(false);

        let mut bits = address_phase(options, read)?;
        bits.extend_from_slice(descriptor.payload().bits());
        let bytes = (bits.len() + 7) / 8;

        let mut scl = Channel::new("SCL", Level::High);
        let mut sda = Channel::new("SDA", Level::High);

        // START: SDA falls half way through the high SCL lead-in.
        scl.append_level(Level::High, 2 * q)?;
        sda.append_level(Level::High, q)?;
        sda.append_level(Level::Low, q)?;
        debug!("START at {}", q);

        let window = scl.duration();
        let mut slots = 0;

        for (index, byte) in bits.chunks(8).enumerate() {
            for &bit in byte {
                clock_bit(&mut scl, &mut sda, bit, q)?;
                slots += 1;
            }
            // A trailing partial byte is never acknowledged.
            if byte.len() == 8 {
                // The master NACKs the last byte of a read.
                let ack = Level::from(read && index + 1 == bytes);
                debug!("byte {} {}", index, if ack == Level::Low { "ACK" } else { "NACK" });
                clock_bit(&mut scl, &mut sda, ack, q)?;
                slots += 1;
            }
        }

        // STOP: pull SDA low during the low half, release it while SCL is high.
        let stop = scl.duration();
        scl.append_level(Level::Low, 2 * q)?;
        scl.append_level(Level::High, 2 * q)?;
        sda.append_level(sda.level(), q)?;
        sda.append_level(Level::Low, 2 * q)?;
        sda.append_level(Level::High, q)?;
        debug!("STOP at {}", stop + 3 * q);

        scl.set_sampling(Sampling {
            offset: window + q,
            period: 2 * q,
            count: 2 * slots,
        });
        sda.set_sampling(Sampling {
            offset: window + 2 * q,
            period: 4 * q,
            count: slots,
        });

        let mut trace = Trace::new(time_base);
        trace.add_channel(scl);
        trace.add_channel(sda);
        trace.align_channels();

        info!(
            "I2C: {} bits, {} slots, {} ticks",
            bits.len(),
            slots,
            trace.duration()
        );
        Ok(trace)
    }
}

/// One clocked bit. SDA settles a quarter into the low half so that it is
/// stable across the rising edge.
fn clock_bit(scl: &mut Channel, sda: &mut Channel, bit: Level, q: Ticks) -> Result<()> {
    scl.append_level(Level::Low, 2 * q)?;
    scl.append_level(Level::High, 2 * q)?;
    sda.append_level(sda.level(), q)?;
    sda.append_level(bit, 3 * q)?;
    Ok(())
}

/// The address byte(s) to send before the payload, or nothing if no address
/// was given.
fn address_phase(options: &Options, read: bool) -> Result<Vec<Level>> {
    let width = options.integer(ADDRESS_WIDTH, 7..=10)?.unwrap_or(7);
    if width != 7 && width != 10 {
        return Err(SynthError::invalid_parameter(
            ADDRESS_WIDTH,
            format!("must be 7 or 10, got {width}"),
        ));
    }

    let address = match options.integer(ADDRESS, 0..=0x3FF)? {
        Some(a) => a,
        None => return Ok(Vec::new()),
    };
    if address >> width != 0 {
        return Err(SynthError::invalid_parameter(
            ADDRESS,
            format!("{address:#x} does not fit in {width} bits"),
        ));
    }

    let rw = Level::from(read);
    let mut bits = Vec::with_capacity(16);
    if width == 7 {
        bits.extend(msb_first(address, 7));
        bits.push(rw);
    } else {
        bits.extend(msb_first(TEN_BIT_PREFIX, 5));
        bits.extend(msb_first(address >> 8, 2));
        bits.push(rw);
        bits.extend(msb_first(address & 0xFF, 8));
    }
    Ok(bits)
}
