//! UART: a single TX line, idle high.
//!
//! Each frame is a start bit (low), the data bits, an optional parity bit and
//! one or two stop bits (high), every one of them held for exactly one bit
//! period. The payload is split into frames of `dataBits` bits; without that
//! option the whole payload is sent as one frame.

use std::str::FromStr;

use log::{debug, info};

use crate::{
    descriptor::{Protocol, TransactionDescriptor},
    encoder::Encoder,
    error::{Result, SynthError},
    options::CLOCK_DIVISOR,
    timing::{Channel, Level, Sampling, Trace},
};

pub const DATA_BITS: &str = "dataBits";
pub const BIT_ORDER: &str = "bitOrder";
pub const PARITY: &str = "parity";
pub const STOP_BITS: &str = "stopBits";

const OPTIONS: &[&str] = &[CLOCK_DIVISOR, DATA_BITS, BIT_ORDER, PARITY, STOP_BITS];

/// Order in which the bits of a frame go on the wire.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BitOrder {
    /// Bits are sent in the order they are written.
    #[default]
    MsbFirst,
    /// Each frame is read as a number written MSB first and sent LSB first.
    LsbFirst,
}

impl FromStr for BitOrder {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "msb" | "msb-first" => Ok(BitOrder::MsbFirst),
            "lsb" | "lsb-first" => Ok(BitOrder::LsbFirst),
            _ => Err(SynthError::invalid_parameter(
                BIT_ORDER,
                format!("must be msb or lsb, got {s:?}"),
            )),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

impl Parity {
    /// The parity bit for `data`, or `None` if parity is off.
    pub fn bit(self, data: &[Level]) -> Option<Level> {
        let odd_ones = data.iter().filter(|&&b| b == Level::High).count() % 2 == 1;
        match self {
            Parity::None => None,
            Parity::Even => Some(Level::from(odd_ones)),
            Parity::Odd => Some(Level::from(!odd_ones)),
        }
    }
}

impl FromStr for Parity {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Parity::None),
            "even" => Ok(Parity::Even),
            "odd" => Ok(Parity::Odd),
            _ => Err(SynthError::invalid_parameter(
                PARITY,
                format!("must be none, even or odd, got {s:?}"),
            )),
        }
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct UartEncoder;

impl Encoder for UartEncoder {
    fn protocol(&self) -> Protocol {
        Protocol::Uart
    }

    fn options(&self) -> &'static [&'static str] {
        OPTIONS
    }

    fn encode(&self, descriptor: &TransactionDescriptor) -> Result<Trace> {
        let options = descriptor.options();
        let time_base = options.time_base()?;
        let bit = time_base.ticks_per_bit();
        let payload = descriptor.payload().bits();

        let bit_order = match options.text(BIT_ORDER)? {
            Some(s) => s.parse()?,
            None => BitOrder::default(),
        };
        let parity = match options.text(PARITY)? {
            Some(s) => s.parse()?,
            None => Parity::default(),
        };
        let stop_bits = options.integer(STOP_BITS, 1..=2)?.unwrap_or(1);

        // No `dataBits` means one frame holding the whole payload, even an
        // empty one.
        let frames: Vec<&[Level]> = match options.integer(DATA_BITS, 1..=16)? {
            Some(data_bits) => {
                let data_bits = data_bits as usize;
                if payload.len() % data_bits != 0 {
                    return Err(SynthError::invalid_parameter(
                        DATA_BITS,
                        format!(
                            "payload of {} bits is not a whole number of {}-bit frames",
                            payload.len(),
                            data_bits
                        ),
                    ));
                }
                payload.chunks(data_bits).collect()
            }
            None => vec![payload],
        };

        let mut tx = Channel::new("TX", Level::High);
        // One bit of idle before the first start bit.
        tx.append_level(Level::High, bit)?;
        let window = tx.duration();
        let mut slots = 0;

        for frame in frames.iter() {
            let data: Vec<Level> = match bit_order {
                BitOrder::MsbFirst => frame.to_vec(),
                BitOrder::LsbFirst => frame.iter().rev().copied().collect(),
            };
            let parity_bit = parity.bit(&data);
            debug!("frame {:?} parity {:?}", data, parity_bit);

            tx.append_level(Level::Low, bit)?;
            for &b in data.iter().chain(parity_bit.iter()) {
                tx.append_level(b, bit)?;
            }
            tx.append_level(Level::High, bit * stop_bits)?;

            slots += 1 + data.len() + parity_bit.iter().count() + stop_bits as usize;
        }

        tx.set_sampling(Sampling {
            offset: window + bit / 2,
            period: bit,
            count: slots,
        });

        let mut trace = Trace::new(time_base);
        trace.add_channel(tx);
        trace.align_channels();

        info!(
            "UART: {} frames, {} bit periods, {} ticks",
            frames.len(),
            slots,
            trace.duration()
        );
        Ok(trace)
    }
}
