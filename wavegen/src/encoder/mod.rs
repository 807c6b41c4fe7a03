//! Protocol encoders. Each one expands a transaction into a trace with its
//! own framing rules; they share nothing except the timing model.

pub mod i2c;
pub mod spi;
pub mod uart;

pub use i2c::I2cEncoder;
pub use spi::SpiEncoder;
pub use uart::UartEncoder;

use crate::{descriptor::Protocol, descriptor::TransactionDescriptor, error::Result, timing::Trace};

pub trait Encoder: Send + Sync {
    fn protocol(&self) -> Protocol;

    /// Names of the options this encoder understands. Anything else in the
    /// descriptor is rejected before `encode` is called.
    fn options(&self) -> &'static [&'static str];

    /// Build the trace. All channels of the result have the same duration.
    fn encode(&self, descriptor: &TransactionDescriptor) -> Result<Trace>;
}
