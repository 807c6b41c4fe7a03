use std::fmt;

use serde::Serialize;

use crate::{options::Options, payload::Payload};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    I2c,
    Spi,
    Uart,
}

impl Protocol {
    /// The identifier callers use to select the protocol.
    pub fn name(self) -> &'static str {
        match self {
            Protocol::I2c => "i2c",
            Protocol::Spi => "spi",
            Protocol::Uart => "uart",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One transaction to synthesize. Built per request and handed to exactly one
/// encoder.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionDescriptor {
    protocol: Protocol,
    payload: Payload,
    options: Options,
}

impl TransactionDescriptor {
    pub fn new(protocol: Protocol, payload: Payload, options: Options) -> Self {
        Self {
            protocol,
            payload,
            options,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}
