//! Protocol waveform synthesis.
//!
//! Expands a transaction (a bit string plus protocol options) into
//! cycle-accurate digital traces: SCL/SDA for I2C, CLK/MOSI/MISO/CS for SPI and
//! TX for UART, including START/STOP conditions, ACK slots, idle levels, parity
//! and stop bits.
//!
//! ```
//! use wavegen::{synthesize, Options};
//!
//! let trace = synthesize("uart", "101", &Options::new()).unwrap();
//! assert_eq!(trace.to_signals().signals[0].data, vec![0, 1, 0, 1, 1]);
//! ```

pub mod descriptor;
pub mod encoder;
pub mod error;
pub mod options;
pub mod payload;
pub mod registry;
pub mod signals;
pub mod timing;
pub mod vcd;

pub use descriptor::{Protocol, TransactionDescriptor};
pub use encoder::Encoder;
pub use error::{ErrorReport, Result, SynthError};
pub use options::Options;
pub use payload::Payload;
pub use registry::{synthesize, Registry};
pub use signals::{Signal, SignalSet};
pub use timing::{Channel, ChannelId, Level, Sampling, Ticks, TimeBase, Trace};
