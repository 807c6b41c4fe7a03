use std::collections::HashMap;

use log::info;

use crate::{
    descriptor::TransactionDescriptor,
    encoder::{Encoder, I2cEncoder, SpiEncoder, UartEncoder},
    error::{Result, SynthError},
    options::Options,
    payload::Payload,
    timing::Trace,
};

/// Maps protocol identifiers to encoders. `Registry::default()` knows about
/// I2C, SPI and UART.
pub struct Registry {
    encoders: HashMap<&'static str, Box<dyn Encoder>>,
}

impl Registry {
    /// A registry with no encoders.
    pub fn empty() -> Self {
        Self {
            encoders: HashMap::new(),
        }
    }

    /// Add an encoder under its protocol's name, returning the one it
    /// replaces.
    pub fn register(&mut self, encoder: Box<dyn Encoder>) -> Option<Box<dyn Encoder>> {
        self.encoders.insert(encoder.protocol().name(), encoder)
    }

    /// Find the encoder for `protocol`. Case and surrounding whitespace are
    /// ignored.
    pub fn lookup(&self, protocol: &str) -> Result<&dyn Encoder> {
        let key = protocol.trim().to_ascii_lowercase();
        self.encoders
            .get(key.as_str())
            .map(|e| e.as_ref())
            .ok_or_else(|| SynthError::UnknownProtocol(protocol.to_owned()))
    }

    /// Registered protocol names, sorted.
    pub fn protocols(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.encoders.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Validate the request, build the descriptor and run it through the
    /// matching encoder.
    pub fn synthesize(&self, protocol: &str, data: &str, options: &Options) -> Result<Trace> {
        let encoder = self.lookup(protocol)?;
        let payload = Payload::parse(data)?;
        options.check_known(encoder.options())?;

        let descriptor = TransactionDescriptor::new(encoder.protocol(), payload, options.clone());
        info!(
            "Synthesizing {} with {} payload bits",
            descriptor.protocol(),
            descriptor.payload().len()
        );
        encoder.encode(&descriptor)
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(I2cEncoder));
        registry.register(Box::new(SpiEncoder));
        registry.register(Box::new(UartEncoder));
        registry
    }
}

/// Synthesize a trace with the default encoders.
///
/// `data` must only contain `0` and `1`. Protocol specific parameters go in
/// `options`; see the encoder modules for their names.
pub fn synthesize(protocol: &str, data: &str, options: &Options) -> Result<Trace> {
    Registry::default().synthesize(protocol, data, options)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        descriptor::Protocol,
        test_util::{bit_strings, logging_setup},
        timing::{Channel, Level},
    };

    #[test]
    fn test_i2c() {
        logging_setup();
        let signals = synthesize("i2c", "11", &Options::new())
            .unwrap()
            .to_signals();
        assert_eq!(signals.signal("SCL").unwrap().data, vec![0, 1, 0, 1]);
        assert_eq!(signals.signal("SDA").unwrap().data, vec![1, 1]);
    }

    #[test]
    fn test_uart() {
        let signals = synthesize("uart", "101", &Options::new())
            .unwrap()
            .to_signals();
        assert_eq!(signals.signals.len(), 1);
        assert_eq!(signals.signals[0].name, "TX");
        assert_eq!(signals.signals[0].data, vec![0, 1, 0, 1, 1]);
    }

    #[test]
    fn test_unknown_protocol() {
        assert_eq!(
            synthesize("foo", "1", &Options::new()).unwrap_err(),
            SynthError::UnknownProtocol("foo".to_owned())
        );
        // The protocol is checked before the payload.
        assert_eq!(
            synthesize("foo", "abc", &Options::new()).unwrap_err().kind(),
            "UnknownProtocol"
        );
    }

    #[test]
    fn test_invalid_payload() {
        let e = synthesize("spi", "10a1", &Options::new()).unwrap_err();
        assert_eq!(
            e,
            SynthError::InvalidPayload {
                position: 2,
                character: 'a'
            }
        );
    }

    #[test]
    fn test_unknown_option() {
        let options = Options::new().with("clockPhase", 1);
        assert!(synthesize("spi", "1", &options).is_ok());
        let e = synthesize("uart", "1", &options).unwrap_err();
        assert_eq!(e.kind(), "InvalidParameter");
    }

    #[test]
    fn test_lookup_ignores_case() {
        let registry = Registry::default();
        assert_eq!(registry.lookup(" SPI ").unwrap().protocol(), Protocol::Spi);
        assert_eq!(registry.protocols(), vec!["i2c", "spi", "uart"]);
    }

    #[test]
    fn test_idempotent() {
        for protocol in ["i2c", "spi", "uart"] {
            for data in bit_strings(9) {
                let a = synthesize(protocol, &data, &Options::new()).unwrap();
                let b = synthesize(protocol, &data, &Options::new()).unwrap();
                assert_eq!(a, b);
                assert_eq!(a.to_signals(), b.to_signals());
            }
        }
    }

    #[test]
    fn test_channels_span_same_duration() {
        let spi = Options::new()
            .with("chipSelect", 1)
            .with("clockPhase", 1)
            .with("clockDivisor", 3);
        for data in bit_strings(10) {
            for (protocol, options) in [
                ("i2c", Options::new().with("address", 0x3C)),
                ("spi", spi.clone()),
                ("uart", Options::new().with("parity", "even")),
            ] {
                let trace = synthesize(protocol, &data, &options).unwrap();
                let duration = trace.duration();
                assert!(trace.channels().iter().all(|c| c.duration() == duration));
            }
        }
    }

    struct Constant;

    impl Encoder for Constant {
        fn protocol(&self) -> Protocol {
            Protocol::Uart
        }

        fn options(&self) -> &'static [&'static str] {
            &[]
        }

        fn encode(&self, descriptor: &TransactionDescriptor) -> Result<Trace> {
            let mut trace = Trace::new(Default::default());
            let mut tx = Channel::new("TX", Level::Low);
            tx.append_level(Level::High, 1 + descriptor.payload().len() as u64)?;
            trace.add_channel(tx);
            Ok(trace)
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = Registry::default();
        assert!(registry.register(Box::new(Constant)).is_some());
        let trace = registry.synthesize("uart", "111", &Options::new()).unwrap();
        assert_eq!(trace.duration(), 4);

        let registry = Registry::empty();
        assert!(registry.synthesize("uart", "1", &Options::new()).is_err());
    }
}
