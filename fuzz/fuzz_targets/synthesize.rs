#![no_main]

use libfuzzer_sys::fuzz_target;
use wavegen::{synthesize, Options};

// First byte picks the protocol and mode, the rest is the payload. Most inputs
// are rejected as invalid payloads, which is fine; they must just not panic.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let protocol = ["i2c", "spi", "uart", "bogus"][(selector & 0b11) as usize];
    let options = Options::new()
        .with("clockDivisor", u64::from(selector >> 5) + 1)
        .with("clockPhase", u64::from((selector >> 2) & 1))
        .with("clockPolarity", u64::from((selector >> 3) & 1));
    let options = if protocol == "spi" { options } else { Options::new() };

    let payload = String::from_utf8_lossy(rest);
    if let Ok(trace) = synthesize(protocol, &payload, &options) {
        let duration = trace.duration();
        assert!(trace.channels().iter().all(|c| c.duration() == duration));
        for channel in trace.channels().iter() {
            assert!(channel.transitions().windows(2).all(|w| w[0].0 < w[1].0));
        }
        let _ = trace.to_signals();
    }
});
