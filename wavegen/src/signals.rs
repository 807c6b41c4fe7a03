//! The serialized form of a trace, `{"signals": [{"name": ..., "data": [...]}]}`.
//!
//! Each channel becomes one value per sampling slot, which is the array shape
//! front-end renderers already draw.

use serde::{Deserialize, Serialize};

use crate::timing::Trace;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Signal {
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SignalSet {
    pub signals: Vec<Signal>,
}

impl SignalSet {
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Trace {
    pub fn to_signals(&self) -> SignalSet {
        SignalSet {
            signals: self
                .channels()
                .iter()
                .map(|channel| Signal {
                    name: channel.name.clone(),
                    data: channel.samples(),
                })
                .collect(),
        }
    }
}
