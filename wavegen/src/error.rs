use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = SynthError> = std::result::Result<T, E>;

/// Everything that can go wrong while synthesizing a trace. None of these are
/// fatal; the caller decides how to report them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    #[error("invalid payload character {character:?} at position {position}")]
    InvalidPayload { position: usize, character: char },

    #[error("unknown protocol {0:?}")]
    UnknownProtocol(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl SynthError {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Machine readable name of the error variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPayload { .. } => "InvalidPayload",
            Self::UnknownProtocol(_) => "UnknownProtocol",
            Self::InvalidParameter { .. } => "InvalidParameter",
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// The error as it goes over the wire: `{"kind": "...", "message": "..."}`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_report() {
        let e = SynthError::invalid_parameter("clockPhase", "must be 0 or 1");
        assert_eq!(e.kind(), "InvalidParameter");
        assert_eq!(
            serde_json::to_string(&e.report()).unwrap(),
            r#"{"kind":"InvalidParameter","message":"invalid parameter `clockPhase`: must be 0 or 1"}"#
        );

        let e = SynthError::InvalidPayload {
            position: 3,
            character: 'x',
        };
        assert_eq!(e.report().kind, "InvalidPayload");
        assert_eq!(
            e.to_string(),
            "invalid payload character 'x' at position 3"
        );
    }
}
