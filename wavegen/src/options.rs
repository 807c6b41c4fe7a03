//! Protocol parameters as a name → value map.
//!
//! Values may arrive as JSON numbers and booleans, or as strings when they come
//! straight from query parameters or the command line, so every getter accepts
//! both.

use std::{collections::BTreeMap, ops::RangeInclusive};

use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{Result, SynthError},
    timing::{Level, TimeBase},
};

/// Quarter-bit length in ticks. Shared by every encoder.
pub const CLOCK_DIVISOR: &str = "clockDivisor";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Reject any option that is not in `known`.
    pub fn check_known(&self, known: &[&str]) -> Result<()> {
        match self.names().find(|name| !known.contains(name)) {
            Some(name) => Err(SynthError::invalid_parameter(
                name,
                format!("unknown option; expected one of {known:?}"),
            )),
            None => Ok(()),
        }
    }

    /// An unsigned integer within `range`.
    pub fn integer(&self, name: &str, range: RangeInclusive<u64>) -> Result<Option<u64>> {
        let value = match self.get(name) {
            None => return Ok(None),
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
        };
        let value = value.ok_or_else(|| {
            SynthError::invalid_parameter(name, "must be a non-negative integer")
        })?;
        if !range.contains(&value) {
            return Err(SynthError::invalid_parameter(
                name,
                format!(
                    "must be between {} and {}, got {value}",
                    range.start(),
                    range.end()
                ),
            ));
        }
        Ok(Some(value))
    }

    /// A boolean, also accepted as 0/1 or "true"/"false".
    pub fn flag(&self, name: &str) -> Result<Option<bool>> {
        let value = match self.get(name) {
            None => return Ok(None),
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Some(Value::String(s)) => match s.trim() {
                "0" | "false" => Some(false),
                "1" | "true" => Some(true),
                _ => None,
            },
            Some(_) => None,
        };
        value
            .map(Some)
            .ok_or_else(|| SynthError::invalid_parameter(name, "must be 0, 1, true or false"))
    }

    /// A logic level given as 0 or 1.
    pub fn level(&self, name: &str) -> Result<Option<Level>> {
        Ok(self.integer(name, 0..=1)?.and_then(Level::from_u64))
    }

    /// A string. Numbers are converted to their decimal text.
    pub fn text(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.trim().to_owned())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(SynthError::invalid_parameter(name, "must be a string")),
        }
    }

    /// The time base selected by `clockDivisor`, 1 tick per quarter bit by
    /// default.
    pub fn time_base(&self) -> Result<TimeBase> {
        match self.integer(CLOCK_DIVISOR, 1..=TimeBase::MAX_CLOCK_DIVISOR)? {
            Some(divisor) => TimeBase::new(divisor),
            None => Ok(TimeBase::default()),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_integer() {
        let o = Options::new()
            .with("a", 3)
            .with("b", " 12 ")
            .with("c", -1)
            .with("d", "x")
            .with("e", 2.5);

        assert_eq!(o.integer("a", 0..=10), Ok(Some(3)));
        assert_eq!(o.integer("b", 0..=20), Ok(Some(12)));
        assert_eq!(o.integer("missing", 0..=1), Ok(None));
        assert!(o.integer("a", 4..=10).is_err());
        assert!(o.integer("c", 0..=10).is_err());
        assert!(o.integer("d", 0..=10).is_err());
        assert!(o.integer("e", 0..=10).is_err());
    }

    #[test]
    fn test_flag() {
        let o: Options = [
            ("a", Value::from(true)),
            ("b", Value::from(0)),
            ("c", Value::from("1")),
            ("d", Value::from("yes")),
            ("e", Value::from(2)),
        ]
        .into_iter()
        .collect();

        assert_eq!(o.flag("a"), Ok(Some(true)));
        assert_eq!(o.flag("b"), Ok(Some(false)));
        assert_eq!(o.flag("c"), Ok(Some(true)));
        assert!(o.flag("d").is_err());
        assert!(o.flag("e").is_err());
        assert_eq!(o.flag("f"), Ok(None));
    }

    #[test]
    fn test_level_and_text() {
        let o = Options::new()
            .with("p", "1")
            .with("q", 2)
            .with("m", 1011)
            .with("b", true);
        assert_eq!(o.level("p"), Ok(Some(Level::High)));
        assert!(o.level("q").is_err());
        assert_eq!(o.text("m"), Ok(Some("1011".to_owned())));
        assert!(o.text("b").is_err());
    }

    #[test]
    fn test_check_known() {
        let o = Options::new().with("clockPhase", 1).with("bogus", 1);
        let e = o.check_known(&["clockPhase"]).unwrap_err();
        assert!(matches!(e, SynthError::InvalidParameter { ref name, .. } if name == "bogus"));
        assert!(Options::new().check_known(&[]).is_ok());
    }

    #[test]
    fn test_time_base() {
        assert_eq!(Options::new().time_base(), Ok(TimeBase::default()));
        assert_eq!(
            Options::new()
                .with(CLOCK_DIVISOR, 5)
                .time_base()
                .unwrap()
                .ticks_per_bit(),
            20
        );
        assert!(Options::new().with(CLOCK_DIVISOR, 0).time_base().is_err());
    }

    #[test]
    fn test_deserialize() {
        let o: Options = serde_json::from_str(r#"{"clockPolarity": 1, "miso": "0110"}"#).unwrap();
        assert_eq!(o.level("clockPolarity"), Ok(Some(Level::High)));
        assert_eq!(o.text("miso"), Ok(Some("0110".to_owned())));
    }
}
