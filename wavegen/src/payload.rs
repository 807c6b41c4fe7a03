use std::{fmt, str::FromStr};

use num_traits::FromPrimitive;
use tinyvec::TinyVec;

use crate::{
    error::{Result, SynthError},
    timing::Level,
};

/// Payload bits in transmission order. Up to 64 bits are kept on the stack,
/// which covers the usual handful of bytes typed in by hand.
#[derive(Eq, PartialEq, Clone, Debug, Default)]
pub struct Payload(TinyVec<[Level; 64]>);

impl Payload {
    /// Parse a string of `0` and `1` characters. Anything else is rejected,
    /// including whitespace.
    pub fn parse(data: &str) -> Result<Self> {
        data.chars()
            .enumerate()
            .map(|(position, character)| {
                character
                    .to_digit(2)
                    .and_then(Level::from_u32)
                    .ok_or(SynthError::InvalidPayload {
                        position,
                        character,
                    })
            })
            .collect()
    }

    /// Parse hex digits as bytes, most significant bit first. Digits are
    /// taken in pairs; a trailing single digit is a byte on its own, so `"A"`
    /// is `00001010`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex
            .chars()
            .enumerate()
            .map(|(position, character)| {
                character
                    .to_digit(16)
                    .ok_or(SynthError::InvalidPayload {
                        position,
                        character,
                    })
            })
            .collect::<Result<Vec<u32>>>()?;

        Ok(digits
            .chunks(2)
            .flat_map(|pair| {
                let byte = pair.iter().fold(0, |acc, d| acc << 4 | d);
                msb_first(byte as u64, 8)
            })
            .collect())
    }

    pub fn bits(&self) -> &[Level] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Payload {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl FromIterator<Level> for Payload {
    fn from_iter<I: IntoIterator<Item = Level>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.0.iter() {
            write!(f, "{}", bit.bit())?;
        }
        Ok(())
    }
}

/// The low `width` bits of `value`, most significant first.
pub fn msb_first(value: u64, width: u32) -> impl Iterator<Item = Level> {
    (0..width)
        .rev()
        .map(move |i| Level::from((value >> i) & 1 == 1))
}
