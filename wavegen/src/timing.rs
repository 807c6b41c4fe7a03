//! The shared time base and the channel/trace model that every encoder writes
//! into.
//!
//! A channel is stored as a list of transitions rather than one value per
//! tick, in the same way a VCD or FST file only records value changes. Time is
//! measured in virtual ticks. Encoders work in quarter bits, which is the
//! smallest interval needed to put a data change strictly between two clock
//! edges.

use std::ops::Not;

use derive_more::{From, Into};
use num_derive::FromPrimitive;
use typed_index_collections::TiVec;

use crate::error::{Result, SynthError};

pub type Ticks = u64;

#[derive(FromPrimitive, Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Level {
    #[default]
    Low = 0,
    High = 1,
}

impl Level {
    pub fn bit(self) -> u8 {
        self as u8
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

#[derive(From, Into, Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub struct ChannelId(pub usize);

/// The virtual clock shared by all channels of a trace. One bit period is four
/// quarters and a quarter is `clock_divisor` ticks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeBase {
    quarter: Ticks,
}

impl TimeBase {
    pub const MAX_CLOCK_DIVISOR: u64 = 65535;

    pub fn new(clock_divisor: u64) -> Result<Self> {
        if !(1..=Self::MAX_CLOCK_DIVISOR).contains(&clock_divisor) {
            return Err(SynthError::invalid_parameter(
                "clockDivisor",
                format!(
                    "must be between 1 and {}, got {clock_divisor}",
                    Self::MAX_CLOCK_DIVISOR
                ),
            ));
        }
        Ok(Self {
            quarter: clock_divisor,
        })
    }

    pub fn quarter(&self) -> Ticks {
        self.quarter
    }

    pub fn half(&self) -> Ticks {
        self.quarter * 2
    }

    pub fn ticks_per_bit(&self) -> Ticks {
        self.quarter * 4
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self { quarter: 1 }
    }
}

/// Where the legacy one-value-per-slot sample array is read from a channel.
/// Sample `i` is the level at `offset + i * period`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Sampling {
    pub offset: Ticks,
    pub period: Ticks,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub name: String,
    /// Level before the first transition (and before time 0).
    idle: Level,
    /// Strictly increasing times, alternating levels.
    transitions: Vec<(Ticks, Level)>,
    /// Running end time; everything before it has been written.
    end: Ticks,
    sampling: Sampling,
}

impl Channel {
    pub fn new(name: impl Into<String>, idle: Level) -> Self {
        Self {
            name: name.into(),
            idle,
            transitions: Vec::new(),
            end: 0,
            sampling: Sampling::default(),
        }
    }

    /// Hold `level` for `hold_ticks`, starting at the current end of the
    /// channel. Holding the level the channel is already at only extends it.
    pub fn append_level(&mut self, level: Level, hold_ticks: Ticks) -> Result<()> {
        if hold_ticks == 0 {
            return Err(SynthError::invalid_parameter(
                "holdTicks",
                format!("must be greater than zero (channel {})", self.name),
            ));
        }
        if level != self.level() {
            self.transitions.push((self.end, level));
        }
        self.end += hold_ticks;
        Ok(())
    }

    /// Extend the current level up to `time`. Does nothing if the channel
    /// already reaches that far.
    pub fn pad_to(&mut self, time: Ticks) {
        self.end = self.end.max(time);
    }

    /// The level the channel is currently holding.
    pub fn level(&self) -> Level {
        self.transitions
            .last()
            .map(|&(_, level)| level)
            .unwrap_or(self.idle)
    }

    /// Level at `time`. A transition at exactly `time` has already happened.
    pub fn level_at(&self, time: Ticks) -> Level {
        let after = self.transitions.partition_point(|&(t, _)| t <= time);
        match after {
            0 => self.idle,
            n => self.transitions[n - 1].1,
        }
    }

    pub fn idle(&self) -> Level {
        self.idle
    }

    pub fn transitions(&self) -> &[(Ticks, Level)] {
        &self.transitions
    }

    pub fn duration(&self) -> Ticks {
        self.end
    }

    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    pub fn set_sampling(&mut self, sampling: Sampling) {
        self.sampling = sampling;
    }

    /// The channel as one 0/1 value per sampling slot.
    pub fn samples(&self) -> Vec<u8> {
        let Sampling {
            offset,
            period,
            count,
        } = self.sampling;
        (0..count as u64)
            .map(|i| self.level_at(offset + i * period).bit())
            .collect()
    }
}

/// A set of channels on one time base.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    time_base: TimeBase,
    channels: TiVec<ChannelId, Channel>,
}

impl Trace {
    pub fn new(time_base: TimeBase) -> Self {
        Self {
            time_base,
            channels: TiVec::new(),
        }
    }

    pub fn add_channel(&mut self, channel: Channel) -> ChannelId {
        let id = ChannelId(self.channels.len());
        self.channels.push(channel);
        id
    }

    pub fn time_base(&self) -> TimeBase {
        self.time_base
    }

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.get(id)
    }

    pub fn channel_by_name(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn channels(&self) -> &TiVec<ChannelId, Channel> {
        &self.channels
    }

    /// Length of the longest channel.
    pub fn duration(&self) -> Ticks {
        self.channels.iter().map(Channel::duration).max().unwrap_or(0)
    }

    /// Pad every channel with its last level so they all end together.
    pub fn align_channels(&mut self) {
        let duration = self.duration();
        for channel in self.channels.iter_mut() {
            channel.pad_to(duration);
        }
    }
}
