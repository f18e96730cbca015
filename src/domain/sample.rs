//! Sample domain entity
//!
//! This module defines the core domain entities: a validated channel
//! identifier and a timestamped measurement. Neither knows how samples
//! are buffered, persisted, or transmitted.

use serde::{Deserialize, Serialize};

use crate::domain::config::MAX_CHANNELS;

/// A conditioned measurement at a point in time.
///
/// Produced by the acquisition pipeline (raw read → moving average →
/// calibration) and immutable once written into a channel's history.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Milliseconds since boot (monotonic, wraps at u32::MAX)
    pub timestamp_ms: u32,
    /// Calibrated measurement value
    pub value: f32,
}

impl Sample {
    /// Create a new sample
    pub const fn new(timestamp_ms: u32, value: f32) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }

    /// Zero sample, used to initialize buffer slots
    pub(crate) const ZERO: Sample = Sample {
        timestamp_ms: 0,
        value: 0.0,
    };
}

/// Validated channel identifier (memory-efficient representation)
///
/// Uses a single byte to identify one of the `MAX_CHANNELS` logical analog
/// inputs. Construction through [`ChannelId::new`] guarantees the index is
/// in range, so downstream code can index the channel table directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(u8);

impl ChannelId {
    /// Create a channel ID, rejecting out-of-range indices
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < MAX_CHANNELS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Index into the channel table
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw channel number
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Iterate over every valid channel ID
    pub fn all() -> impl Iterator<Item = ChannelId> {
        (0..MAX_CHANNELS as u8).map(ChannelId)
    }
}
