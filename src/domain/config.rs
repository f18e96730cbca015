//! Channel configuration: bounds, validation, persistence record layout
//!
//! One `ChannelConfig` per logical analog input, applied at runtime through
//! the configuration endpoint and persisted field-by-field to the config
//! store. The store gives no multi-key transaction, so each record carries
//! a checksum key written last; boot reconciliation trusts a record only if
//! the recomputed checksum matches (a torn write reads back as
//! unconfigured, never half-applied).

use core::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::domain::calibration::Calibration;

/// Number of logical analog inputs
pub const MAX_CHANNELS: usize = 4;

/// Largest per-channel history, in samples
pub const MAX_BUFFER: usize = 100;

/// Largest moving-average window, in slots
pub const MAX_FILTER: usize = 32;

/// Key namespace prefix for persisted configuration
pub const STORE_PREFIX: &str = "acq";

/// Default sampling interval when nothing is persisted
pub const DEFAULT_INTERVAL_MS: u32 = 1000;

/// Default history depth when nothing is persisted
pub const DEFAULT_CAPACITY: u16 = 16;

/// A configuration request that failed validation.
///
/// Checked in order: capacity, filter length, divisor, interval. Any
/// failure leaves the channel's prior state untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Capacity outside `[1, MAX_BUFFER]`
    CapacityOutOfRange,
    /// Filter length outside `[1, MAX_FILTER]`
    FilterLengthOutOfRange,
    /// Calibration divisor zero or non-finite
    ZeroDivisor,
    /// Sampling interval of zero
    ZeroInterval,
}

/// Validated in-memory configuration for one channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Sampling gate; independent of whether the channel is configured
    pub enabled: bool,
    /// Minimum time between samples
    pub interval_ms: u32,
    /// History depth in samples
    pub capacity: u16,
    /// Linear calibration applied after unit conversion
    pub calibration: Calibration,
    /// Moving-average window length
    pub filter_len: u16,
}

impl ChannelConfig {
    /// Check every bound; the first violation wins
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.capacity == 0 || self.capacity as usize > MAX_BUFFER {
            return Err(ValidationError::CapacityOutOfRange);
        }
        if self.filter_len == 0 || self.filter_len as usize > MAX_FILTER {
            return Err(ValidationError::FilterLengthOutOfRange);
        }
        if !self.calibration.divisor_ok() {
            return Err(ValidationError::ZeroDivisor);
        }
        if self.interval_ms == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        Ok(())
    }

    /// Seal over the persisted fields, stored last under the `crc` key.
    ///
    /// FNV-1a over the little-endian field encoding. Not cryptographic;
    /// it only has to tell a complete record from a torn one.
    pub fn checksum(&self) -> u32 {
        let mut h = Fnv1a::new();
        h.write(&[self.enabled as u8]);
        h.write(&self.interval_ms.to_le_bytes());
        h.write(&self.capacity.to_le_bytes());
        h.write(&self.calibration.offset.to_bits().to_le_bytes());
        h.write(&self.calibration.factor.to_bits().to_le_bytes());
        h.write(&self.calibration.divisor.to_bits().to_le_bytes());
        h.write(&self.filter_len.to_le_bytes());
        h.finish()
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: DEFAULT_INTERVAL_MS,
            capacity: DEFAULT_CAPACITY,
            calibration: Calibration::IDENTITY,
            filter_len: 1,
        }
    }
}

/// Build the namespaced store key for one channel field,
/// e.g. `acq.ch2.interval_ms`
pub fn store_key(channel: usize, field: &str) -> heapless::String<32> {
    let mut key = heapless::String::new();
    // Bounded inputs keep this well inside 32 bytes
    let _ = write!(key, "{}.ch{}.{}", STORE_PREFIX, channel, field);
    key
}

/// 32-bit FNV-1a
struct Fnv1a(u32);

impl Fnv1a {
    fn new() -> Self {
        Self(0x811c_9dc5)
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u32;
            self.0 = self.0.wrapping_mul(0x0100_0193);
        }
    }

    fn finish(&self) -> u32 {
        self.0
    }
}
