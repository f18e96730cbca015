//! Per-channel acquisition state machine
//!
//! Each channel owns its configuration, its moving-average window, its
//! sample history, and the due-time bookkeeping. All mutation funnels
//! through three paths: configuration apply, the scheduler's ingest, and
//! the pull-side drain. There is no other writer.

use crate::domain::calibration::counts_to_volts;
use crate::domain::config::ChannelConfig;
use crate::domain::config::ValidationError;
use crate::domain::filter::MovingAverage;
use crate::domain::ring::{Drained, SampleBuffer};
use crate::domain::sample::Sample;

/// One logical analog input.
pub struct Channel {
    /// A valid configuration has been applied at least once
    configured: bool,
    config: ChannelConfig,
    /// Monotonic ms of the last taken sample (or of configuration, so the
    /// first sample comes due after one full interval)
    last_sample_at: u32,
    filter: MovingAverage,
    buffer: SampleBuffer,
}

impl Channel {
    /// Fresh, unconfigured channel
    pub fn new() -> Self {
        let config = ChannelConfig::default();
        Self {
            configured: false,
            filter: MovingAverage::new(config.filter_len),
            buffer: SampleBuffer::new(config.capacity),
            last_sample_at: 0,
            config,
        }
    }

    /// Apply a configuration, replacing all fields and resetting runtime
    /// state.
    ///
    /// Validation failure leaves the prior state untouched. On success the
    /// history and filter window are cleared and `last_sample_at` is set to
    /// `now`, so the first sample is due one full interval later.
    pub fn apply(&mut self, config: ChannelConfig, now: u32) -> Result<(), ValidationError> {
        config.validate()?;
        self.config = config;
        self.configured = true;
        self.buffer.reset(config.capacity);
        self.filter.reset(config.filter_len);
        self.last_sample_at = now;
        Ok(())
    }

    /// Configured, enabled, and at least one interval since the last sample.
    ///
    /// Wrapping subtraction keeps the gate correct across a monotonic
    /// counter rollover.
    pub fn due(&self, now: u32) -> bool {
        self.configured
            && self.config.enabled
            && now.wrapping_sub(self.last_sample_at) >= self.config.interval_ms
    }

    /// Condition a raw reading and append it to the history.
    ///
    /// raw → moving average → volts → calibration, then push with
    /// overwrite-oldest semantics and advance the due clock.
    pub fn ingest(&mut self, now: u32, raw: u16) -> Sample {
        let averaged = self.filter.update(raw as u32);
        let volts = counts_to_volts(averaged);
        let value = self.config.calibration.apply(volts);
        let sample = Sample::new(now, value);
        self.buffer.push(sample);
        self.last_sample_at = now;
        sample
    }

    /// Destructive read of the unread history (pull transport)
    pub fn drain(&mut self) -> (Drained, bool) {
        self.buffer.drain_all()
    }

    /// Whether a valid configuration has ever been applied
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Current configuration (meaningful once configured)
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Unread samples currently buffered (diagnostics)
    pub fn pending(&self) -> u16 {
        self.buffer.len()
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calibration::Calibration;

    fn cfg(interval_ms: u32, capacity: u16) -> ChannelConfig {
        ChannelConfig {
            enabled: true,
            interval_ms,
            capacity,
            calibration: Calibration::IDENTITY,
            filter_len: 1,
        }
    }

    #[test]
    fn test_unconfigured_never_due() {
        let ch = Channel::new();
        assert!(!ch.due(1_000_000));
    }

    #[test]
    fn test_disabled_never_due() {
        let mut ch = Channel::new();
        let mut c = cfg(100, 4);
        c.enabled = false;
        ch.apply(c, 0).unwrap();
        assert!(!ch.due(10_000));
    }

    #[test]
    fn test_first_sample_due_after_one_interval() {
        let mut ch = Channel::new();
        ch.apply(cfg(1000, 4), 500).unwrap();
        assert!(!ch.due(1000));
        assert!(!ch.due(1499));
        assert!(ch.due(1500));
    }

    #[test]
    fn test_due_across_counter_wraparound() {
        let mut ch = Channel::new();
        ch.apply(cfg(1000, 4), u32::MAX - 200).unwrap();
        // 201 ms elapsed through the rollover: not yet due
        assert!(!ch.due(0));
        // 1000 ms elapsed exactly
        assert!(ch.due(799));
    }

    #[test]
    fn test_ingest_advances_due_clock() {
        let mut ch = Channel::new();
        ch.apply(cfg(1000, 4), 0).unwrap();
        assert!(ch.due(1000));
        ch.ingest(1000, 2048);
        assert!(!ch.due(1500));
        assert!(ch.due(2000));
    }

    #[test]
    fn test_failed_apply_keeps_prior_state() {
        let mut ch = Channel::new();
        ch.apply(cfg(1000, 4), 0).unwrap();
        ch.ingest(1000, 100);

        let mut bad = cfg(500, 0); // capacity out of range
        bad.filter_len = 2;
        assert!(ch.apply(bad, 2000).is_err());

        assert!(ch.is_configured());
        assert_eq!(ch.config().interval_ms, 1000);
        assert_eq!(ch.config().capacity, 4);
        // Buffered sample survives the rejected request
        assert_eq!(ch.pending(), 1);
    }

    #[test]
    fn test_reapply_resets_runtime_state() {
        let mut ch = Channel::new();
        ch.apply(cfg(1000, 4), 0).unwrap();
        ch.ingest(1000, 100);
        assert_eq!(ch.pending(), 1);

        ch.apply(cfg(2000, 8), 1500).unwrap();
        assert_eq!(ch.pending(), 0);
        let (out, overflow) = ch.drain();
        assert!(out.is_empty());
        assert!(!overflow);
    }
}
