//! Simulated analog source adapter
//!
//! Deterministic per-channel ramps for host runs and tests: each channel
//! starts at its own base count and advances by a fixed step per read,
//! wrapping at full scale. Also serves as the auxiliary temperature source.

use crate::domain::calibration::ADC_FULL_SCALE;
use crate::domain::config::MAX_CHANNELS;
use crate::domain::sample::ChannelId;
use crate::ports::analog::{AnalogSource, AuxSensor};

/// Deterministic ramp source.
pub struct SimAnalog {
    step: u16,
    counters: [u16; MAX_CHANNELS],
    aux_count: u16,
    /// Last raw count handed out (for diagnostics)
    last_raw: u16,
}

impl SimAnalog {
    /// Ramp advancing by `step` counts per read
    pub fn new(step: u16) -> Self {
        Self {
            step,
            counters: [0; MAX_CHANNELS],
            aux_count: 0,
            last_raw: 0,
        }
    }
}

impl Default for SimAnalog {
    fn default() -> Self {
        Self::new(64)
    }
}

impl AnalogSource for SimAnalog {
    fn read(&mut self, channel: ChannelId) -> u16 {
        let i = channel.index();
        let n = self.counters[i];
        self.counters[i] = n.wrapping_add(1);

        // Channels are offset from each other so traces are tellable apart
        let base = (i as u32 + 1) * 400;
        let raw = ((base + n as u32 * self.step as u32) % (ADC_FULL_SCALE + 1)) as u16;
        self.last_raw = raw;
        raw
    }

    fn last_raw_value(&self) -> Option<u16> {
        Some(self.last_raw)
    }
}

impl AuxSensor for SimAnalog {
    fn read(&mut self) -> f32 {
        let n = self.aux_count;
        self.aux_count = n.wrapping_add(1);
        // Gentle sawtooth around room temperature
        27.0 + (n % 8) as f32 * 0.25
    }
}
