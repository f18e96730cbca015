//! Moving-average filter over raw ADC counts
//!
//! A circular window of the most recent raw readings whose arithmetic mean
//! becomes the conditioned raw value. The window is zero-initialized on
//! reset, so the first `len` outputs are biased toward zero; that matches
//! the simple moving average the original acquisition pipeline computes and
//! is kept rather than replaced with a gap-free warm-up.

use crate::domain::config::MAX_FILTER;

/// Circular moving-average window.
pub struct MovingAverage {
    window: [u32; MAX_FILTER],
    cursor: u16,
    len: u16,
}

impl MovingAverage {
    /// Create a window of `len` slots.
    ///
    /// Caller validates `1 <= len <= MAX_FILTER`; out-of-range values are
    /// clamped rather than trusted.
    pub fn new(len: u16) -> Self {
        Self {
            window: [0; MAX_FILTER],
            cursor: 0,
            len: len.clamp(1, MAX_FILTER as u16),
        }
    }

    /// Zero the window and adopt a new length (reconfigure / boot path)
    pub fn reset(&mut self, len: u16) {
        self.window = [0; MAX_FILTER];
        self.cursor = 0;
        self.len = len.clamp(1, MAX_FILTER as u16);
    }

    /// Record a raw reading and return the window mean.
    ///
    /// Sum of all `len` slots divided by `len`, integer division. With
    /// 12-bit counts and `MAX_FILTER` slots the sum fits a u32 comfortably.
    pub fn update(&mut self, raw: u32) -> u32 {
        self.window[self.cursor as usize] = raw;
        self.cursor = (self.cursor + 1) % self.len;

        let mut sum: u32 = 0;
        for slot in &self.window[..self.len as usize] {
            sum += slot;
        }
        sum / self.len as u32
    }

    /// Window length in slots
    pub fn len(&self) -> u16 {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_one_is_passthrough() {
        let mut f = MovingAverage::new(1);
        assert_eq!(f.update(1234), 1234);
        assert_eq!(f.update(0), 0);
        assert_eq!(f.update(4095), 4095);
    }

    #[test]
    fn test_cold_start_bias_toward_zero() {
        // Fresh window of 4 zeros: first reading of 8 averages to 2
        let mut f = MovingAverage::new(4);
        assert_eq!(f.update(8), 2);
        assert_eq!(f.update(8), 4);
        assert_eq!(f.update(8), 6);
        assert_eq!(f.update(8), 8);
    }

    #[test]
    fn test_window_slides() {
        let mut f = MovingAverage::new(3);
        f.update(3);
        f.update(6);
        // Window now [3, 6, 9]
        assert_eq!(f.update(9), 6);
        // Oldest (3) evicted: [12, 6, 9]
        assert_eq!(f.update(12), 9);
        // [12, 15, 9]
        assert_eq!(f.update(15), 12);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut f = MovingAverage::new(2);
        f.update(100);
        f.update(100);
        f.reset(2);
        assert_eq!(f.update(100), 50);
    }
}
