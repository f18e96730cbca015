//! Calibration domain service
//!
//! Converts an averaged raw ADC count to a calibrated measurement in two
//! stages: counts → volts against the reference, then a linear transform
//! `(volts - offset) * factor / divisor` with per-channel parameters.

use serde::{Deserialize, Serialize};

/// ADC full-scale count (12-bit converter)
pub const ADC_FULL_SCALE: u32 = 4095;

/// ADC reference voltage
pub const VREF_VOLTS: f32 = 3.3;

/// Convert a (possibly averaged) raw count to volts
#[inline]
pub fn counts_to_volts(raw: u32) -> f32 {
    raw as f32 / ADC_FULL_SCALE as f32 * VREF_VOLTS
}

/// Linear calibration parameters for one channel.
///
/// `measurement = (volts - offset) * factor / divisor`. A zero or
/// non-finite divisor would poison every sample with a non-finite value,
/// so configuration validation rejects it up front.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Subtracted from the converted voltage
    pub offset: f32,
    /// Multiplier
    pub factor: f32,
    /// Final divisor; must be finite and nonzero
    pub divisor: f32,
}

impl Calibration {
    /// Pass the converted voltage through unchanged
    pub const IDENTITY: Self = Self {
        offset: 0.0,
        factor: 1.0,
        divisor: 1.0,
    };

    /// Create a calibration with custom parameters
    pub const fn new(offset: f32, factor: f32, divisor: f32) -> Self {
        Self {
            offset,
            factor,
            divisor,
        }
    }

    /// Apply the linear transform to a converted voltage
    #[inline]
    pub fn apply(&self, volts: f32) -> f32 {
        (volts - self.offset) * self.factor / self.divisor
    }

    /// Whether the divisor can safely divide
    pub fn divisor_ok(&self) -> bool {
        self.divisor != 0.0 && self.divisor.is_finite()
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_to_volts_endpoints() {
        assert!((counts_to_volts(0) - 0.0).abs() < 1e-6);
        assert!((counts_to_volts(ADC_FULL_SCALE) - VREF_VOLTS).abs() < 1e-6);
        // Midscale lands near half the reference
        assert!((counts_to_volts(2048) - 1.65).abs() < 0.01);
    }

    #[test]
    fn test_identity_passthrough() {
        let cal = Calibration::IDENTITY;
        assert!((cal.apply(1.5) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_linear_transform() {
        // (2.0 - 0.5) * 4.0 / 2.0 = 3.0
        let cal = Calibration::new(0.5, 4.0, 2.0);
        assert!((cal.apply(2.0) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_divisor_guard() {
        assert!(Calibration::IDENTITY.divisor_ok());
        assert!(!Calibration::new(0.0, 1.0, 0.0).divisor_ok());
        assert!(!Calibration::new(0.0, 1.0, f32::NAN).divisor_ok());
        assert!(!Calibration::new(0.0, 1.0, f32::INFINITY).divisor_ok());
    }
}
