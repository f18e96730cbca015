//! Analog source port - abstraction for reading raw channel values
//!
//! This trait lets the scheduler read raw counts without knowing the
//! converter behind them (on-chip ADC, external I2C/SPI converter, a
//! simulation on the host).

use crate::domain::sample::ChannelId;

/// Port for reading raw analog counts.
///
/// A read always yields a value: converter faults are out of scope for the
/// acquisition core and show up as valid-but-noisy counts, never as errors.
/// Counts are full-scale-bounded (12-bit on the reference hardware).
///
/// # Example Implementation
///
/// ```ignore
/// struct AdcSource<'a> {
///     adc: Adc<'a, Blocking>,
///     pins: [AdcChannel<'a>; MAX_CHANNELS],
/// }
///
/// impl AnalogSource for AdcSource<'_> {
///     fn read(&mut self, channel: ChannelId) -> u16 {
///         self.adc.blocking_read(&mut self.pins[channel.index()]).unwrap_or(0)
///     }
/// }
/// ```
pub trait AnalogSource {
    /// Read the raw count for one channel
    fn read(&mut self, channel: ChannelId) -> u16;

    /// Last raw count returned by any read (for diagnostics)
    ///
    /// Returns `None` if the source doesn't track raw values.
    fn last_raw_value(&self) -> Option<u16> {
        None
    }
}

/// Port for the auxiliary non-channel measurement source.
///
/// Feeds the fixed-interval `temp` topic on the publish transport,
/// independently of the channel engine.
pub trait AuxSensor {
    /// Read the auxiliary measurement (e.g. die temperature in Celsius)
    fn read(&mut self) -> f32;
}
