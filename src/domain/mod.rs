//! Domain layer - the acquisition pipeline, independent of infrastructure
//!
//! Everything here is pure logic over plain state: the per-channel
//! ring buffer, the moving-average filter, calibration, the channel state
//! machine, the scheduler, and the sink fan-out. Hardware, persistence,
//! and transports only appear through the port traits.

pub mod calibration;
pub mod channel;
pub mod config;
pub mod distribution;
pub mod engine;
pub mod filter;
pub mod ring;
pub mod sample;

pub use calibration::Calibration;
pub use channel::Channel;
pub use config::{ChannelConfig, ValidationError, MAX_BUFFER, MAX_CHANNELS, MAX_FILTER};
pub use distribution::{AuxPublisher, Distributor};
pub use engine::Engine;
pub use filter::MovingAverage;
pub use ring::SampleBuffer;
pub use sample::{ChannelId, Sample};
