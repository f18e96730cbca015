//! Ports (interfaces) defining the boundaries of the acquisition core
//!
//! Ports are traits that define how the domain interacts with external
//! systems. They allow the domain to remain independent of specific
//! implementations.
//!
//! # Hexagonal Architecture
//!
//! In hexagonal architecture, ports define the "holes" in the hexagon where
//! adapters plug in:
//!
//! - **AnalogSource**: how raw channel counts are read (ADC, mock)
//! - **ConfigStore**: how configuration persists across reboots (NVS, mock)
//! - **BroadcastSink / PublishSink**: how fresh samples leave the device
//!   (WebSocket-style fan-out, MQTT-style topics)
//! - **AuxSensor**: the auxiliary non-channel measurement source

pub mod analog;
pub mod sink;
pub mod store;

pub use analog::{AnalogSource, AuxSensor};
pub use sink::{BroadcastSink, NullEvents, PublishSink, SinkError, SinkEvents};
pub use store::{ConfigStore, StoreError};
