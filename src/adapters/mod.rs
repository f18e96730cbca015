//! Adapters - concrete implementations of ports
//!
//! Adapters connect the domain to the outside world by implementing the
//! port traits. The ones here are host-usable: a bounded in-memory config
//! store, a deterministic simulated analog source, and recording sinks.
//! Device firmware plugs its own adapters (ADC, NVS, transport stacks)
//! into the same ports.
//!
//! # Available Adapters
//!
//! - **mem_store**: in-memory `ConfigStore`
//! - **sim_analog**: deterministic ramp `AnalogSource` + `AuxSensor`
//! - **rec_sink**: recording `BroadcastSink` / `PublishSink`

pub mod mem_store;
pub mod rec_sink;
pub mod sim_analog;

pub use mem_store::MemStore;
pub use rec_sink::{RecordingBroadcast, RecordingPublish};
pub use sim_analog::SimAnalog;
