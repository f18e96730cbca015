//! Multichannel Analog Acquisition Engine
//!
//! This library provides a hexagonal architecture for multichannel
//! analog-sensor logging firmware: interval-gated sampling, signal
//! conditioning, bounded per-channel history, and fan-out to three
//! consumer transports, with configuration persisted across reboots.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                                 │
//! │  - Channel state machine (gate, condition, buffer)              │
//! │  - SampleBuffer ring / MovingAverage / Calibration              │
//! │  - Engine scheduler + Distributor fan-out                       │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Ports (Traits)                               │
//! │  - AnalogSource: read raw channel counts                        │
//! │  - ConfigStore: persist configuration scalars                   │
//! │  - BroadcastSink / PublishSink: push fresh samples out          │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters                                     │
//! │  - SimAnalog: deterministic ramp source (host/tests)            │
//! │  - MemStore: in-memory config store (host/tests)                │
//! │  - Recording sinks: capture outgoing frames (host/tests)        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine runs on a single cooperative loop: drive [`Engine::tick`]
//! with a monotonic millisecond clock and the ports of your platform. The
//! pull-side query/configuration interface speaks the shared
//! [`api_protocol`] messages; the owning transport maps its wire format
//! onto them.
//!
//! # Key Benefits
//!
//! - **Testable** - ports allow mocking the ADC, persistence, and sinks
//! - **Portable** - no_std core; the same `tick` runs under a bare loop,
//!   an async task, or a timer interrupt
//! - **Bounded** - heapless containers only, no allocator required

#![cfg_attr(not(feature = "std"), no_std)]

// ============================================================================
// Protocol (shared between host and device)
// ============================================================================

pub mod api_protocol;

pub use api_protocol::{
    ApiError, ApiRequest, ApiResponse, ConfigBody, MAX_FRAME, MAX_SAMPLES_PER_RESPONSE,
};

// ============================================================================
// Hexagonal Architecture
// ============================================================================

/// Domain layer - pure acquisition logic
pub mod domain;

/// Ports - traits defining boundaries
pub mod ports;

/// Adapters - concrete implementations
pub mod adapters;

// Re-export key domain types
pub use domain::{
    AuxPublisher, Calibration, Channel, ChannelConfig, ChannelId, Distributor, Engine,
    MovingAverage, Sample, SampleBuffer, ValidationError, MAX_BUFFER, MAX_CHANNELS, MAX_FILTER,
};

// Re-export key port traits
pub use ports::{
    AnalogSource, AuxSensor, BroadcastSink, ConfigStore, NullEvents, PublishSink, SinkError,
    SinkEvents, StoreError,
};

// Re-export adapters
pub use adapters::{MemStore, RecordingBroadcast, RecordingPublish, SimAnalog};
