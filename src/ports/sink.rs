//! Sink ports - abstractions for the push-side consumer transports
//!
//! Two independent push transports receive every fresh sample: a broadcast
//! sink that fans out to all currently connected listeners (WebSocket-style)
//! and a publish sink addressed by topic (MQTT-style). Both are best-effort:
//! delivery failures are observed, never retried, and never allowed to
//! block the acquisition loop.

use crate::domain::sample::{ChannelId, Sample};

/// Error type for sink delivery
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// No listener / broker connection
    Disconnected,
    /// Transport queue full; the frame was dropped
    Overrun,
    /// Payload exceeds the transport's frame limit
    TooLarge,
}

/// Port for the broadcast transport.
///
/// Receives the structured sample and owns its serialization and
/// per-listener fan-out. Slow listeners are the transport's problem, not
/// the scheduler's.
pub trait BroadcastSink {
    /// Deliver one sample to every connected listener, best-effort
    fn broadcast(&mut self, channel: ChannelId, sample: &Sample) -> Result<(), SinkError>;
}

/// Port for the topic-addressed publish transport.
///
/// Receives pre-encoded payload bytes under a topic name
/// (`channel/<index>` for channel samples, `temp` for the auxiliary
/// source).
pub trait PublishSink {
    /// Publish one payload under a topic, best-effort
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SinkError>;
}

/// Observer for sink lifecycle and delivery events.
///
/// A plain callback table on the messaging collaborators; pure
/// instrumentation with no-op defaults, so the acquisition core never
/// depends on it being wired.
pub trait SinkEvents {
    /// A transport reported a new consumer
    fn on_connect(&mut self, _topic: &str) {}

    /// A transport lost a consumer
    fn on_disconnect(&mut self, _topic: &str) {}

    /// A delivery attempt failed and the frame was dropped
    fn on_drop(&mut self, _channel: ChannelId, _err: SinkError) {}

    /// An auxiliary-topic publication failed and was dropped
    fn on_aux_drop(&mut self, _err: SinkError) {}
}

/// Default observer that ignores everything
pub struct NullEvents;

impl SinkEvents for NullEvents {}
