//! Recording sink adapters
//!
//! Bounded in-memory implementations of the push-side sink ports. Used by
//! tests to assert on exactly what the distributor delivered, and by the
//! host shell to show the outgoing traffic.

use heapless::Vec;

use crate::domain::sample::{ChannelId, Sample};
use crate::ports::sink::{BroadcastSink, PublishSink, SinkError};

/// Frames either recorder can hold before reporting overrun
const LOG_DEPTH: usize = 128;

/// Longest recorded topic name
const TOPIC_LEN: usize = 16;

/// Largest recorded payload
const PAYLOAD_LEN: usize = 32;

/// Records every `(channel, sample)` handed to the broadcast port.
pub struct RecordingBroadcast {
    frames: Vec<(ChannelId, Sample), LOG_DEPTH>,
}

impl RecordingBroadcast {
    /// Empty recorder
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Everything delivered so far, in order
    pub fn frames(&self) -> &[(ChannelId, Sample)] {
        &self.frames
    }

    /// Forget recorded frames
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for RecordingBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastSink for RecordingBroadcast {
    fn broadcast(&mut self, channel: ChannelId, sample: &Sample) -> Result<(), SinkError> {
        self.frames
            .push((channel, *sample))
            .map_err(|_| SinkError::Overrun)
    }
}

/// Records every `(topic, payload)` handed to the publish port.
pub struct RecordingPublish {
    frames: Vec<(heapless::String<TOPIC_LEN>, Vec<u8, PAYLOAD_LEN>), LOG_DEPTH>,
}

impl RecordingPublish {
    /// Empty recorder
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Everything published so far, in order
    pub fn frames(&self) -> &[(heapless::String<TOPIC_LEN>, Vec<u8, PAYLOAD_LEN>)] {
        &self.frames
    }

    /// Forget recorded frames
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for RecordingPublish {
    fn default() -> Self {
        Self::new()
    }
}

impl PublishSink for RecordingPublish {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SinkError> {
        let topic = heapless::String::try_from(topic).map_err(|_| SinkError::TooLarge)?;
        let payload = Vec::from_slice(payload).map_err(|_| SinkError::TooLarge)?;
        self.frames.push((topic, payload)).map_err(|_| SinkError::Overrun)
    }
}
