//! Fan-out of fresh samples to the push-side transports
//!
//! Every sample the scheduler produces goes three ways: it stays resident in
//! the channel's ring for the pull transport, it is handed to the broadcast
//! sink as a structured value, and it is handed to the publish sink as
//! payload bytes under the channel's topic. Both push deliveries are
//! best-effort; a failure is reported to the event observer and the frame
//! is dropped without ever blocking the scheduler.

use core::fmt::Write;

use crate::domain::sample::{ChannelId, Sample};
use crate::ports::analog::AuxSensor;
use crate::ports::sink::{BroadcastSink, PublishSink, SinkEvents};

/// Topic for the auxiliary non-channel measurement
pub const AUX_TOPIC: &str = "temp";

/// Default auxiliary publish interval
pub const DEFAULT_AUX_INTERVAL_MS: u32 = 5000;

/// Largest postcard-encoded sample payload
const SAMPLE_PAYLOAD: usize = 16;

/// Groups the two push sinks and the event observer for one tick.
pub struct Distributor<'a, B: BroadcastSink, P: PublishSink> {
    broadcast: &'a mut B,
    publish: &'a mut P,
    events: &'a mut dyn SinkEvents,
}

impl<'a, B: BroadcastSink, P: PublishSink> Distributor<'a, B, P> {
    /// Borrow the sinks for a run of deliveries
    pub fn new(broadcast: &'a mut B, publish: &'a mut P, events: &'a mut dyn SinkEvents) -> Self {
        Self {
            broadcast,
            publish,
            events,
        }
    }

    /// Deliver one fresh sample to both push transports.
    ///
    /// The broadcast sink gets the structured sample and serializes it
    /// itself; the publish sink gets postcard payload bytes under
    /// `channel/<index>`.
    pub fn fan_out(&mut self, channel: ChannelId, sample: &Sample) {
        if let Err(err) = self.broadcast.broadcast(channel, sample) {
            self.events.on_drop(channel, err);
            #[cfg(feature = "defmt")]
            defmt::warn!("broadcast drop ch{}: {}", channel.value(), err);
        }

        let mut topic = heapless::String::<16>::new();
        let _ = write!(topic, "channel/{}", channel.value());

        // A Sample always fits the payload buffer
        if let Ok(payload) = postcard::to_vec::<_, SAMPLE_PAYLOAD>(sample) {
            if let Err(err) = self.publish.publish(&topic, &payload) {
                self.events.on_drop(channel, err);
                #[cfg(feature = "defmt")]
                defmt::warn!("publish drop ch{}: {}", channel.value(), err);
            }
        }
    }

    /// Publish the auxiliary payload, reporting a drop to the observer
    fn publish_aux(&mut self, payload: &[u8]) {
        if let Err(err) = self.publish.publish(AUX_TOPIC, payload) {
            self.events.on_aux_drop(err);
            #[cfg(feature = "defmt")]
            defmt::warn!("publish drop {}: {}", AUX_TOPIC, err);
        }
    }
}

/// Fixed-interval publisher for the auxiliary measurement source.
///
/// Independent of the channel engine: it has its own interval clock and
/// only talks to the publish sink, under the `temp` topic.
pub struct AuxPublisher {
    interval_ms: u32,
    last_at: Option<u32>,
}

impl AuxPublisher {
    /// Create with a publish interval; the first tick publishes immediately
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_at: None,
        }
    }

    /// Publish the auxiliary reading if its interval has elapsed.
    ///
    /// Returns whether a publication was attempted this tick.
    pub fn tick<B, P>(
        &mut self,
        now: u32,
        sensor: &mut impl AuxSensor,
        dist: &mut Distributor<'_, B, P>,
    ) -> bool
    where
        B: BroadcastSink,
        P: PublishSink,
    {
        let due = match self.last_at {
            None => true,
            Some(last) => now.wrapping_sub(last) >= self.interval_ms,
        };
        if !due {
            return false;
        }
        self.last_at = Some(now);
        let value = sensor.read();
        if let Ok(payload) = postcard::to_vec::<_, 8>(&value) {
            dist.publish_aux(&payload);
        }
        true
    }
}

impl Default for AuxPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_AUX_INTERVAL_MS)
    }
}
