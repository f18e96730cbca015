//! Acquisition engine: scheduler tick, configuration, reconciliation
//!
//! The engine owns the fixed channel table and is the single writer for
//! every piece of channel state. It runs on one cooperative loop: a
//! configuration request, a boot reconciliation, a scheduler tick, or a
//! pull-side drain each run to completion before the next begins, so no
//! synchronization is needed and per-channel sample order is strictly
//! increasing. Any blocking call elsewhere in the loop delays the due-time
//! check for every channel; that jitter is an accepted property of the
//! single-loop model.

use crate::api_protocol::{ApiError, ApiRequest, ApiResponse, ConfigBody};
use crate::domain::calibration::Calibration;
use crate::domain::channel::Channel;
use crate::domain::config::{store_key, ChannelConfig, MAX_CHANNELS};
use crate::domain::distribution::Distributor;
use crate::domain::ring::Drained;
use crate::domain::sample::ChannelId;
use crate::ports::analog::AnalogSource;
use crate::ports::sink::{BroadcastSink, PublishSink};
use crate::ports::store::{ConfigStore, StoreError};

/// The multichannel acquisition engine.
pub struct Engine {
    channels: [Channel; MAX_CHANNELS],
}

impl Engine {
    /// Engine with every channel unconfigured
    pub fn new() -> Self {
        Self {
            channels: core::array::from_fn(|_| Channel::new()),
        }
    }

    /// One cooperative pass over the channel table.
    ///
    /// Every configured, enabled channel whose interval has elapsed is
    /// sampled: raw read, conditioning, history push, then fan-out to the
    /// push transports. A due sample is always taken synchronously within
    /// the tick that discovers it.
    pub fn tick<S, B, P>(&mut self, now: u32, source: &mut S, dist: &mut Distributor<'_, B, P>)
    where
        S: AnalogSource,
        B: BroadcastSink,
        P: PublishSink,
    {
        for id in ChannelId::all() {
            let channel = &mut self.channels[id.index()];
            if !channel.due(now) {
                continue;
            }
            let raw = source.read(id);
            let sample = channel.ingest(now, raw);
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "sample ch{} t={} raw={} value={}",
                id.value(),
                now,
                raw,
                sample.value
            );
            dist.fan_out(id, &sample);
        }
    }

    /// Apply and persist a configuration request (the POST config path).
    ///
    /// Validation failure leaves prior state untouched. On success every
    /// field is written to the store, sealed by the checksum key, before
    /// this returns; a store failure after a successful apply surfaces as
    /// [`ApiError::Persistence`] so the caller can tell "rejected" from
    /// "applied-but-not-saved".
    pub fn configure(
        &mut self,
        id: ChannelId,
        body: &ConfigBody,
        now: u32,
        store: &mut impl ConfigStore,
    ) -> Result<(), ApiError> {
        let config = body.to_config();
        self.channels[id.index()].apply(config, now)?;
        Self::persist(store, id.index(), &config)?;
        #[cfg(feature = "defmt")]
        defmt::info!(
            "ch{} configured: interval={}ms capacity={} enabled={}",
            id.value(),
            config.interval_ms,
            config.capacity,
            config.enabled
        );
        Ok(())
    }

    /// Boot-time reconciliation from the persisted store.
    ///
    /// Every channel whose record carries the configured flag and a
    /// matching checksum goes through the same validation/reset path as a
    /// live request; runtime state (history, filter window, due clock) is
    /// rebuilt from scratch regardless of what was persisted. Torn or
    /// stale records are skipped and the channel stays unconfigured.
    pub fn load(&mut self, now: u32, store: &mut impl ConfigStore) {
        for id in ChannelId::all() {
            let Some(config) = Self::read_record(store, id.index()) else {
                continue;
            };
            if self.channels[id.index()].apply(config, now).is_err() {
                // Persisted under older bounds; treat as unconfigured
                #[cfg(feature = "defmt")]
                defmt::warn!("ch{} persisted config no longer valid", id.value());
            }
        }
    }

    /// Destructive read of a channel's history (the GET data path)
    pub fn drain(&mut self, id: ChannelId) -> Result<(Drained, bool), ApiError> {
        let channel = &mut self.channels[id.index()];
        if !channel.is_configured() {
            return Err(ApiError::NotConfigured);
        }
        Ok(channel.drain())
    }

    /// Snapshot a channel's applied configuration (the GET config path)
    pub fn config_snapshot(&self, id: ChannelId) -> Result<ConfigBody, ApiError> {
        let channel = &self.channels[id.index()];
        if !channel.is_configured() {
            return Err(ApiError::NotConfigured);
        }
        Ok(ConfigBody::from_config(channel.config()))
    }

    /// Dispatch one pull-side request.
    ///
    /// The transport owning the pull interface parses its wire format into
    /// an [`ApiRequest`] and maps the [`ApiResponse`] back out.
    pub fn handle_request(
        &mut self,
        request: ApiRequest,
        now: u32,
        store: &mut impl ConfigStore,
    ) -> ApiResponse {
        match request {
            ApiRequest::GetConfig { channel } => match Self::channel_id(channel) {
                Ok(id) => match self.config_snapshot(id) {
                    Ok(body) => ApiResponse::Config { body },
                    Err(err) => err.into(),
                },
                Err(err) => err.into(),
            },
            ApiRequest::SetConfig { channel, body } => match Self::channel_id(channel) {
                Ok(id) => match self.configure(id, &body, now, store) {
                    Ok(()) => ApiResponse::Ok,
                    Err(err) => err.into(),
                },
                Err(err) => err.into(),
            },
            ApiRequest::GetData { channel } => match Self::channel_id(channel) {
                Ok(id) => match self.drain(id) {
                    Ok((samples, overflow)) => ApiResponse::Data { samples, overflow },
                    Err(err) => err.into(),
                },
                Err(err) => err.into(),
            },
        }
    }

    fn channel_id(raw: u8) -> Result<ChannelId, ApiError> {
        ChannelId::new(raw).ok_or(ApiError::InvalidChannel)
    }

    /// Write one channel's record, checksum key last
    fn persist(
        store: &mut impl ConfigStore,
        ch: usize,
        config: &ChannelConfig,
    ) -> Result<(), StoreError> {
        store.put_bool(&store_key(ch, "enabled"), config.enabled)?;
        store.put_u32(&store_key(ch, "interval_ms"), config.interval_ms)?;
        store.put_u32(&store_key(ch, "capacity"), config.capacity as u32)?;
        store.put_f32(&store_key(ch, "offset"), config.calibration.offset)?;
        store.put_f32(&store_key(ch, "factor"), config.calibration.factor)?;
        store.put_f32(&store_key(ch, "divisor"), config.calibration.divisor)?;
        store.put_u32(&store_key(ch, "filter_len"), config.filter_len as u32)?;
        store.put_bool(&store_key(ch, "configured"), true)?;
        // Seal last: a torn write leaves a mismatching checksum behind
        store.put_u32(&store_key(ch, "crc"), config.checksum())?;
        Ok(())
    }

    /// Read one channel's record; `None` for absent, torn, or unsealed
    fn read_record(store: &mut impl ConfigStore, ch: usize) -> Option<ChannelConfig> {
        if !store.get_bool(&store_key(ch, "configured"), false) {
            return None;
        }
        let defaults = ChannelConfig::default();
        let config = ChannelConfig {
            enabled: store.get_bool(&store_key(ch, "enabled"), defaults.enabled),
            interval_ms: store.get_u32(&store_key(ch, "interval_ms"), defaults.interval_ms),
            capacity: store.get_u32(&store_key(ch, "capacity"), defaults.capacity as u32) as u16,
            calibration: Calibration::new(
                store.get_f32(&store_key(ch, "offset"), 0.0),
                store.get_f32(&store_key(ch, "factor"), 1.0),
                store.get_f32(&store_key(ch, "divisor"), 1.0),
            ),
            filter_len: store.get_u32(&store_key(ch, "filter_len"), 1) as u16,
        };
        if store.get_u32(&store_key(ch, "crc"), 0) != config.checksum() {
            #[cfg(feature = "defmt")]
            defmt::warn!("ch{} persisted record failed checksum, ignoring", ch as u8);
            return None;
        }
        Some(config)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mem_store::MemStore;
    use crate::adapters::rec_sink::{RecordingBroadcast, RecordingPublish};
    use crate::domain::calibration::{ADC_FULL_SCALE, VREF_VOLTS};
    use crate::ports::sink::NullEvents;

    /// Replays a fixed sequence of raw counts, then repeats the last one
    struct ScriptedSource {
        raws: heapless::Vec<u16, 16>,
        next: usize,
    }

    impl ScriptedSource {
        fn new(raws: &[u16]) -> Self {
            Self {
                raws: heapless::Vec::from_slice(raws).unwrap(),
                next: 0,
            }
        }
    }

    impl AnalogSource for ScriptedSource {
        fn read(&mut self, _channel: ChannelId) -> u16 {
            let raw = self.raws[self.next.min(self.raws.len() - 1)];
            self.next += 1;
            raw
        }
    }

    fn body(interval_s: u32, capacity: u16) -> ConfigBody {
        ConfigBody {
            interval_s,
            capacity,
            enabled: true,
            offset: 0.0,
            factor: 1.0,
            divisor: 1.0,
            filter_len: 1,
        }
    }

    /// Calibration that undoes the counts→volts conversion, so the stored
    /// value equals the raw count
    fn raw_passthrough(mut b: ConfigBody) -> ConfigBody {
        b.factor = ADC_FULL_SCALE as f32;
        b.divisor = VREF_VOLTS;
        b
    }

    fn ch(n: u8) -> ChannelId {
        ChannelId::new(n).unwrap()
    }

    fn tick_at(
        engine: &mut Engine,
        now: u32,
        source: &mut impl AnalogSource,
        bc: &mut RecordingBroadcast,
        pb: &mut RecordingPublish,
    ) {
        let mut events = NullEvents;
        let mut dist = Distributor::new(bc, pb, &mut events);
        engine.tick(now, source, &mut dist);
    }

    #[test]
    fn test_interval_gating_exact_schedule() {
        let mut engine = Engine::new();
        let mut store = MemStore::new();
        engine.configure(ch(0), &body(1, 8), 0, &mut store).unwrap();

        let mut source = ScriptedSource::new(&[2048]);
        let (mut bc, mut pb) = (RecordingBroadcast::new(), RecordingPublish::new());
        for now in [0, 500, 999, 1000, 1500] {
            tick_at(&mut engine, now, &mut source, &mut bc, &mut pb);
        }

        // Exactly one sample, taken at t=1000
        assert_eq!(bc.frames().len(), 1);
        assert_eq!(bc.frames()[0].1.timestamp_ms, 1000);
    }

    #[test]
    fn test_gating_across_counter_wraparound() {
        let mut engine = Engine::new();
        let mut store = MemStore::new();
        let start = u32::MAX - 500;
        engine
            .configure(ch(0), &body(1, 8), start, &mut store)
            .unwrap();

        let mut source = ScriptedSource::new(&[100]);
        let (mut bc, mut pb) = (RecordingBroadcast::new(), RecordingPublish::new());
        // 501 ms elapsed through the rollover: not yet due
        tick_at(&mut engine, 0, &mut source, &mut bc, &mut pb);
        assert!(bc.frames().is_empty());
        // Exactly 1000 ms elapsed
        tick_at(&mut engine, 499, &mut source, &mut bc, &mut pb);
        assert_eq!(bc.frames().len(), 1);
        assert_eq!(bc.frames()[0].1.timestamp_ms, 499);
    }

    #[test]
    fn test_overflow_scenario_capacity_three() {
        let mut engine = Engine::new();
        let mut store = MemStore::new();
        engine
            .configure(ch(0), &raw_passthrough(body(1, 3)), 0, &mut store)
            .unwrap();

        let mut source = ScriptedSource::new(&[10, 20, 30, 40]);
        let (mut bc, mut pb) = (RecordingBroadcast::new(), RecordingPublish::new());
        for now in [1000, 2000, 3000, 4000] {
            tick_at(&mut engine, now, &mut source, &mut bc, &mut pb);
        }

        let (samples, overflow) = engine.drain(ch(0)).unwrap();
        assert!(overflow);
        assert_eq!(samples.len(), 3);
        for (sample, expected) in samples.iter().zip([20.0, 30.0, 40.0]) {
            assert!((sample.value - expected).abs() < 1e-2);
        }

        // A second drain with nothing new is empty with the flag cleared
        let (samples, overflow) = engine.drain(ch(0)).unwrap();
        assert!(samples.is_empty());
        assert!(!overflow);
    }

    #[test]
    fn test_filtered_values_slide_over_window() {
        let mut engine = Engine::new();
        let mut store = MemStore::new();
        let mut b = raw_passthrough(body(1, 10));
        b.filter_len = 3;
        engine.configure(ch(0), &b, 0, &mut store).unwrap();

        let mut source = ScriptedSource::new(&[300, 600, 900, 1200]);
        let (mut bc, mut pb) = (RecordingBroadcast::new(), RecordingPublish::new());
        for now in [1000, 2000, 3000, 4000] {
            tick_at(&mut engine, now, &mut source, &mut bc, &mut pb);
        }

        let (samples, _) = engine.drain(ch(0)).unwrap();
        // Cold-start means of [300,0,0], [300,600,0], then full windows
        for (sample, expected) in samples.iter().zip([100.0, 300.0, 600.0, 900.0]) {
            assert!((sample.value - expected).abs() < 1.0);
        }
    }

    #[test]
    fn test_tick_survives_broadcast_failure() {
        struct DeadBroadcast;

        impl crate::ports::sink::BroadcastSink for DeadBroadcast {
            fn broadcast(
                &mut self,
                _channel: ChannelId,
                _sample: &crate::domain::sample::Sample,
            ) -> Result<(), crate::ports::sink::SinkError> {
                Err(crate::ports::sink::SinkError::Disconnected)
            }
        }

        let mut engine = Engine::new();
        let mut store = MemStore::new();
        engine.configure(ch(0), &body(1, 8), 0, &mut store).unwrap();

        let mut source = ScriptedSource::new(&[2048]);
        let mut bc = DeadBroadcast;
        let mut pb = RecordingPublish::new();
        for now in [1000, 2000] {
            let mut events = NullEvents;
            let mut dist = Distributor::new(&mut bc, &mut pb, &mut events);
            engine.tick(now, &mut source, &mut dist);
        }

        // Dropped broadcasts never stall the loop: sampling, the history,
        // and the publish transport all keep going
        assert_eq!(pb.frames().len(), 2);
        let (samples, overflow) = engine.drain(ch(0)).unwrap();
        assert_eq!(samples.len(), 2);
        assert!(!overflow);
    }

    #[test]
    fn test_persistence_round_trip_resets_runtime() {
        let mut store = MemStore::new();
        let requested = ConfigBody {
            interval_s: 2,
            capacity: 5,
            enabled: true,
            offset: 0.1,
            factor: 2.0,
            divisor: 1.0,
            filter_len: 3,
        };

        let mut engine = Engine::new();
        engine.configure(ch(1), &requested, 0, &mut store).unwrap();
        // Leave runtime state behind before the "reboot"
        let mut source = ScriptedSource::new(&[500]);
        let (mut bc, mut pb) = (RecordingBroadcast::new(), RecordingPublish::new());
        tick_at(&mut engine, 2000, &mut source, &mut bc, &mut pb);

        let mut rebooted = Engine::new();
        rebooted.load(10_000, &mut store);

        assert_eq!(rebooted.config_snapshot(ch(1)).unwrap(), requested);
        // History is rebuilt empty, overflow clear
        let (samples, overflow) = rebooted.drain(ch(1)).unwrap();
        assert!(samples.is_empty());
        assert!(!overflow);

        // Due clock restarted at load time: first sample one interval later
        let (mut bc, mut pb) = (RecordingBroadcast::new(), RecordingPublish::new());
        tick_at(&mut rebooted, 11_999, &mut source, &mut bc, &mut pb);
        assert!(bc.frames().is_empty());
        tick_at(&mut rebooted, 12_000, &mut source, &mut bc, &mut pb);
        assert_eq!(bc.frames().len(), 1);
    }

    #[test]
    fn test_unconfigured_channels_stay_unconfigured_after_load() {
        let mut store = MemStore::new();
        let mut engine = Engine::new();
        engine.configure(ch(0), &body(1, 4), 0, &mut store).unwrap();

        let mut rebooted = Engine::new();
        rebooted.load(0, &mut store);
        assert!(rebooted.config_snapshot(ch(0)).is_ok());
        assert_eq!(
            rebooted.config_snapshot(ch(1)),
            Err(ApiError::NotConfigured)
        );
    }

    #[test]
    fn test_torn_record_is_ignored_on_load() {
        let mut store = MemStore::new();
        let mut engine = Engine::new();
        engine.configure(ch(2), &body(1, 4), 0, &mut store).unwrap();

        // Simulate a torn write: one field changed after the seal
        store
            .put_u32(&store_key(2, "interval_ms"), 60_000)
            .unwrap();

        let mut rebooted = Engine::new();
        rebooted.load(0, &mut store);
        assert_eq!(
            rebooted.config_snapshot(ch(2)),
            Err(ApiError::NotConfigured)
        );
    }

    #[test]
    fn test_invalid_capacity_rejected_prior_state_kept() {
        let mut engine = Engine::new();
        let mut store = MemStore::new();
        engine.configure(ch(0), &body(1, 4), 0, &mut store).unwrap();

        for bad_capacity in [0u16, 101] {
            let response = engine.handle_request(
                ApiRequest::SetConfig {
                    channel: 0,
                    body: body(9, bad_capacity),
                },
                0,
                &mut store,
            );
            assert_eq!(
                response,
                ApiResponse::Error {
                    error: ApiError::Validation(
                        crate::domain::config::ValidationError::CapacityOutOfRange
                    )
                }
            );
        }

        // Prior configuration untouched
        let snapshot = engine.config_snapshot(ch(0)).unwrap();
        assert_eq!(snapshot.interval_s, 1);
        assert_eq!(snapshot.capacity, 4);
    }

    #[test]
    fn test_zero_divisor_rejected() {
        let mut engine = Engine::new();
        let mut store = MemStore::new();
        let mut b = body(1, 4);
        b.divisor = 0.0;
        assert_eq!(
            engine.configure(ch(0), &b, 0, &mut store),
            Err(ApiError::Validation(
                crate::domain::config::ValidationError::ZeroDivisor
            ))
        );
        assert_eq!(engine.config_snapshot(ch(0)), Err(ApiError::NotConfigured));
    }

    #[test]
    fn test_store_failure_is_distinct_from_validation() {
        let mut engine = Engine::new();
        let mut store = MemStore::new();
        store.set_fail_writes(true);

        let result = engine.configure(ch(0), &body(1, 4), 0, &mut store);
        assert_eq!(result, Err(ApiError::Persistence(StoreError::WriteFailed)));
        // Applied but not saved: the live engine runs the new config
        assert!(engine.config_snapshot(ch(0)).is_ok());
    }

    #[test]
    fn test_request_dispatch_errors() {
        let mut engine = Engine::new();
        let mut store = MemStore::new();

        let response = engine.handle_request(ApiRequest::GetData { channel: 7 }, 0, &mut store);
        assert_eq!(
            response,
            ApiResponse::Error {
                error: ApiError::InvalidChannel
            }
        );

        let response = engine.handle_request(ApiRequest::GetData { channel: 0 }, 0, &mut store);
        assert_eq!(
            response,
            ApiResponse::Error {
                error: ApiError::NotConfigured
            }
        );
    }
}
