//! Shared protocol for the pull-side configuration/query interface
//!
//! This module defines the request/response messages exchanged between the
//! acquisition core and whatever transport owns the pull interface (an HTTP
//! router on the device, a host-side shell during development). The
//! transport owns its own wire format; what is fixed here is the payload
//! schema and a postcard+COBS framing for byte transports.

use serde::{Deserialize, Serialize};

use crate::domain::calibration::Calibration;
use crate::domain::config::{ChannelConfig, ValidationError, MAX_BUFFER};
use crate::domain::sample::Sample;
use crate::ports::store::StoreError;

/// Maximum samples in a single data response (one full history)
pub const MAX_SAMPLES_PER_RESPONSE: usize = MAX_BUFFER;

/// Maximum COBS frame size on byte transports
pub const MAX_FRAME: usize = 2048;

/// Configuration payload for one channel.
///
/// Interval travels in seconds (converted to milliseconds on apply);
/// calibration and filter length are optional and default to identity /
/// no filtering when omitted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigBody {
    /// Sampling interval in seconds
    pub interval_s: u32,
    /// History depth in samples
    pub capacity: u16,
    /// Sampling gate
    pub enabled: bool,
    /// Calibration offset (volts)
    #[serde(default)]
    pub offset: f32,
    /// Calibration factor
    #[serde(default = "one_f32")]
    pub factor: f32,
    /// Calibration divisor
    #[serde(default = "one_f32")]
    pub divisor: f32,
    /// Moving-average window length
    #[serde(default = "one_u16")]
    pub filter_len: u16,
}

fn one_f32() -> f32 {
    1.0
}

fn one_u16() -> u16 {
    1
}

impl ConfigBody {
    /// Expand into the in-memory configuration (seconds → milliseconds)
    pub fn to_config(&self) -> ChannelConfig {
        ChannelConfig {
            enabled: self.enabled,
            interval_ms: self.interval_s.saturating_mul(1000),
            capacity: self.capacity,
            calibration: Calibration::new(self.offset, self.factor, self.divisor),
            filter_len: self.filter_len,
        }
    }

    /// Snapshot an applied configuration back into wire form
    pub fn from_config(config: &ChannelConfig) -> Self {
        Self {
            interval_s: config.interval_ms / 1000,
            capacity: config.capacity,
            enabled: config.enabled,
            offset: config.calibration.offset,
            factor: config.calibration.factor,
            divisor: config.calibration.divisor,
            filter_len: config.filter_len,
        }
    }
}

/// Request sent to the acquisition core
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ApiRequest {
    /// Read back a channel's applied configuration
    GetConfig { channel: u8 },

    /// Apply and persist a channel configuration
    SetConfig { channel: u8, body: ConfigBody },

    /// Drain a channel's unread history (destructive)
    GetData { channel: u8 },
}

/// Structured failure surfaced to the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ApiError {
    /// Channel index outside the configured range
    InvalidChannel,
    /// Operation on a channel never successfully configured
    NotConfigured,
    /// A configuration bound was violated; prior state is unchanged
    Validation(ValidationError),
    /// Configuration applied but not fully persisted
    Persistence(StoreError),
    /// Unparseable request payload
    MalformedRequest,
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Persistence(err)
    }
}

/// Response from the acquisition core
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ApiResponse {
    /// Configuration applied and persisted
    Ok,

    /// Applied configuration snapshot
    Config { body: ConfigBody },

    /// Drained history plus whether it overflowed since the last drain
    Data {
        samples: heapless::Vec<Sample, MAX_SAMPLES_PER_RESPONSE>,
        overflow: bool,
    },

    /// Structured failure
    Error { error: ApiError },
}

impl From<ApiError> for ApiResponse {
    fn from(error: ApiError) -> Self {
        ApiResponse::Error { error }
    }
}

/// COBS-encode a request for a byte transport
pub fn encode_request(
    request: &ApiRequest,
) -> Result<heapless::Vec<u8, MAX_FRAME>, postcard::Error> {
    let mut buf = [0u8; MAX_FRAME];
    let used = postcard::to_slice_cobs(request, &mut buf)?.len();
    heapless::Vec::from_slice(&buf[..used]).map_err(|_| postcard::Error::SerializeBufferFull)
}

/// Decode a COBS frame into a request (the buffer is decoded in place)
pub fn decode_request(frame: &mut [u8]) -> Result<ApiRequest, ApiError> {
    postcard::from_bytes_cobs(frame).map_err(|_| ApiError::MalformedRequest)
}

/// COBS-encode a response for a byte transport
pub fn encode_response(
    response: &ApiResponse,
) -> Result<heapless::Vec<u8, MAX_FRAME>, postcard::Error> {
    let mut buf = [0u8; MAX_FRAME];
    let used = postcard::to_slice_cobs(response, &mut buf)?.len();
    heapless::Vec::from_slice(&buf[..used]).map_err(|_| postcard::Error::SerializeBufferFull)
}

/// Decode a COBS frame into a response (host side)
pub fn decode_response(frame: &mut [u8]) -> Result<ApiResponse, postcard::Error> {
    postcard::from_bytes_cobs(frame)
}
