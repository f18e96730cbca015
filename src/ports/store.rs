//! Config store port - abstraction for persisted typed scalars
//!
//! This trait lets configuration survive reboot without the core knowing
//! the mechanism (NVS, flash key-value store, an in-memory map on the
//! host). Keys are flat strings under a fixed namespace prefix; there is
//! no multi-key transaction, so callers persist each field independently
//! and must tolerate a torn write across fields on power loss.

use serde::{Deserialize, Serialize};

/// Error type for store operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Store not reachable / not mounted
    Unavailable,
    /// A put did not land
    WriteFailed,
    /// No room for another key
    Full,
}

/// Port for persisting and reading back typed scalar values.
///
/// Reads never fail: an absent or unreadable key yields the caller's
/// default, which is how boot reconciliation fills in fields that were
/// never persisted.
///
/// # Example Implementation
///
/// ```ignore
/// struct NvsStore {
///     nvs: EspNvs<NvsDefault>,
/// }
///
/// impl ConfigStore for NvsStore {
///     fn get_u32(&mut self, key: &str, default: u32) -> u32 {
///         self.nvs.get_u32(key).ok().flatten().unwrap_or(default)
///     }
///
///     fn put_u32(&mut self, key: &str, value: u32) -> Result<(), StoreError> {
///         self.nvs.set_u32(key, value).map_err(|_| StoreError::WriteFailed)
///     }
///     // ...
/// }
/// ```
pub trait ConfigStore {
    /// Read a bool, falling back to `default` when absent
    fn get_bool(&mut self, key: &str, default: bool) -> bool;

    /// Read a u32, falling back to `default` when absent
    fn get_u32(&mut self, key: &str, default: u32) -> u32;

    /// Read an f32, falling back to `default` when absent
    fn get_f32(&mut self, key: &str, default: f32) -> f32;

    /// Persist a bool
    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StoreError>;

    /// Persist a u32
    fn put_u32(&mut self, key: &str, value: u32) -> Result<(), StoreError>;

    /// Persist an f32
    fn put_f32(&mut self, key: &str, value: f32) -> Result<(), StoreError>;
}
