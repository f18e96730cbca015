//! In-memory config store adapter
//!
//! Implements the ConfigStore trait over a bounded map. Stands in for the
//! device's non-volatile store on the host and in tests; a `fail_writes`
//! switch exercises the persistence-failure path without a real flash
//! fault.

use heapless::FnvIndexMap;

use crate::ports::store::{ConfigStore, StoreError};

/// Longest key the store accepts
const KEY_LEN: usize = 32;

/// Map slots; must be a power of two and covers every per-channel record
const SLOTS: usize = 64;

#[derive(Clone, Copy, Debug)]
enum StoreValue {
    Bool(bool),
    U32(u32),
    F32(f32),
}

/// Bounded in-memory typed key-value store.
pub struct MemStore {
    map: FnvIndexMap<heapless::String<KEY_LEN>, StoreValue, SLOTS>,
    fail_writes: bool,
}

impl MemStore {
    /// Empty store
    pub fn new() -> Self {
        Self {
            map: FnvIndexMap::new(),
            fail_writes: false,
        }
    }

    /// Make every subsequent put fail (test hook)
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Keys currently stored
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when nothing has been persisted
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn get(&self, key: &str) -> Option<StoreValue> {
        let key = heapless::String::try_from(key).ok()?;
        self.map.get(&key).copied()
    }

    fn put(&mut self, key: &str, value: StoreValue) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::WriteFailed);
        }
        let key = heapless::String::try_from(key).map_err(|_| StoreError::WriteFailed)?;
        match self.map.insert(key, value) {
            Ok(_) => Ok(()),
            Err(_) => Err(StoreError::Full),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for MemStore {
    fn get_bool(&mut self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(StoreValue::Bool(v)) => v,
            _ => default,
        }
    }

    fn get_u32(&mut self, key: &str, default: u32) -> u32 {
        match self.get(key) {
            Some(StoreValue::U32(v)) => v,
            _ => default,
        }
    }

    fn get_f32(&mut self, key: &str, default: f32) -> f32 {
        match self.get(key) {
            Some(StoreValue::F32(v)) => v,
            _ => default,
        }
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StoreError> {
        self.put(key, StoreValue::Bool(value))
    }

    fn put_u32(&mut self, key: &str, value: u32) -> Result<(), StoreError> {
        self.put(key, StoreValue::U32(value))
    }

    fn put_f32(&mut self, key: &str, value: f32) -> Result<(), StoreError> {
        self.put(key, StoreValue::F32(value))
    }
}
