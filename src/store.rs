use crate::error::{BloomError, Result};
use bitvec::{order::Msb0, vec::BitVec};
use std::collections::HashMap;
use std::time::Duration;
use tracing::trace;

/// Client for a key-value store holding bit-addressable records.
///
/// Each call is one store round trip and is expected to be atomic on its
/// own. Failures are returned as-is and never retried by callers in this
/// crate; retry policy belongs to the client.
pub trait StoreClient {
    /// Sets the slot at `offset` within record `key` to `value`.
    fn set_bit(&mut self, key: &str, offset: u64, value: u8) -> Result<()>;

    /// Reads the slot at `offset` within record `key`. A missing record or
    /// an offset past its end reads as 0.
    fn get_bit(&self, key: &str, offset: u64) -> Result<u8>;

    /// Removes the listed records. Missing keys are not an error.
    fn delete(&mut self, keys: &[String]) -> Result<()>;

    /// Sets a time-to-live on record `key`.
    fn expire(&mut self, key: &str, ttl: Duration) -> Result<()>;
}

impl<C: StoreClient + ?Sized> StoreClient for Box<C> {
    fn set_bit(&mut self, key: &str, offset: u64, value: u8) -> Result<()> {
        (**self).set_bit(key, offset, value)
    }

    fn get_bit(&self, key: &str, offset: u64) -> Result<u8> {
        (**self).get_bit(key, offset)
    }

    fn delete(&mut self, keys: &[String]) -> Result<()> {
        (**self).delete(keys)
    }

    fn expire(&mut self, key: &str, ttl: Duration) -> Result<()> {
        (**self).expire(key, ttl)
    }
}

/// In-process `StoreClient` with Redis string-bit semantics.
///
/// Records grow on demand up to the highest offset written. TTLs are
/// recorded so they can be inspected, but are not enforced.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, BitVec<u8, Msb0>>,
    ttls: HashMap<String, Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// TTL last applied to `key`, if the key exists and has one.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.ttls.get(key).copied()
    }

    /// Existing record keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.records.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn to_index(offset: u64) -> Result<usize> {
        usize::try_from(offset).map_err(|_| {
            BloomError::StorageError(format!(
                "Offset {offset} exceeds addressable memory"
            ))
        })
    }
}

impl StoreClient for MemoryStore {
    fn set_bit(&mut self, key: &str, offset: u64, value: u8) -> Result<()> {
        let index = Self::to_index(offset)?;
        let bits = self.records.entry(key.to_string()).or_default();
        if bits.len() <= index {
            bits.resize(index + 1, false);
        }
        bits.set(index, value != 0);
        trace!(key, offset, value, "memory store set bit");
        Ok(())
    }

    fn get_bit(&self, key: &str, offset: u64) -> Result<u8> {
        let index = Self::to_index(offset)?;
        let value = self
            .records
            .get(key)
            .and_then(|bits| bits.get(index).map(|bit| *bit))
            .unwrap_or(false);
        Ok(value as u8)
    }

    fn delete(&mut self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.records.remove(key);
            self.ttls.remove(key);
        }
        Ok(())
    }

    fn expire(&mut self, key: &str, ttl: Duration) -> Result<()> {
        // Like Redis EXPIRE, a TTL on a missing key is silently dropped
        if self.records.contains_key(key) {
            self.ttls.insert(key.to_string(), ttl);
        }
        Ok(())
    }
}
