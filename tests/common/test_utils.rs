// Shared by several test crates, each using a different subset.
#![allow(dead_code)]

use sharded_bloom::{BloomError, MemoryStore, Result, StoreClient};
use std::cell::{Cell, RefCell};
use std::time::Duration;

/// One store call as seen by `RecordingStore`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetBit { key: String, offset: u64 },
    GetBit { key: String, offset: u64 },
    Delete { keys: Vec<String> },
    Expire { key: String, ttl: Duration },
}

/// `MemoryStore` wrapper that logs every call and can fail on demand.
///
/// With `fail_after(n)` the first `n` calls succeed and every later call
/// returns `BloomError::StorageError`.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    calls: RefCell<Vec<Call>>,
    succeed_remaining: Cell<Option<usize>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_after(self, calls: usize) -> Self {
        self.succeed_remaining.set(Some(calls));
        self
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        self.succeed_remaining.set(None);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.borrow_mut().push(call);
        match self.succeed_remaining.get() {
            Some(0) => Err(BloomError::StorageError("injected failure".into())),
            Some(n) => {
                self.succeed_remaining.set(Some(n - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl StoreClient for RecordingStore {
    fn set_bit(&mut self, key: &str, offset: u64, value: u8) -> Result<()> {
        self.record(Call::SetBit {
            key: key.to_string(),
            offset,
        })?;
        self.inner.set_bit(key, offset, value)
    }

    fn get_bit(&self, key: &str, offset: u64) -> Result<u8> {
        self.record(Call::GetBit {
            key: key.to_string(),
            offset,
        })?;
        self.inner.get_bit(key, offset)
    }

    fn delete(&mut self, keys: &[String]) -> Result<()> {
        self.record(Call::Delete {
            keys: keys.to_vec(),
        })?;
        self.inner.delete(keys)
    }

    fn expire(&mut self, key: &str, ttl: Duration) -> Result<()> {
        self.record(Call::Expire {
            key: key.to_string(),
            ttl,
        })?;
        self.inner.expire(key, ttl)
    }
}

/// Little-endian u32 encodings of `0..count`.
pub fn sequential_items(count: u32) -> Vec<Vec<u8>> {
    (0..count).map(|i| i.to_le_bytes().to_vec()).collect()
}
