//! A logical bit array spread over fixed-capacity records of a key-value
//! store.
//!
//! Offset `o` lives in shard `o / shard_capacity` at local offset
//! `o % shard_capacity`, under the key `"<prefix>:<shard>"`. Shards are
//! created by the store on first write; an untouched shard may not exist.
//!
//! Multi-offset `set` and `test` are not atomic. Each offset is one store
//! call, and the first failing call aborts the operation with the offsets
//! before it already applied. Since bits are only ever set, interleaved
//! writers cannot produce false negatives, but a failed `set` can leave an
//! item visible on some of its positions only. Retrying the `set` repairs it.

use crate::bitset::BitSet;
use crate::config::ShardConfig;
use crate::error::{BloomError, Result};
use crate::store::StoreClient;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Bits per shard record. Matches the 512 MiB string limit of deployments
/// already written with this layout; changing it breaks existing data.
pub const DEFAULT_SHARD_CAPACITY: u64 = 512 * 1024 * 1024;

/// Maps a logical offset to `(shard_index, local_offset)`.
pub fn shard_location(offset: u64, shard_capacity: u64) -> (u64, u64) {
    let shard = offset / shard_capacity;
    (shard, offset - shard * shard_capacity)
}

pub fn shard_key(key_prefix: &str, shard: u64) -> String {
    format!("{key_prefix}:{shard}")
}

pub struct ShardedBitSet<C> {
    key_prefix: String,
    shard_capacity: u64,
    bit_vector_size: u64,
    client: C,
}

impl<C: StoreClient> ShardedBitSet<C> {
    /// Sharded bit set of `bit_vector_size` bits using the default shard
    /// capacity.
    pub fn new(
        key_prefix: impl Into<String>,
        bit_vector_size: u64,
        client: C,
    ) -> Result<Self> {
        let config = ShardConfig {
            key_prefix: key_prefix.into(),
            shard_capacity: DEFAULT_SHARD_CAPACITY,
        };
        Self::from_config(config, bit_vector_size, client)
    }

    pub fn from_config(
        config: ShardConfig,
        bit_vector_size: u64,
        client: C,
    ) -> Result<Self> {
        config.validate()?;
        if bit_vector_size == 0 {
            return Err(BloomError::ZeroCapacity);
        }

        debug!(
            key_prefix = %config.key_prefix,
            shard_capacity = config.shard_capacity,
            bit_vector_size,
            "created sharded bit set"
        );

        Ok(Self {
            key_prefix: config.key_prefix,
            shard_capacity: config.shard_capacity,
            bit_vector_size,
            client,
        })
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn shard_capacity(&self) -> u64 {
        self.shard_capacity
    }

    pub fn len(&self) -> u64 {
        self.bit_vector_size
    }

    pub fn is_empty(&self) -> bool {
        self.bit_vector_size == 0
    }

    /// Number of shard keys covered by `expire` and `delete`.
    ///
    /// Indices run `0..=m / shard_capacity`, so when `m` is an exact
    /// multiple of the capacity one trailing key is included that no
    /// offset maps to. Existing deployments rely on this key range.
    pub fn shard_count(&self) -> u64 {
        self.bit_vector_size / self.shard_capacity + 1
    }

    pub fn shard_keys(&self) -> Vec<String> {
        (0..self.shard_count())
            .map(|shard| shard_key(&self.key_prefix, shard))
            .collect()
    }

    /// Store key and local offset for a logical offset.
    pub fn locate(&self, offset: u64) -> (String, u64) {
        let (shard, local) = shard_location(offset, self.shard_capacity);
        (shard_key(&self.key_prefix, shard), local)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn into_client(self) -> C {
        self.client
    }

    fn check_bounds(&self, offsets: &[u64]) -> Result<()> {
        if let Some(&max_offset) = offsets.iter().max() {
            if max_offset >= self.bit_vector_size {
                return Err(BloomError::IndexOutOfBounds {
                    index: max_offset,
                    capacity: self.bit_vector_size,
                });
            }
        }
        Ok(())
    }
}

impl<C: StoreClient> BitSet for ShardedBitSet<C> {
    fn set(&mut self, offsets: &[u64]) -> Result<()> {
        self.check_bounds(offsets)?;

        for (written, &offset) in offsets.iter().enumerate() {
            let (key, local) = self.locate(offset);
            trace!(%key, local, "set bit");
            if let Err(e) = self.client.set_bit(&key, local, 1) {
                warn!(
                    key_prefix = %self.key_prefix,
                    written,
                    total = offsets.len(),
                    error = %e,
                    "set failed partway, earlier bits remain set"
                );
                return Err(e);
            }
        }
        Ok(())
    }

    fn test(&self, offsets: &[u64]) -> Result<bool> {
        self.check_bounds(offsets)?;

        for &offset in offsets {
            let (key, local) = self.locate(offset);
            let value = self.client.get_bit(&key, local)?;
            trace!(%key, local, value, "get bit");
            if value == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn expire(&mut self, ttl: Duration) -> Result<()> {
        debug!(key_prefix = %self.key_prefix, ?ttl, "expiring shards");
        for key in self.shard_keys() {
            self.client.expire(&key, ttl)?;
        }
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        let keys = self.shard_keys();
        debug!(
            key_prefix = %self.key_prefix,
            shards = keys.len(),
            "deleting shards"
        );
        self.client.delete(&keys)
    }
}

impl<C> std::fmt::Debug for ShardedBitSet<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ShardedBitSet {{ key_prefix: {:?}, shard_capacity: {}, len: {} }}",
            self.key_prefix, self.shard_capacity, self.bit_vector_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShardConfigBuilder;
    use crate::store::MemoryStore;

    fn small_shards(m: u64, capacity: u64) -> ShardedBitSet<MemoryStore> {
        let config = ShardConfigBuilder::default()
            .key_prefix("test_key")
            .shard_capacity(capacity)
            .build()
            .unwrap();
        ShardedBitSet::from_config(config, m, MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_shard_location() {
        assert_eq!(shard_location(0, 512), (0, 0));
        assert_eq!(shard_location(511, 512), (0, 511));
        assert_eq!(shard_location(512, 512), (1, 0));
        assert_eq!(shard_location(1500, 512), (2, 476));
        assert_eq!(
            shard_location(DEFAULT_SHARD_CAPACITY * 3 + 7, DEFAULT_SHARD_CAPACITY),
            (3, 7)
        );
    }

    #[test]
    fn test_shard_key_format() {
        assert_eq!(shard_key("test_key", 0), "test_key:0");
        assert_eq!(shard_key("a:b", 12), "a:b:12");
    }

    #[test]
    fn test_shard_keys_cover_inclusive_range() {
        let bits = small_shards(1024, 512);
        assert_eq!(bits.shard_count(), 3);
        assert_eq!(
            bits.shard_keys(),
            vec!["test_key:0", "test_key:1", "test_key:2"]
        );

        let bits = small_shards(1000, 512);
        assert_eq!(bits.shard_count(), 2);

        let bits = small_shards(100, DEFAULT_SHARD_CAPACITY);
        assert_eq!(bits.shard_keys(), vec!["test_key:0"]);
    }

    #[test]
    fn test_set_writes_local_offset() {
        let mut bits = small_shards(2048, 512);
        bits.set(&[512]).unwrap();

        assert_eq!(bits.client().get_bit("test_key:1", 0).unwrap(), 1);
        assert_eq!(bits.client().get_bit("test_key:0", 0).unwrap(), 0);
        assert!(!bits.client().contains_key("test_key:0"));
        assert!(bits.test(&[512]).unwrap());
        assert!(!bits.test(&[0]).unwrap());
    }

    #[test]
    fn test_out_of_range_writes_nothing() {
        let mut bits = small_shards(1000, 512);
        let err = bits.set(&[3, 1000]).unwrap_err();
        assert!(matches!(err, BloomError::IndexOutOfBounds { .. }));
        assert!(bits.client().keys().is_empty());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            ShardedBitSet::new("p", 0, MemoryStore::new()),
            Err(BloomError::ZeroCapacity)
        ));
    }
}
