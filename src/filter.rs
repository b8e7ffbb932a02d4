use crate::bitset::BitSet;
use crate::config::{FilterConfig, FilterParams};
use crate::error::{BloomError, Result};
use crate::hash::{HashFunction, default_hash_function};
use std::time::Duration;

/// Bloom filter over any [`BitSet`].
///
/// `exists` returning false means the item was never successfully added.
/// True means it possibly was; the false positive rate is bounded by the
/// parameters the filter was built with.
pub struct BloomFilter<B> {
    params: FilterParams,
    hash_function: HashFunction,
    bitset: B,
}

impl<B: BitSet> BloomFilter<B> {
    /// Filter with explicit `m` (bit vector size) and `k` (hash count).
    /// `bitset` must hold at least `bit_vector_size` bits.
    pub fn new(
        bit_vector_size: u64,
        num_hashes: usize,
        bitset: B,
    ) -> Result<Self> {
        Self::with_hash_function(
            FilterParams {
                bit_vector_size,
                num_hashes,
            },
            default_hash_function,
            bitset,
        )
    }

    /// Filter sized from `config` (capacity and target false positive rate).
    pub fn from_config(config: &FilterConfig, bitset: B) -> Result<Self> {
        let params = config.params()?;
        Self::with_hash_function(params, config.hash_function, bitset)
    }

    pub fn with_hash_function(
        params: FilterParams,
        hash_function: HashFunction,
        bitset: B,
    ) -> Result<Self> {
        if params.bit_vector_size == 0 {
            return Err(BloomError::ZeroCapacity);
        }
        if params.num_hashes == 0 {
            return Err(BloomError::InvalidConfig(
                "Number of hashes must be > 0".into(),
            ));
        }

        Ok(Self {
            params,
            hash_function,
            bitset,
        })
    }

    /// The `k` bit offsets for `item`.
    pub fn offsets(&self, item: &[u8]) -> Vec<u64> {
        (self.hash_function)(
            item,
            self.params.num_hashes,
            self.params.bit_vector_size,
        )
    }

    /// Adds `item`. On a storage error the item may be partially recorded;
    /// calling `add` again is safe.
    pub fn add(&mut self, item: &[u8]) -> Result<()> {
        let offsets = self.offsets(item);
        self.bitset.set(&offsets)
    }

    pub fn exists(&self, item: &[u8]) -> Result<bool> {
        let offsets = self.offsets(item);
        self.bitset.test(&offsets)
    }

    pub fn expire(&mut self, ttl: Duration) -> Result<()> {
        self.bitset.expire(ttl)
    }

    pub fn delete(&mut self) -> Result<()> {
        self.bitset.delete()
    }

    pub fn params(&self) -> FilterParams {
        self.params
    }

    pub fn bit_vector_size(&self) -> u64 {
        self.params.bit_vector_size
    }

    pub fn num_hashes(&self) -> usize {
        self.params.num_hashes
    }

    pub fn bitset(&self) -> &B {
        &self.bitset
    }

    pub fn bitset_mut(&mut self) -> &mut B {
        &mut self.bitset
    }

    pub fn into_bitset(self) -> B {
        self.bitset
    }
}

impl<B> std::fmt::Debug for BloomFilter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BloomFilter {{ bit_vector_size: {}, num_hashes: {} }}",
            self.params.bit_vector_size, self.params.num_hashes
        )
    }
}
