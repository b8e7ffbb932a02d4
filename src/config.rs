use crate::error::{BloomError, Result};
use crate::hash::{
    HashFunction, default_hash_function, optimal_bit_vector_size,
    optimal_num_hashes,
};
use crate::sharded::DEFAULT_SHARD_CAPACITY;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for a Bloom filter
#[derive(Clone, Debug, Builder)]
#[builder(pattern = "owned")]
pub struct FilterConfig {
    /// Expected number of elements
    #[builder(default = "1_000_000")]
    pub capacity: u64,

    /// Target false positive rate (0.0 to 1.0, exclusive)
    #[builder(default = "0.01")]
    pub false_positive_rate: f64,

    /// Hash function to use
    #[builder(default = "default_hash_function")]
    pub hash_function: HashFunction,
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        validate_inputs(self.capacity, self.false_positive_rate)
    }

    /// Bit array size and hash count for this configuration.
    pub fn params(&self) -> Result<FilterParams> {
        estimate_parameters(self.capacity, self.false_positive_rate)
    }
}

/// Derived filter parameters, fixed once a filter exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    /// `m`, the logical bit array length
    pub bit_vector_size: u64,
    /// `k`, the number of offsets per item
    pub num_hashes: usize,
}

/// Smallest `(m, k)` that keeps the false positive rate at or below
/// `fpr` after `capacity` insertions.
pub fn estimate_parameters(capacity: u64, fpr: f64) -> Result<FilterParams> {
    validate_inputs(capacity, fpr)?;

    let bit_vector_size = optimal_bit_vector_size(capacity, fpr);
    let num_hashes = optimal_num_hashes(capacity, bit_vector_size);

    Ok(FilterParams {
        bit_vector_size,
        num_hashes,
    })
}

fn validate_inputs(capacity: u64, fpr: f64) -> Result<()> {
    if capacity == 0 {
        return Err(BloomError::ZeroCapacity);
    }
    // Written so that NaN is rejected too.
    if !(fpr > 0.0 && fpr < 1.0) {
        return Err(BloomError::InvalidFalsePositiveRate { rate: fpr });
    }
    Ok(())
}

/// Layout of a sharded bit set in the external store.
///
/// Both fields are part of the stored data's schema: a filter written with
/// one prefix/capacity pair cannot be read back with another.
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned", setter(into))]
pub struct ShardConfig {
    /// Shard keys are `"<key_prefix>:<shard_index>"`
    pub key_prefix: String,

    /// Bits addressable within one shard record
    #[builder(default = "DEFAULT_SHARD_CAPACITY")]
    pub shard_capacity: u64,
}

impl ShardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.shard_capacity == 0 {
            return Err(BloomError::InvalidConfig(
                "Shard capacity must be > 0".into(),
            ));
        }
        Ok(())
    }
}
