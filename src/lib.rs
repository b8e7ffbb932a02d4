//! Bloom filter with pluggable bit storage.
//!
//! The filter answers "might this item have been added?" with no false
//! negatives and a false positive rate fixed at construction time.
//!
//! HowTo:
//!    * Parameters: `estimate_parameters(n, p)` gives the bit array size `m`
//!      and hash count `k` for `n` expected items at false positive rate `p`.
//!    * Offsets: each item is hashed twice and expanded into `k` offsets with
//!      double hashing, `(h1 + i * h2) mod m`.
//!    * Storage: offsets land in a [`BitSet`], either [`InMemoryBitSet`] or
//!      [`ShardedBitSet`], which splits the bit array across several records
//!      of a key-value store reached through a [`StoreClient`].
//!
//! Insertion sets every offset of the item, a query checks them all and
//! stops at the first unset bit.
//!
//! Things to keep in mind:
//!     * Sharded operations are one store call per offset with no
//!       transaction around them. A failed `add` may leave some of the item's
//!       bits set; repeat the `add` to repair it.
//!     * No bit set locks internally. Share one behind a `Mutex`.
//!     * Parameters and shard layout are fixed for the life of the data.
//!
//! ```
//! use sharded_bloom::{
//!     BloomFilter, MemoryStore, ShardedBitSet, estimate_parameters,
//! };
//!
//! let params = estimate_parameters(1000, 0.01).unwrap();
//! let bits =
//!     ShardedBitSet::new("seen", params.bit_vector_size, MemoryStore::new())
//!         .unwrap();
//! let mut filter =
//!     BloomFilter::new(params.bit_vector_size, params.num_hashes, bits)
//!         .unwrap();
//!
//! filter.add(b"some key").unwrap();
//! assert!(filter.exists(b"some key").unwrap());
//! ```

mod bitset;
mod config;
mod error;
mod filter;
mod hash;
mod inmemory;
#[cfg(feature = "redis")]
mod redis_store;
mod sharded;
mod store;

pub use bitset::BitSet;
pub use config::{
    FilterConfig, FilterConfigBuilder, FilterConfigBuilderError, FilterParams,
    ShardConfig, ShardConfigBuilder, ShardConfigBuilderError,
    estimate_parameters,
};
pub use error::{BloomError, Result};
pub use filter::BloomFilter;
pub use hash::{
    HashFunction, default_hash_function, optimal_bit_vector_size,
    optimal_num_hashes,
};
pub use inmemory::InMemoryBitSet;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
pub use sharded::{
    DEFAULT_SHARD_CAPACITY, ShardedBitSet, shard_key, shard_location,
};
pub use store::{MemoryStore, StoreClient};
