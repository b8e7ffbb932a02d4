use crate::error::Result;
use std::time::Duration;

/// Storage for the filter's `m` logical bits.
///
/// Bits are only ever set, never cleared individually. Mutating operations
/// take `&mut self`; to share one bit set between threads wrap it in a
/// `Mutex` (none of the implementations lock internally).
pub trait BitSet {
    /// Sets every listed offset to 1. Setting an already-set bit is a no-op.
    fn set(&mut self, offsets: &[u64]) -> Result<()>;

    /// Returns true iff every listed offset is 1, stopping at the first 0.
    fn test(&self, offsets: &[u64]) -> Result<bool>;

    /// Hints that the backing data may be reclaimed after `ttl`.
    fn expire(&mut self, ttl: Duration) -> Result<()>;

    /// Removes all storage held by this bit set.
    fn delete(&mut self) -> Result<()>;
}

impl<B: BitSet + ?Sized> BitSet for Box<B> {
    fn set(&mut self, offsets: &[u64]) -> Result<()> {
        (**self).set(offsets)
    }

    fn test(&self, offsets: &[u64]) -> Result<bool> {
        (**self).test(offsets)
    }

    fn expire(&mut self, ttl: Duration) -> Result<()> {
        (**self).expire(ttl)
    }

    fn delete(&mut self) -> Result<()> {
        (**self).delete()
    }
}
