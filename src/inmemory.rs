use crate::bitset::BitSet;
use crate::error::{BloomError, Result};
use bitvec::{bitvec, order::Lsb0, vec::BitVec};
use std::time::Duration;

// In-memory bit set implementation
pub struct InMemoryBitSet {
    bits: BitVec<usize, Lsb0>,
}

impl InMemoryBitSet {
    pub fn new(bit_vector_size: u64) -> Result<Self> {
        if bit_vector_size == 0 {
            return Err(BloomError::ZeroCapacity);
        }
        let len = usize::try_from(bit_vector_size).map_err(|_| {
            BloomError::InvalidConfig(format!(
                "Bit vector size {bit_vector_size} does not fit in memory"
            ))
        })?;

        Ok(Self {
            bits: bitvec![usize, Lsb0; 0; len],
        })
    }

    pub fn len(&self) -> u64 {
        self.bits.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of bits currently set
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    fn check_bounds(&self, offsets: &[u64]) -> Result<()> {
        if let Some(&max_offset) = offsets.iter().max() {
            if max_offset >= self.len() {
                return Err(BloomError::IndexOutOfBounds {
                    index: max_offset,
                    capacity: self.len(),
                });
            }
        }
        Ok(())
    }
}

impl BitSet for InMemoryBitSet {
    fn set(&mut self, offsets: &[u64]) -> Result<()> {
        // Check all offsets first so a bad call changes nothing
        self.check_bounds(offsets)?;

        for &offset in offsets {
            self.bits.set(offset as usize, true);
        }
        Ok(())
    }

    fn test(&self, offsets: &[u64]) -> Result<bool> {
        self.check_bounds(offsets)?;

        Ok(offsets.iter().all(|&offset| self.bits[offset as usize]))
    }

    fn expire(&mut self, _ttl: Duration) -> Result<()> {
        // Nothing outlives the process, nothing to expire
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        self.bits.fill(false);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryBitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "InMemoryBitSet {{ len: {}, ones: {} }}",
            self.bits.len(),
            self.bits.count_ones()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_test() {
        let mut bits = InMemoryBitSet::new(512).unwrap();
        assert!(!bits.test(&[0]).unwrap());

        bits.set(&[0, 100, 511]).unwrap();
        assert!(bits.test(&[0]).unwrap());
        assert!(bits.test(&[0, 100, 511]).unwrap());
        assert!(!bits.test(&[0, 101]).unwrap());
        assert_eq!(bits.count_ones(), 3);
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut bits = InMemoryBitSet::new(64).unwrap();
        bits.set(&[7, 7, 9]).unwrap();
        bits.set(&[7]).unwrap();
        assert_eq!(bits.count_ones(), 2);
        assert!(bits.test(&[7, 9]).unwrap());
    }

    #[test]
    fn test_out_of_bounds_leaves_bits_untouched() {
        let mut bits = InMemoryBitSet::new(10).unwrap();
        let err = bits.set(&[1, 10]).unwrap_err();
        assert!(matches!(
            err,
            BloomError::IndexOutOfBounds {
                index: 10,
                capacity: 10
            }
        ));
        assert_eq!(bits.count_ones(), 0);
        assert!(bits.test(&[10]).is_err());
    }

    #[test]
    fn test_expire_is_noop_and_delete_clears() {
        let mut bits = InMemoryBitSet::new(128).unwrap();
        bits.set(&[3, 64]).unwrap();
        bits.expire(Duration::from_secs(1)).unwrap();
        assert!(bits.test(&[3, 64]).unwrap());

        bits.delete().unwrap();
        assert_eq!(bits.count_ones(), 0);
        assert!(!bits.test(&[3]).unwrap());
        assert_eq!(bits.len(), 128);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            InMemoryBitSet::new(0),
            Err(BloomError::ZeroCapacity)
        ));
    }
}
