use fnv::FnvHasher;
use murmur3::murmur3_x64_128;
use std::hash::Hasher;
use std::io::Cursor;

/// A type alias for the hash function used in the Bloom filter.
///
/// This function takes an input item and computes multiple bit offsets
/// for the Bloom filter's bit array.
///
/// **Parameters:**
///
/// - `item: &[u8]`
///   - A byte slice representing the item to be hashed.
/// - `num_hashes: usize`
///   - The number of offsets to compute for the item (`k`).
/// - `bit_vector_size: u64`
///   - The length of the logical bit array (`m`). Every returned offset
///     lies in `[0, bit_vector_size)`.
///
/// **Returns:**
///
/// - `Vec<u64>`
///   - Exactly `num_hashes` offsets, in generation order.
///
/// The same item with the same `(k, m)` must always yield the same offsets,
/// otherwise previously added items become invisible.
pub type HashFunction = fn(&[u8], usize, u64) -> Vec<u64>;

pub(crate) fn hash_murmur128_low(key: &[u8]) -> u64 {
    let mut cursor = Cursor::new(key);
    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3_x64_128(&mut cursor, 0)
        .expect("Failed to compute Murmur3 hash");
    hash as u64
}

pub(crate) fn hash_fnv64(key: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(key);
    hasher.finish()
}

/// Kirsch-Mitzenmacher double hashing: `offset_i = (h1 + i * h2) mod m`,
/// with `h1` from Murmur3 x64_128 and `h2` from FNV-1a 64. Arithmetic wraps
/// at 64 bits before the modulo.
pub fn default_hash_function(
    item: &[u8],
    num_hashes: usize,
    bit_vector_size: u64,
) -> Vec<u64> {
    let h1 = hash_murmur128_low(item);
    let h2 = hash_fnv64(item);
    (0..num_hashes as u64)
        .map(|i| h1.wrapping_add(i.wrapping_mul(h2)) % bit_vector_size)
        .collect()
}

/// `m = ceil(-n * ln(p) / (ln 2)^2)`
pub fn optimal_bit_vector_size(n: u64, fpr: f64) -> u64 {
    let ln2 = std::f64::consts::LN_2;
    ((-(n as f64) * fpr.ln()) / (ln2 * ln2)).ceil() as u64
}

/// `k = round(m / n * ln 2)`, never less than one.
pub fn optimal_num_hashes(n: u64, m: u64) -> usize {
    let k = ((m as f64 / n as f64) * std::f64::consts::LN_2).round() as usize;
    k.max(1)
}
