//! Character-sum hashing used to pick a patient's bucket.
//!
//! The hash is deliberately simple and non-cryptographic: the sum of the Unicode scalar values
//! of every character in the patient ID, reduced modulo [`BUCKET_COUNT`]. Any implementation
//! that sums code points the same way produces the same bucket for the same ID.

use crate::constants::BUCKET_COUNT;

/// Computes the hash index (bucket number) of a patient ID.
///
/// The result is always in `0..BUCKET_COUNT`. Reducing at every step keeps the accumulator
/// bounded for arbitrarily long IDs without changing the result.
///
/// ```
/// use hpr_core::compute_hash_index;
///
/// // 'P' (80) + '1' (49) = 129
/// assert_eq!(compute_hash_index("P1"), 9);
/// ```
pub fn compute_hash_index(pid: &str) -> usize {
    pid.chars().fold(0, |acc, c| {
        (acc + u32::from(c) as usize % BUCKET_COUNT) % BUCKET_COUNT
    })
}
