//! Bitwise majority voting.

use crate::reading::Reading;

/// Bitwise two-out-of-three majority of a reading.
///
/// Each output bit is set iff at least two of the three samples have it set.
/// The whole word is voted at once; AND/OR already act on every bit in
/// parallel.
///
/// ```rust
/// use tmr_voter::{Reading, majority_vote};
///
/// assert_eq!(majority_vote(Reading::new(0b110, 0b101, 0b011)), 0b111);
/// assert_eq!(majority_vote(Reading::new(0b100, 0b010, 0b001)), 0b000);
/// ```
#[must_use]
#[inline]
pub const fn majority_vote(reading: Reading) -> u16 {
    let [v0, v1, v2] = reading.samples();
    (v0 & v1) | (v0 & v2) | (v1 & v2)
}

/// Mask a raw reading and vote it. Returns the masked reading with the result.
#[must_use]
#[inline]
pub const fn vote_masked(raw: Reading, mask: u16) -> (Reading, u16) {
    let masked = raw.masked(mask);
    (masked, majority_vote(masked))
}

/// Bits on which the three samples are not unanimous.
#[must_use]
#[inline]
pub const fn disagreement_bits(reading: Reading) -> u16 {
    let [v0, v1, v2] = reading.samples();
    (v0 ^ v1) | (v0 ^ v2)
}
