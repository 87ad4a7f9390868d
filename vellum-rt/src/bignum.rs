//! Word-array helpers shared by the big-integer object bodies.
//!
//! Magnitudes are little-endian `u64` arrays with no trailing zero word, so a
//! magnitude of zero is the empty slice. Sign lives out-of-band in the owning
//! object body, never in the words themselves.

/// Drops trailing zero words, returning the canonical magnitude.
pub fn trim_words(words: &[u64]) -> Vec<u64> {
    let mut end = words.len();
    while end > 0 && words[end - 1] == 0 {
        end -= 1;
    }
    words[..end].to_vec()
}

/// Number of significant bits in a canonical magnitude.
pub fn bit_len(words: &[u64]) -> u32 {
    match words.last() {
        None => 0,
        Some(&top) => {
            debug_assert!(top != 0, "magnitude not trimmed");
            (words.len() as u32 - 1) * 64 + (64 - top.leading_zeros())
        }
    }
}
