//! Sparse claimed-slot bitmap.
//!
//! One bit per index, packed into 64-bit words keyed by `index / 64`.
//! Only words with at least one bit set are stored, so sparse or
//! non-contiguous index spaces stay cheap.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ClaimBitmap {
    words: HashMap<u64, u64>,
    count: usize,
}

#[inline]
fn locate(index: u64) -> (u64, u64) {
    (index / 64, 1u64 << (index % 64))
}

impl ClaimBitmap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, index: u64) -> bool {
        let (word, mask) = locate(index);
        self.words.get(&word).is_some_and(|w| w & mask != 0)
    }

    /// Set the bit for `index`. Returns `false` if it was already set.
    pub fn set(&mut self, index: u64) -> bool {
        let (word, mask) = locate(index);
        let w = self.words.entry(word).or_insert(0);
        if *w & mask != 0 {
            return false;
        }
        *w |= mask;
        self.count += 1;
        true
    }

    /// Roll back a bit set within the same critical section.
    pub(crate) fn unset(&mut self, index: u64) {
        let (word, mask) = locate(index);
        if let Some(w) = self.words.get_mut(&word) {
            if *w & mask != 0 {
                *w &= !mask;
                self.count -= 1;
            }
            if *w == 0 {
                self.words.remove(&word);
            }
        }
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.count
    }
}
