// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Occupied-cell bitset for unified damage grids.

use core::fmt;
use core::ops::BitOrAssign;

use smallvec::SmallVec;

const WORD_BITS: usize = u64::BITS as usize;

/// A compact set of grid cell indices.
///
/// Grids of up to 64 cells stay inline.
#[derive(Clone, Default)]
pub(crate) struct CellSet {
    words: SmallVec<[u64; 1]>,
}

impl CellSet {
    /// Creates an empty set able to hold indices below `cells` without growing.
    pub(crate) fn with_capacity(cells: usize) -> Self {
        let mut words = SmallVec::new();
        words.resize(cells.div_ceil(WORD_BITS), 0);
        Self { words }
    }

    pub(crate) fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub(crate) fn insert(&mut self, index: usize) {
        let word = index / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (index % WORD_BITS);
    }

    /// Iterates the set indices in increasing order.
    pub(crate) fn iter(&self) -> CellSetIter<'_> {
        CellSetIter {
            words: &self.words,
            base: 0,
            bits: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl fmt::Debug for CellSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl BitOrAssign<&Self> for CellSet {
    fn bitor_assign(&mut self, rhs: &Self) {
        if rhs.words.len() > self.words.len() {
            self.words.resize(rhs.words.len(), 0);
        }
        for (word, other) in self.words.iter_mut().zip(&rhs.words) {
            *word |= *other;
        }
    }
}

/// Iterator over the indices in a [`CellSet`].
#[derive(Clone, Debug)]
pub(crate) struct CellSetIter<'a> {
    words: &'a [u64],
    /// Index of the word `bits` was loaded from.
    base: usize,
    bits: u64,
}

impl Iterator for CellSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        while self.bits == 0 {
            self.base += 1;
            self.bits = *self.words.get(self.base)?;
        }
        let index = self.base * WORD_BITS + self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1; // Clear the lowest set bit
        Some(index)
    }
}
