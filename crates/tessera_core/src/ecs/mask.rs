//! # Component Masks and Index Cards
//!
//! Per-entity bookkeeping: which component types an entity owns, and where
//! each owned instance lives in its pool.
//!
//! Both are sized by [`MAX_COMPONENTS`], a hard compile-time capacity. The
//! configured component limit may be lower, never higher.

use crate::MAX_COMPONENTS;

/// Dense index assigned to a component type by the registry.
pub type ComponentIndex = u8;

/// Number of `u64` words in a mask.
const MASK_WORDS: usize = MAX_COMPONENTS.div_ceil(64);

/// Slot index of each owned component, indexed by [`ComponentIndex`].
///
/// Entry `i` is only meaningful while bit `i` of the matching
/// [`ComponentMask`] is set.
pub type IndexCard = [u32; MAX_COMPONENTS];

/// Fixed-width bitset with one bit per component type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComponentMask {
    /// Bitset words, 64 component types per word.
    bits: [u64; MASK_WORDS],
}

impl ComponentMask {
    /// The empty mask.
    pub const EMPTY: Self = Self {
        bits: [0; MASK_WORDS],
    };

    #[inline]
    fn split(index: ComponentIndex) -> (usize, u64) {
        let index = usize::from(index);
        debug_assert!(index < MAX_COMPONENTS, "Component index out of range");
        (index / 64, 1u64 << (index % 64))
    }

    /// Sets the bit for `index`.
    #[inline]
    pub fn set(&mut self, index: ComponentIndex) {
        let (word, bit) = Self::split(index);
        self.bits[word] |= bit;
    }

    /// Clears the bit for `index`.
    #[inline]
    pub fn clear(&mut self, index: ComponentIndex) {
        let (word, bit) = Self::split(index);
        self.bits[word] &= !bit;
    }

    /// Checks the bit for `index`.
    #[inline]
    #[must_use]
    pub fn has(&self, index: ComponentIndex) -> bool {
        let (word, bit) = Self::split(index);
        self.bits[word] & bit != 0
    }

    /// Checks that every bit set in `other` is also set here.
    #[inline]
    #[must_use]
    pub fn contains_all(&self, other: &Self) -> bool {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .all(|(mine, theirs)| mine & theirs == *theirs)
    }

    /// Checks if no bit is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|word| *word == 0)
    }

    /// Returns the number of set bits.
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|word| word.count_ones()).sum()
    }

    /// Iterates over the set indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ComponentIndex> + '_ {
        self.bits.iter().enumerate().flat_map(|(word_idx, &word)| {
            let mut remaining = word;
            std::iter::from_fn(move || {
                if remaining == 0 {
                    return None;
                }
                let bit = remaining.trailing_zeros() as usize;
                remaining &= remaining - 1;
                // Indices are bounded by MAX_COMPONENTS, which fits a u8.
                #[allow(clippy::cast_possible_truncation)]
                let index = (word_idx * 64 + bit) as ComponentIndex;
                Some(index)
            })
        })
    }
}
