//! # Slab Pool
//!
//! Block-growable storage for fixed-size slots that never moves a slot once
//! it has been handed out.

/// Indexable slot storage that grows in whole blocks.
///
/// Each block is a separate heap allocation of `block_size` slots. Growing
/// appends new blocks; existing blocks are never reallocated, so the address
/// of a slot is stable for the lifetime of the pool.
///
/// The pool knows nothing about occupancy. It only stores slot values and
/// hands out the slot at an index; the typed layer on top decides what a
/// slot's contents mean.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Use one pool per owner.
///
/// # Example
///
/// ```rust,ignore
/// let mut slab: SlabPool<u32> = SlabPool::new(4096);
/// slab.reserve(10);
/// *slab.get_mut(3) = 7;
/// slab.destroy(3); // back to 0
/// ```
pub struct SlabPool<S> {
    /// Independently allocated blocks of `block_size` slots each.
    blocks: Vec<Box<[S]>>,
    /// Slots per block.
    block_size: u32,
    /// Total addressable slots (`blocks.len() * block_size`).
    capacity: u32,
}

impl<S: Default> SlabPool<S> {
    /// Creates an empty pool that grows by `block_size` slots at a time.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    #[must_use]
    pub fn new(block_size: u32) -> Self {
        assert!(block_size > 0, "Block size must be greater than zero");
        Self {
            blocks: Vec::new(),
            block_size,
            capacity: 0,
        }
    }

    /// Returns the number of slots per block.
    #[inline]
    #[must_use]
    pub const fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Returns the number of addressable slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the number of allocated blocks.
    #[inline]
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Grows the pool by whole blocks until at least `capacity` slots exist.
    ///
    /// Already-issued slots keep their address.
    ///
    /// # Panics
    ///
    /// Panics if the capacity would overflow `u32`.
    pub fn reserve(&mut self, capacity: u32) {
        while self.capacity < capacity {
            let block: Box<[S]> = (0..self.block_size).map(|_| S::default()).collect();
            self.blocks.push(block);
            self.capacity = self
                .capacity
                .checked_add(self.block_size)
                .expect("Slab capacity overflow");
            tracing::trace!(
                blocks = self.blocks.len(),
                capacity = self.capacity,
                "slab grew by one block"
            );
        }
    }

    /// Splits a slot index into `(block, offset)`.
    #[inline]
    fn locate(&self, index: u32) -> (usize, usize) {
        assert!(
            index < self.capacity,
            "Slot index {index} out of bounds (capacity {})",
            self.capacity
        );
        (
            (index / self.block_size) as usize,
            (index % self.block_size) as usize,
        )
    }

    /// Returns the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: u32) -> &S {
        let (block, offset) = self.locate(index);
        &self.blocks[block][offset]
    }

    /// Returns the slot at `index` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    #[inline]
    pub fn get_mut(&mut self, index: u32) -> &mut S {
        let (block, offset) = self.locate(index);
        &mut self.blocks[block][offset]
    }

    /// Blanks the slot at `index`, resetting it to `S::default()`.
    ///
    /// This is slot hygiene only. Whatever the slot held is dropped here, but
    /// the typed layer is responsible for deciding when that is correct.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()`.
    #[inline]
    pub fn destroy(&mut self, index: u32) {
        *self.get_mut(index) = S::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_grows_by_whole_blocks() {
        let mut slab: SlabPool<u64> = SlabPool::new(8);
        assert_eq!(slab.capacity(), 0);

        slab.reserve(1);
        assert_eq!(slab.capacity(), 8);
        assert_eq!(slab.block_count(), 1);

        slab.reserve(8);
        assert_eq!(slab.block_count(), 1);

        slab.reserve(17);
        assert_eq!(slab.capacity(), 24);
        assert_eq!(slab.block_count(), 3);
    }

    #[test]
    fn test_growth_keeps_slot_addresses() {
        let mut slab: SlabPool<u64> = SlabPool::new(4);
        slab.reserve(4);
        *slab.get_mut(2) = 99;
        let before: *const u64 = slab.get(2);

        slab.reserve(4096);

        let after: *const u64 = slab.get(2);
        assert_eq!(before, after);
        assert_eq!(*slab.get(2), 99);
    }

    #[test]
    fn test_index_arithmetic_across_blocks() {
        let mut slab: SlabPool<u32> = SlabPool::new(3);
        slab.reserve(9);
        for i in 0..9 {
            *slab.get_mut(i) = i * 10;
        }
        for i in 0..9 {
            assert_eq!(*slab.get(i), i * 10);
        }
    }

    #[test]
    fn test_destroy_blanks_slot() {
        let mut slab: SlabPool<u32> = SlabPool::new(4);
        slab.reserve(4);
        *slab.get_mut(1) = 5;
        slab.destroy(1);
        assert_eq!(*slab.get(1), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_past_capacity_panics() {
        let mut slab: SlabPool<u32> = SlabPool::new(4);
        slab.reserve(4);
        let _ = slab.get(4);
    }

    #[test]
    #[should_panic(expected = "Block size must be greater than zero")]
    fn test_zero_block_size_panics() {
        let _slab: SlabPool<u8> = SlabPool::new(0);
    }
}
