//! # Object Pool
//!
//! Typed construction and destruction on top of a [`SlabPool`], with a free
//! list so destroyed slots are handed out again.

use std::any::Any;

use super::slab::SlabPool;

/// A pool of `T` instances addressed by `u32` slot index.
///
/// Occupancy is tracked per slot: a slot is either holding a live `T` or
/// vacant. Accessing or destroying a vacant slot is a logic error and panics.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Use one pool per owner.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: ObjectPool<Position> = ObjectPool::new(4096);
///
/// let slot = pool.create(Position::new(1.0, 2.0, 3.0));
/// pool.get_mut(slot).x += 1.0;
///
/// pool.destroy(slot); // drops the instance, slot becomes reusable
/// ```
pub struct ObjectPool<T> {
    /// Backing storage; `None` marks a vacant slot.
    slab: SlabPool<Option<T>>,
    /// Vacant slots below `len`, reused LIFO.
    free_list: Vec<u32>,
    /// Number of slots ever handed out (high-water mark).
    len: u32,
    /// Number of currently live instances.
    live_count: u32,
}

impl<T> ObjectPool<T> {
    /// Creates an empty pool growing by `block_size` slots at a time.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    #[must_use]
    pub fn new(block_size: u32) -> Self {
        Self {
            slab: SlabPool::new(block_size),
            free_list: Vec::new(),
            len: 0,
            live_count: 0,
        }
    }

    /// Returns the number of slots ever handed out.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.len
    }

    /// Checks if no slot was ever handed out.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of live instances.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> u32 {
        self.live_count
    }

    /// Returns the number of vacant slots waiting for reuse.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Returns the number of addressable slots in the backing storage.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.slab.capacity()
    }

    /// Stores `value` in a slot and returns the slot index.
    ///
    /// The most recently freed slot is reused first; otherwise the pool grows
    /// by one slot, allocating a new block when the current ones are full.
    ///
    /// # Panics
    ///
    /// Panics if the slot count would overflow `u32`.
    pub fn create(&mut self, value: T) -> u32 {
        let index = if let Some(index) = self.free_list.pop() {
            index
        } else {
            let index = self.len;
            self.len = self.len.checked_add(1).expect("Object pool slot overflow");
            self.slab.reserve(self.len);
            index
        };

        let slot = self.slab.get_mut(index);
        debug_assert!(slot.is_none(), "Free slot {index} still occupied");
        *slot = Some(value);
        self.live_count += 1;

        index
    }

    /// Returns the instance stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the slot does not hold a live instance.
    #[inline]
    #[must_use]
    pub fn get(&self, index: u32) -> &T {
        self.slab
            .get(index)
            .as_ref()
            .unwrap_or_else(|| panic!("Object pool slot {index} is vacant"))
    }

    /// Returns the instance stored at `index` mutably.
    ///
    /// # Panics
    ///
    /// Panics if the slot does not hold a live instance.
    #[inline]
    pub fn get_mut(&mut self, index: u32) -> &mut T {
        self.slab
            .get_mut(index)
            .as_mut()
            .unwrap_or_else(|| panic!("Object pool slot {index} is vacant"))
    }

    /// Checks if `index` currently holds a live instance.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, index: u32) -> bool {
        index < self.len && self.slab.get(index).is_some()
    }

    /// Moves the instance out of `index` and frees the slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the slot is vacant, which includes freeing it twice.
    pub fn remove(&mut self, index: u32) -> T {
        assert!(
            index < self.len,
            "Object pool slot {index} was never allocated"
        );
        let value = self
            .slab
            .get_mut(index)
            .take()
            .unwrap_or_else(|| panic!("Object pool slot {index} destroyed twice"));
        self.slab.destroy(index);
        self.free_list.push(index);
        self.live_count -= 1;
        value
    }

    /// Drops the instance at `index` and frees the slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the slot is vacant, which includes destroying it twice.
    #[inline]
    pub fn destroy(&mut self, index: u32) {
        drop(self.remove(index));
    }
}

/// Type-erased view of an [`ObjectPool`].
///
/// Lets an owner keep pools of different component types side by side and
/// destroy instances knowing only the slot index.
pub trait ErasedPool: Any {
    /// Drops the instance at `index` and frees the slot.
    fn destroy(&mut self, index: u32);

    /// Returns the number of live instances.
    fn live_count(&self) -> u32;

    /// Upcasts for downcasting to the concrete pool.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts mutably for downcasting to the concrete pool.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedPool for ObjectPool<T> {
    fn destroy(&mut self, index: u32) {
        ObjectPool::destroy(self, index);
    }

    fn live_count(&self) -> u32 {
        ObjectPool::live_count(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
