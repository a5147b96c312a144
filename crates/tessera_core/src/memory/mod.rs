//! # Memory Management
//!
//! Block pools backing component storage.
//!
//! ## Design Philosophy
//!
//! - Storage grows in whole blocks, never by reallocating existing ones
//! - Slots are addressed by index, never by exposed pointers
//! - Destroyed slots are recycled through a free list

mod object_pool;
mod slab;

pub use object_pool::{ErasedPool, ObjectPool};
pub use slab::SlabPool;
