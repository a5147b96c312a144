//! # Tessera Core
//!
//! Packed component storage and query engine for entity-component
//! simulations:
//! - Component records live in block pools with stable, reusable slots
//! - Active entities stay packed at the front of the entity table
//! - Queries resolve component types to a bitmask once and scan linearly
//!
//! ## Architecture Rules
//!
//! 1. **Single owner** - A table is mutated from one thread at a time
//! 2. **No gaps** - Destroy and deactivate compact rows with O(1) swaps
//! 3. **Explicit setup** - Component types are registered before use
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera_core::{EcsConfig, Entity, EntityTable, Position, Query, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new(&EcsConfig::default())?;
//! registry.register::<Position>()?;
//! let registry = Arc::new(registry);
//!
//! let mut table = EntityTable::new(Arc::clone(&registry));
//! let entity = table.spawn();
//! table.add_component(entity, Position::new(10.0, 20.0, 30.0));
//!
//! let positions = Query::<(Position,)>::new(&registry)?;
//! table.for_each(&positions, |_: Entity, position: &mut Position| {
//!     position.x += 1.0;
//! });
//!
//! assert_eq!(table.get_component::<Position>(entity).x, 11.0);
//! # Ok::<(), tessera_core::EcsError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;

/// Hard capacity of component masks and index cards.
///
/// No registry can hold more component types than this, whatever its
/// configuration says.
pub const MAX_COMPONENTS: usize = 64;

/// Default pool block size, in elements.
pub const DEFAULT_BLOCK_SIZE: u32 = 4096;

pub use config::EcsConfig;
pub use ecs::{
    run_system, BoundQueryFn, Component, ComponentIndex, ComponentMask, ComponentSet, Entity,
    EntityRows, EntityTable, IndexCard, Position, Query, QueryFn, Scan, System, TypeRegistry,
    Velocity,
};
pub use error::{EcsError, EcsResult};
pub use memory::{ErasedPool, ObjectPool, SlabPool};
