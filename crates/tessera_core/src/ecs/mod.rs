//! # Entity Component Storage
//!
//! Entities, their component bookkeeping, and typed queries over them.
//!
//! ## Design Philosophy
//!
//! - Component instances live in per-type block pools, never inside rows
//! - Rows keep active entities packed at the front for linear scans
//! - Component types are resolved to dense indices once, at startup
//! - Queries are explicit descriptors built once and reused every frame

mod component;
mod entity;
mod mask;
mod query;
mod registry;
mod rows;
mod system;
mod table;

pub use component::{Component, Position, Velocity};
pub use entity::Entity;
pub use mask::{ComponentIndex, ComponentMask, IndexCard};
pub use query::{BoundQueryFn, ComponentSet, Query, QueryFn, Scan};
pub use registry::TypeRegistry;
pub use rows::EntityRows;
pub use system::{run_system, System};
pub use table::EntityTable;
