//! # Entity Table
//!
//! Owns entity identity, per-entity component ownership and the per-type
//! component pools.
//!
//! ## Active Packing
//!
//! Rows are kept in two contiguous regions:
//!
//! ```text
//! position:  0   1   2 | 3   4
//!           [A] [A] [A]|[I] [I]
//!                      ^ active_count
//! ```
//!
//! Every mutating operation restores this layout with O(1) row swaps, so a
//! scan only ever walks `0..active_count` and never has to skip inactive
//! entities.

use std::any::type_name;
use std::sync::Arc;

use super::component::Component;
use super::entity::Entity;
use super::mask::ComponentIndex;
use super::registry::TypeRegistry;
use super::rows::EntityRows;
use crate::memory::{ErasedPool, ObjectPool};
use crate::DEFAULT_BLOCK_SIZE;

/// Pools indexed by component index; `None` until first used.
pub(super) type PoolSet = Vec<Option<Box<dyn ErasedPool>>>;

/// The entity table - container for entities and their components.
///
/// Component instances live in per-type [`ObjectPool`]s owned by the table;
/// rows only record which pool slot belongs to which entity.
///
/// # Contract
///
/// Passing a handle that is not [valid](Self::is_valid), adding a component
/// the entity already owns, or removing/fetching one it lacks is a programmer
/// error and panics. Check with [`is_valid`](Self::is_valid) and
/// [`has_component`](Self::has_component) when unsure.
///
/// # Example
///
/// ```rust,ignore
/// let mut table = EntityTable::new(registry);
///
/// let entity = table.spawn();
/// table.add_component(entity, Position::new(1.0, 2.0, 3.0));
/// table.get_component_mut::<Position>(entity).x += 1.0;
/// table.destroy(entity);
/// ```
pub struct EntityTable {
    /// Component type indices shared with other tables.
    registry: Arc<TypeRegistry>,
    /// Row storage, active rows first.
    rows: EntityRows,
    /// Number of active rows at the front of `rows`.
    active_count: u32,
    /// Identifier for the next created entity.
    next_id: u64,
    /// Component pools, created lazily per type.
    pools: PoolSet,
}

impl EntityTable {
    /// Creates an empty table using `registry` for component indices.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        let pools = (0..registry.len()).map(|_| None).collect();
        Self {
            registry,
            rows: EntityRows::new(),
            active_count: 0,
            next_id: 0,
            pools,
        }
    }

    /// Returns the registry this table resolves component types with.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Returns the row storage, for inspection.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &EntityRows {
        &self.rows
    }

    /// Returns the number of entities, active or not.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.entities().len()
    }

    /// Checks if the table holds no entities.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of active entities.
    #[inline]
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active_count as usize
    }

    /// Returns every entity, active ones first.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.rows.entities()
    }

    /// Returns the active entities in row order.
    #[inline]
    #[must_use]
    pub fn active_entities(&self) -> &[Entity] {
        &self.rows.entities()[..self.active_count()]
    }

    /// Creates an entity with no components.
    ///
    /// An active entity is placed at the active boundary; the entity that
    /// occupied the boundary moves to the new tail row.
    ///
    /// # Panics
    ///
    /// Panics if the identifier space is exhausted.
    pub fn create(&mut self, active: bool) -> Entity {
        let entity = Entity::from_raw(self.next_id);
        assert!(!entity.is_invalid(), "Entity identifier space exhausted");
        self.next_id += 1;

        let position = self.rows.push(entity);
        if active {
            self.rows.swap(position, self.active_count);
            self.active_count += 1;
        }

        tracing::trace!(entity = entity.id(), active, "created entity");
        entity
    }

    /// Creates an active entity with no components.
    #[inline]
    pub fn spawn(&mut self) -> Entity {
        self.create(true)
    }

    /// Destroys `entity` and every component it owns.
    ///
    /// The row is moved to the tail and popped, so no gap is left behind and
    /// the entity's identifier is never handed out again.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid.
    pub fn destroy(&mut self, entity: Entity) {
        let position = self.position_of(entity);
        let mask = *self.rows.mask(position);
        let card = *self.rows.card(position);
        for index in mask.iter() {
            self.erased_pool_mut(index)
                .destroy(card[usize::from(index)]);
        }

        let position = self.set_position_active(position, false);
        let last = self.rows.len() - 1;
        self.rows.swap(position, last);
        self.rows.pop();

        tracing::trace!(entity = entity.id(), components = mask.count(), "destroyed entity");
    }

    /// Destroys every entity in the table.
    pub fn clear(&mut self) {
        while let Some(&entity) = self.rows.entities().last() {
            self.destroy(entity);
        }
    }

    /// Checks if `entity` currently has a row in this table.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        !entity.is_invalid() && self.rows.position(entity).is_some()
    }

    /// Checks if `entity` is valid and active.
    #[inline]
    #[must_use]
    pub fn is_active(&self, entity: Entity) -> bool {
        self.rows
            .position(entity)
            .is_some_and(|position| position < self.active_count)
    }

    /// Activates or deactivates `entity`.
    ///
    /// Inactive entities keep their components but are skipped by scans.
    /// Does nothing if the entity is already in the requested state.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid.
    pub fn set_active(&mut self, entity: Entity, active: bool) {
        let position = self.position_of(entity);
        if (position < self.active_count) != active {
            self.set_position_active(position, active);
            tracing::trace!(entity = entity.id(), active, "entity activation changed");
        }
    }

    /// Attaches `component` to `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid, `T` is not registered, or the entity
    /// already owns a `T`.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) {
        let position = self.position_of(entity);
        let index = self.registry.require_index_of::<T>();
        assert!(
            !self.rows.mask(position).has(index),
            "Entity {entity} already has component {}",
            type_name::<T>()
        );

        let slot = self.pool_mut::<T>(index).create(component);
        self.rows.card_mut(position)[usize::from(index)] = slot;
        self.rows.mask_mut(position).set(index);
    }

    /// Detaches the `T` owned by `entity` and returns it.
    ///
    /// The pool slot is freed and may be reused by a later
    /// [`add_component`](Self::add_component).
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid or does not own a `T`.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> T {
        let (position, index) = self.owned_component::<T>(entity);
        let slot = self.rows.card(position)[usize::from(index)];
        self.rows.mask_mut(position).clear(index);
        self.pool_mut::<T>(index).remove(slot)
    }

    /// Returns the `T` owned by `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid or does not own a `T`.
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> &T {
        let (position, index) = self.owned_component::<T>(entity);
        let slot = self.rows.card(position)[usize::from(index)];
        self.pool::<T>(index)
            .unwrap_or_else(|| panic!("Missing pool for component {}", type_name::<T>()))
            .get(slot)
    }

    /// Returns the `T` owned by `entity` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not valid or does not own a `T`.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        let (position, index) = self.owned_component::<T>(entity);
        let slot = self.rows.card(position)[usize::from(index)];
        self.pool_mut::<T>(index).get_mut(slot)
    }

    /// Returns the `T` owned by `entity`, or `None` if the entity is not
    /// valid, `T` is not registered, or the entity does not own one.
    #[must_use]
    pub fn try_get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        let position = self.rows.position(entity)?;
        let index = self.registry.index_of::<T>()?;
        if !self.rows.mask(position).has(index) {
            return None;
        }
        let slot = self.rows.card(position)[usize::from(index)];
        Some(self.pool::<T>(index)?.get(slot))
    }

    /// Checks if `entity` is valid and owns a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        match (self.rows.position(entity), self.registry.index_of::<T>()) {
            (Some(position), Some(index)) => self.rows.mask(position).has(index),
            _ => false,
        }
    }

    /// Returns the number of live `T` instances in this table.
    #[must_use]
    pub fn component_count<T: Component>(&self) -> u32 {
        self.registry
            .index_of::<T>()
            .and_then(|index| self.pool::<T>(index))
            .map_or(0, ObjectPool::live_count)
    }

    /// Splits the table into the pieces a scan needs.
    pub(super) fn scan_parts(&mut self) -> (&EntityRows, usize, &mut PoolSet) {
        (&self.rows, self.active_count(), &mut self.pools)
    }

    /// Looks up the row of `entity`.
    fn position_of(&self, entity: Entity) -> u32 {
        self.rows
            .position(entity)
            .unwrap_or_else(|| panic!("Entity {entity} is not valid"))
    }

    /// Looks up the row of `entity` and the index of a `T` it must own.
    fn owned_component<T: Component>(&self, entity: Entity) -> (u32, ComponentIndex) {
        let position = self.position_of(entity);
        let index = self.registry.require_index_of::<T>();
        assert!(
            self.rows.mask(position).has(index),
            "Entity {entity} has no component {}",
            type_name::<T>()
        );
        (position, index)
    }

    /// Moves the row at `position` across the active boundary if needed and
    /// returns its new position.
    ///
    /// Activation swaps with the first inactive row, deactivation with the
    /// last active row.
    fn set_position_active(&mut self, position: u32, active: bool) -> u32 {
        if (position < self.active_count) == active {
            return position;
        }
        let boundary = if active {
            self.active_count
        } else {
            self.active_count - 1
        };
        self.rows.swap(position, boundary);
        if active {
            self.active_count += 1;
        } else {
            self.active_count -= 1;
        }
        boundary
    }

    /// Returns the pool for `T`, if one was created.
    fn pool<T: Component>(&self, index: ComponentIndex) -> Option<&ObjectPool<T>> {
        self.pools
            .get(usize::from(index))?
            .as_ref()?
            .as_any()
            .downcast_ref::<ObjectPool<T>>()
    }

    /// Returns the pool for `T`, creating it on first use.
    fn pool_mut<T: Component>(&mut self, index: ComponentIndex) -> &mut ObjectPool<T> {
        let slot = usize::from(index);
        if slot >= self.pools.len() {
            self.pools.resize_with(slot + 1, || None);
        }

        let registry = &self.registry;
        self.pools[slot]
            .get_or_insert_with(|| {
                let block_size = registry
                    .block_size_of(index)
                    .unwrap_or(DEFAULT_BLOCK_SIZE);
                tracing::debug!(component = type_name::<T>(), block_size, "created component pool");
                let pool: Box<dyn ErasedPool> = Box::new(ObjectPool::<T>::new(block_size));
                pool
            })
            .as_any_mut()
            .downcast_mut::<ObjectPool<T>>()
            .unwrap_or_else(|| panic!("Pool type mismatch for component {}", type_name::<T>()))
    }

    /// Returns the existing pool at `index`, whatever its type.
    fn erased_pool_mut(&mut self, index: ComponentIndex) -> &mut Box<dyn ErasedPool> {
        self.pools
            .get_mut(usize::from(index))
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("Missing pool for component index {index}"))
    }
}
