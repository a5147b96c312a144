//! # Entity Rows
//!
//! Parallel arrays describing every entity a table holds:
//!
//! ```text
//! position:   0        1        2        3
//! entities: [E7]     [E2]     [E9]     [E4]
//! masks:    [P|V]    [P]      [V]      [P|V]
//! cards:    [3,0,..] [1,..]   [.,5,..] [0,2,..]
//! ```
//!
//! plus an `entity -> position` map. The arrays stay separate so a scan reads
//! masks contiguously and only touches a card when the mask matches.
//!
//! [`EntityRows::swap`] is the only way rows change position, and it keeps the
//! map in step with the arrays.

use std::collections::HashMap;

use super::entity::Entity;
use super::mask::{ComponentMask, IndexCard};
use crate::MAX_COMPONENTS;

/// Row storage with O(1) lookup from entity to row position.
#[derive(Default)]
pub struct EntityRows {
    /// Entity held by each row.
    entities: Vec<Entity>,
    /// Component ownership of each row.
    masks: Vec<ComponentMask>,
    /// Pool slots of each row's components.
    cards: Vec<IndexCard>,
    /// Row position of each entity.
    positions: HashMap<Entity, u32>,
}

impl EntityRows {
    /// Creates empty row storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> u32 {
        // push() refuses to grow past u32::MAX rows.
        u32::try_from(self.entities.len()).unwrap_or(u32::MAX)
    }

    /// Checks if there are no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the row position of `entity`, if it has a row.
    #[inline]
    #[must_use]
    pub fn position(&self, entity: Entity) -> Option<u32> {
        self.positions.get(&entity).copied()
    }

    /// Appends a blank row for `entity` and returns its position.
    ///
    /// # Panics
    ///
    /// Panics if `entity` already has a row or the row count would overflow
    /// `u32`.
    pub fn push(&mut self, entity: Entity) -> u32 {
        let position = u32::try_from(self.entities.len()).expect("Entity row count overflow");
        let previous = self.positions.insert(entity, position);
        assert!(previous.is_none(), "Entity {entity} already has a row");

        self.entities.push(entity);
        self.masks.push(ComponentMask::EMPTY);
        self.cards.push([0; MAX_COMPONENTS]);
        position
    }

    /// Exchanges two rows in every array and updates both map entries.
    ///
    /// # Panics
    ///
    /// Panics if either position is out of range.
    pub fn swap(&mut self, lhs: u32, rhs: u32) {
        if lhs == rhs {
            return;
        }
        let (lhs_entity, rhs_entity) = (self.entity(lhs), self.entity(rhs));
        self.positions.insert(lhs_entity, rhs);
        self.positions.insert(rhs_entity, lhs);

        let (lhs, rhs) = (lhs as usize, rhs as usize);
        self.entities.swap(lhs, rhs);
        self.masks.swap(lhs, rhs);
        self.cards.swap(lhs, rhs);
    }

    /// Removes the last row and its map entry, returning its entity.
    ///
    /// Returns `None` if there are no rows.
    pub fn pop(&mut self) -> Option<Entity> {
        let entity = self.entities.pop()?;
        self.masks.pop();
        self.cards.pop();
        self.positions.remove(&entity);
        Some(entity)
    }

    /// Returns the entity at `position`.
    #[inline]
    #[must_use]
    pub fn entity(&self, position: u32) -> Entity {
        self.entities[position as usize]
    }

    /// Returns the mask at `position`.
    #[inline]
    #[must_use]
    pub fn mask(&self, position: u32) -> &ComponentMask {
        &self.masks[position as usize]
    }

    /// Returns the mask at `position` mutably.
    #[inline]
    pub fn mask_mut(&mut self, position: u32) -> &mut ComponentMask {
        &mut self.masks[position as usize]
    }

    /// Returns the index card at `position`.
    #[inline]
    #[must_use]
    pub fn card(&self, position: u32) -> &IndexCard {
        &self.cards[position as usize]
    }

    /// Returns the index card at `position` mutably.
    #[inline]
    pub fn card_mut(&mut self, position: u32) -> &mut IndexCard {
        &mut self.cards[position as usize]
    }

    /// Returns every row's entity in position order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns every row's mask in position order.
    #[inline]
    #[must_use]
    pub fn masks(&self) -> &[ComponentMask] {
        &self.masks
    }

    /// Returns every row's index card in position order.
    #[inline]
    #[must_use]
    pub fn cards(&self) -> &[IndexCard] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_with(count: u64) -> EntityRows {
        let mut rows = EntityRows::new();
        for id in 0..count {
            rows.push(Entity::from_raw(id));
        }
        rows
    }

    #[test]
    fn test_push_assigns_tail_positions() {
        let rows = rows_with(3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.position(Entity::from_raw(2)), Some(2));
        assert!(rows.mask(2).is_empty());
    }

    #[test]
    fn test_swap_moves_all_columns_and_map() {
        let mut rows = rows_with(3);
        rows.mask_mut(0).set(4);
        rows.card_mut(0)[4] = 11;

        rows.swap(0, 2);

        assert_eq!(rows.entity(2), Entity::from_raw(0));
        assert_eq!(rows.entity(0), Entity::from_raw(2));
        assert_eq!(rows.position(Entity::from_raw(0)), Some(2));
        assert_eq!(rows.position(Entity::from_raw(2)), Some(0));
        assert!(rows.mask(2).has(4));
        assert_eq!(rows.card(2)[4], 11);
        assert!(rows.mask(0).is_empty());
    }

    #[test]
    fn test_pop_erases_mapping() {
        let mut rows = rows_with(2);
        assert_eq!(rows.pop(), Some(Entity::from_raw(1)));
        assert_eq!(rows.position(Entity::from_raw(1)), None);
        assert_eq!(rows.len(), 1);

        rows.pop();
        assert!(rows.is_empty());
        assert_eq!(rows.pop(), None);
    }

    #[test]
    #[should_panic(expected = "already has a row")]
    fn test_duplicate_push_panics() {
        let mut rows = rows_with(1);
        rows.push(Entity::from_raw(0));
    }
}
