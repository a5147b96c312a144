//! # Entity Handles
//!
//! Entities are opaque 64-bit identifiers. They carry no state of their own;
//! everything about an entity lives in the table that issued it.

use std::fmt;

/// Unique identifier for an entity.
///
/// Identifiers are issued in increasing order by an
/// [`EntityTable`](super::EntityTable) and never reused, even after the entity
/// is destroyed. [`Entity::INVALID`] is never issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Sentinel that never refers to a live entity.
    pub const INVALID: Self = Self(u64::MAX);

    /// Wraps a raw identifier.
    #[inline]
    #[must_use]
    pub(crate) const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Checks if this is the invalid sentinel.
    #[inline]
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            f.write_str("invalid")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_invalid() {
        assert!(Entity::default().is_invalid());
        assert_eq!(Entity::default(), Entity::INVALID);
        assert!(!Entity::from_raw(0).is_invalid());
    }

    #[test]
    fn test_ordering_follows_id() {
        assert!(Entity::from_raw(1) < Entity::from_raw(2));
        assert_eq!(Entity::from_raw(5).id(), 5);
    }

    #[test]
    fn test_display() {
        assert_eq!(Entity::from_raw(17).to_string(), "17");
        assert_eq!(Entity::INVALID.to_string(), "invalid");
    }
}
