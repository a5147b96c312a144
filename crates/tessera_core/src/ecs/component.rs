//! # Components
//!
//! Components are plain data records attached to entities and stored in
//! per-type pools. Any `'static` type qualifies; types with destructors are
//! dropped exactly once, when removed or when their entity is destroyed.
//!
//! [`Position`] and [`Velocity`] ship with the crate as ready-made `Pod`
//! records for movement systems, benchmarks and tests.

use bytemuck::{Pod, Zeroable};

/// Marker trait for component types.
///
/// Implemented for every `'static` type, so component structs need no
/// boilerplate beyond registration with the
/// [`TypeRegistry`](super::TypeRegistry).
///
/// # Example
///
/// ```rust,ignore
/// struct Health(u32);
///
/// registry.register::<Health>()?;
/// table.add_component(entity, Health(100));
/// ```
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// World-space location of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Position {
    /// The origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a position from its coordinates.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Moves the position along `velocity` for `delta_time` seconds.
    #[inline]
    pub fn advance(&mut self, velocity: &Velocity, delta_time: f32) {
        self.x += velocity.x * delta_time;
        self.y += velocity.y * delta_time;
        self.z += velocity.z * delta_time;
    }
}

/// Rate of change of a [`Position`], in units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Velocity {
    /// Change along X.
    pub x: f32,
    /// Change along Y.
    pub y: f32,
    /// Change along Z.
    pub z: f32,
}

impl Velocity {
    /// Creates a velocity from its components.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let mut position = Position::new(1.0, 2.0, 3.0);
        position.advance(&Velocity::new(2.0, -4.0, 0.0), 0.5);
        assert_eq!(position, Position::new(2.0, 0.0, 3.0));
    }

    #[test]
    fn test_records_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<Position>(), 12);
        assert_eq!(std::mem::size_of::<Velocity>(), 12);
    }

    #[test]
    fn test_zeroed_matches_default() {
        let zeroed: Position = Zeroable::zeroed();
        assert_eq!(zeroed, Position::ORIGIN);
        assert!(bytemuck::bytes_of(&Velocity::default())
            .iter()
            .all(|byte| *byte == 0));
    }
}
