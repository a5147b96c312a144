//! # System Hooks
//!
//! The interface a scheduling layer drives once per frame. Scheduling itself
//! (ordering, parallelism, registration by name) lives outside this crate.

use super::table::EntityTable;

/// Per-frame logic operating on an [`EntityTable`].
///
/// # Example
///
/// ```rust,ignore
/// struct Integrate {
///     movers: Query<(Position, Velocity)>,
///     delta_time: f32,
/// }
///
/// impl Integrate {
///     fn step(&mut self, _: Entity, pos: &mut Position, vel: &mut Velocity) {
///         pos.advance(vel, self.delta_time);
///     }
/// }
///
/// impl System for Integrate {
///     fn pre_update(&mut self, delta_time: f32) {
///         self.delta_time = delta_time;
///     }
///
///     fn update(&mut self, table: &mut EntityTable, _delta_time: f32) {
///         let movers = self.movers.clone();
///         table.for_each_bound(&movers, &mut *self, Self::step);
///     }
/// }
/// ```
pub trait System {
    /// Runs before [`update`](Self::update).
    fn pre_update(&mut self, _delta_time: f32) {}

    /// Runs the system's work for one frame.
    fn update(&mut self, table: &mut EntityTable, delta_time: f32);

    /// Runs after [`update`](Self::update).
    fn post_update(&mut self, _delta_time: f32) {}
}

/// Runs one frame of `system`: pre-update, update, post-update.
pub fn run_system<S: System + ?Sized>(table: &mut EntityTable, system: &mut S, delta_time: f32) {
    system.pre_update(delta_time);
    system.update(table, delta_time);
    system.post_update(delta_time);
}
