//! # Query Scenario Tests
//!
//! Verifies scans end to end:
//!
//! 1. **Matching**: a two-type query visits exactly the active entities that
//!    own both types, once each
//! 2. **Repeated passes**: ten increment passes over a single type
//! 3. **Activation**: deactivated entities drop out of scans and come back
//!    with their data intact
//! 4. **Systems and config**: bound callbacks, hook order and TOML setup
//!
//! Run with: cargo test --package tessera_core --test query_scenarios

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessera_core::{
    run_system, EcsConfig, EcsError, Entity, EntityTable, Position, Query, System, TypeRegistry,
    Velocity,
};

/// Third component so masks have bits a query does not ask for.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Health(i32);

fn registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::new(&EcsConfig::default()).unwrap();
    registry.register::<Position>().unwrap();
    registry.register::<Velocity>().unwrap();
    registry.register::<Health>().unwrap();
    Arc::new(registry)
}

// ============================================================================
// MATCHING
// ============================================================================

#[test]
fn two_type_query_visits_exact_set_once() {
    let registry = registry();
    let both = Query::<(Position, Velocity)>::new(&registry).unwrap();
    let mut table = EntityTable::new(Arc::clone(&registry));
    let mut rng = StdRng::seed_from_u64(42);
    let mut expected: Vec<Entity> = Vec::new();

    for _ in 0..2_000 {
        let active = rng.gen_bool(0.8);
        let entity = table.create(active);
        let has_position = rng.gen_bool(0.6);
        let has_velocity = rng.gen_bool(0.6);
        if has_position {
            table.add_component(entity, Position::default());
        }
        if has_velocity {
            table.add_component(entity, Velocity::default());
        }
        if rng.gen_bool(0.3) {
            table.add_component(entity, Health(10));
        }
        if active && has_position && has_velocity {
            expected.push(entity);
        }
    }

    let mut visits: HashMap<Entity, u32> = HashMap::new();
    table.for_each(
        &both,
        |entity: Entity, _pos: &mut Position, _vel: &mut Velocity| {
            *visits.entry(entity).or_default() += 1;
        },
    );

    assert_eq!(visits.len(), expected.len());
    for entity in &expected {
        assert_eq!(visits.get(entity), Some(&1), "{entity} visited wrong number of times");
    }
    assert!(visits.keys().all(|&entity| table.is_active(entity)));
}

#[test]
fn scan_order_follows_rows() {
    let registry = registry();
    let mut table = EntityTable::new(registry);
    for _ in 0..16 {
        let entity = table.spawn();
        table.add_component(entity, Health(1));
    }
    let victim = table.entities()[3];
    table.destroy(victim);

    let mut order = Vec::new();
    table.query::<(Health,)>(|entity: Entity, _health: &mut Health| order.push(entity));

    assert_eq!(order.as_slice(), table.active_entities());
}

#[test]
fn empty_query_visits_every_active_entity() {
    let registry = registry();
    let everyone = Query::<()>::new(&registry).unwrap();
    let mut table = EntityTable::new(registry);
    let awake = table.spawn();
    let asleep = table.create(false);

    let mut seen = Vec::new();
    table.for_each(&everyone, |entity: Entity| seen.push(entity));

    assert_eq!(seen, vec![awake]);
    assert!(!seen.contains(&asleep));
}

#[test]
fn query_without_any_pool_visits_nothing() {
    let registry = registry();
    let health = Query::<(Health,)>::new(&registry).unwrap();
    let mut table = EntityTable::new(registry);
    table.spawn();

    let mut visited = 0;
    table.for_each(&health, |_entity: Entity, _health: &mut Health| visited += 1);
    assert_eq!(visited, 0);
}

#[test]
fn query_errors_are_reported_at_construction() {
    let registry = registry();

    assert_eq!(
        Query::<(Position, Position)>::new(&registry).unwrap_err(),
        EcsError::DuplicateQueryComponent(std::any::type_name::<Position>())
    );
    assert_eq!(
        Query::<(Position, u8)>::new(&registry).unwrap_err(),
        EcsError::UnregisteredComponent(std::any::type_name::<u8>())
    );
}

#[test]
#[should_panic(expected = "different registry")]
fn bound_scan_rejects_query_from_other_registry() {
    struct Tally(u32);

    impl Tally {
        fn count(&mut self, _entity: Entity, _pos: &mut Position) {
            self.0 += 1;
        }
    }

    // Same types, registered in the opposite order.
    let mut reversed = TypeRegistry::new(&EcsConfig::default()).unwrap();
    reversed.register::<Health>().unwrap();
    reversed.register::<Velocity>().unwrap();
    reversed.register::<Position>().unwrap();
    let positions = Query::<(Position,)>::new(&registry()).unwrap();

    let mut table = EntityTable::new(Arc::new(reversed));
    let entity = table.spawn();
    table.add_component(entity, Position::default());

    let mut tally = Tally(0);
    table.for_each_bound(&positions, &mut tally, Tally::count);
}

#[test]
fn query_from_shared_registry_runs_on_every_table() {
    let registry = registry();
    let positions = Query::<(Position,)>::new(&registry).unwrap();
    let mut left = EntityTable::new(Arc::clone(&registry));
    let mut right = EntityTable::new(registry);
    for table in [&mut left, &mut right] {
        let entity = table.spawn();
        table.add_component(entity, Position::default());
    }

    let mut visited = 0;
    left.for_each(&positions, |_entity: Entity, _pos: &mut Position| visited += 1);
    right.for_each(&positions, |_entity: Entity, _pos: &mut Position| visited += 1);
    assert_eq!(visited, 2);
}

// ============================================================================
// REPEATED PASSES
// ============================================================================

#[test]
fn ten_increment_passes() {
    let registry = registry();
    let positions = Query::<(Position,)>::new(&registry).unwrap();
    let mut table = EntityTable::new(registry);

    let first = table.spawn();
    let second = table.spawn();
    let bare = table.spawn();
    table.add_component(first, Position::new(1.0, 2.0, 3.0));
    table.add_component(second, Position::new(-4.0, 0.5, 0.0));

    let mut visited = Vec::new();
    for _ in 0..10 {
        table.for_each(&positions, |entity: Entity, pos: &mut Position| {
            pos.x += 1.0;
            visited.push(entity);
        });
    }

    assert_eq!(table.get_component::<Position>(first).x, 11.0);
    assert_eq!(table.get_component::<Position>(second).x, 6.0);
    assert_eq!(table.get_component::<Position>(first).y, 2.0);
    assert_eq!(visited.len(), 20);
    assert!(!visited.contains(&bare));
}

// ============================================================================
// ACTIVATION
// ============================================================================

#[test]
fn deactivated_entity_is_skipped_then_restored() {
    let registry = registry();
    let positions = Query::<(Position,)>::new(&registry).unwrap();
    let mut table = EntityTable::new(registry);

    let neighbour = table.spawn();
    let entity = table.spawn();
    table.add_component(neighbour, Position::default());
    table.add_component(entity, Position::new(7.0, 8.0, 9.0));

    table.set_active(entity, false);
    let mut seen = Vec::new();
    table.for_each(&positions, |e: Entity, _pos: &mut Position| seen.push(e));
    assert_eq!(seen, vec![neighbour]);

    table.set_active(entity, true);
    seen.clear();
    table.for_each(&positions, |e: Entity, _pos: &mut Position| seen.push(e));
    assert!(seen.contains(&entity));
    assert_eq!(seen.len(), 2);
    assert_eq!(
        *table.get_component::<Position>(entity),
        Position::new(7.0, 8.0, 9.0)
    );
}

#[test]
fn inactive_creation_stays_out_of_scans() {
    let registry = registry();
    let mut table = EntityTable::new(registry);
    let dormant = table.create(false);
    table.add_component(dormant, Health(3));
    let awake = table.spawn();
    table.add_component(awake, Health(5));

    let mut total = 0;
    table.query::<(Health,)>(|_entity: Entity, health: &mut Health| total += health.0);
    assert_eq!(total, 5);
    assert_eq!(table.active_entities(), &[awake]);
}

// ============================================================================
// SYSTEMS AND CONFIG
// ============================================================================

struct Integrate {
    movers: Query<(Position, Velocity)>,
    delta_time: f32,
    moved: u32,
    frames: u32,
}

impl Integrate {
    fn step(&mut self, _entity: Entity, pos: &mut Position, vel: &mut Velocity) {
        pos.advance(vel, self.delta_time);
        self.moved += 1;
    }
}

impl System for Integrate {
    fn pre_update(&mut self, delta_time: f32) {
        self.delta_time = delta_time;
    }

    fn update(&mut self, table: &mut EntityTable, _delta_time: f32) {
        let movers = self.movers.clone();
        table.for_each_bound(&movers, &mut *self, Self::step);
    }

    fn post_update(&mut self, _delta_time: f32) {
        self.frames += 1;
    }
}

#[test]
fn system_moves_entities_through_bound_method() {
    let registry = registry();
    let mut system = Integrate {
        movers: Query::new(&registry).unwrap(),
        delta_time: 0.0,
        moved: 0,
        frames: 0,
    };
    let mut table = EntityTable::new(registry);
    let mover = table.spawn();
    table.add_component(mover, Position::default());
    table.add_component(mover, Velocity::new(2.0, 4.0, 0.0));
    let parked = table.spawn();
    table.add_component(parked, Position::default());

    for _ in 0..4 {
        run_system(&mut table, &mut system, 0.25);
    }

    assert_eq!(system.frames, 4);
    assert_eq!(system.moved, 4);
    assert_eq!(*table.get_component::<Position>(mover), Position::new(2.0, 4.0, 0.0));
    assert_eq!(*table.get_component::<Position>(parked), Position::default());
}

#[test]
fn registry_from_toml_config() {
    let config = EcsConfig::from_toml_str("max_components = 2\nblock_size = 16\n").unwrap();
    let mut registry = TypeRegistry::new(&config).unwrap();
    registry.register::<Position>().unwrap();
    registry.register::<Velocity>().unwrap();

    assert_eq!(
        registry.register::<Health>(),
        Err(EcsError::TooManyComponents { limit: 2 })
    );
    assert_eq!(registry.block_size_of(0), Some(16));

    let mut table = EntityTable::new(Arc::new(registry));
    let entity = table.spawn();
    table.add_component(entity, Velocity::new(1.0, 1.0, 1.0));
    assert!(table.has_component::<Velocity>(entity));
    assert!(!table.has_component::<Health>(entity));
}
