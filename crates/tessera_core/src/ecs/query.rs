//! # Query Dispatch
//!
//! A [`Query`] is built once from an ordered tuple of component types and
//! reused for every scan:
//!
//! ```rust,ignore
//! let movers = Query::<(Position, Velocity)>::new(&registry)?;
//!
//! table.for_each(&movers, |entity: Entity, pos: &mut Position, vel: &mut Velocity| {
//!     pos.x += vel.x;
//! });
//! ```
//!
//! The callback always takes the [`Entity`] first, then one `&mut` reference
//! per requested type in declared order. Only active rows are scanned, in
//! ascending row order; a row is visited when its mask contains every
//! requested bit.
//!
//! ## Structural Changes
//!
//! Adding or removing components, destroying entities or toggling activity
//! during a scan would reorder rows that have not been visited yet. The scan
//! holds the table's unique borrow, so such calls do not compile inside a
//! callback. Collect the entities and apply the changes after the scan.

use std::any::type_name;
use std::marker::PhantomData;

use super::component::Component;
use super::entity::Entity;
use super::mask::{ComponentIndex, ComponentMask, IndexCard};
use super::registry::TypeRegistry;
use super::rows::EntityRows;
use super::table::{EntityTable, PoolSet};
use crate::error::{EcsError, EcsResult};
use crate::memory::{ErasedPool, ObjectPool};

/// An ordered list of component types a query asks for.
///
/// Implemented for tuples of up to eight component types, and for `()`
/// (which matches every active entity).
pub trait ComponentSet: 'static {
    /// Number of component types in the set.
    const LEN: usize;

    /// Resolves each type's index, in declared order.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] for the first type the
    /// registry does not know.
    fn resolve(registry: &TypeRegistry) -> EcsResult<Vec<ComponentIndex>>;

    /// Returns each type's name, in declared order.
    fn names() -> Vec<&'static str>;
}

/// Query descriptor: the requested component indices and their target mask.
///
/// Indices only mean something to the registry that resolved them, so a
/// query may only run on tables sharing that registry.
pub struct Query<Q: ComponentSet> {
    /// Id of the registry the indices were resolved against.
    registry_id: u64,
    /// Requested indices in declared order.
    indices: Vec<ComponentIndex>,
    /// Union of the requested bits.
    mask: ComponentMask,
    _marker: PhantomData<fn() -> Q>,
}

impl<Q: ComponentSet> Query<Q> {
    /// Builds the descriptor for `Q` against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] if a type is unknown and
    /// [`EcsError::DuplicateQueryComponent`] if a type is listed twice.
    pub fn new(registry: &TypeRegistry) -> EcsResult<Self> {
        let indices = Q::resolve(registry)?;
        debug_assert_eq!(indices.len(), Q::LEN);
        let mut mask = ComponentMask::EMPTY;
        for (position, &index) in indices.iter().enumerate() {
            if mask.has(index) {
                return Err(EcsError::DuplicateQueryComponent(Q::names()[position]));
            }
            mask.set(index);
        }
        Ok(Self {
            registry_id: registry.id(),
            indices,
            mask,
            _marker: PhantomData,
        })
    }

    /// Returns the id of the registry this query was built against.
    #[inline]
    #[must_use]
    pub const fn registry_id(&self) -> u64 {
        self.registry_id
    }

    /// Returns the requested component indices in declared order.
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[ComponentIndex] {
        &self.indices
    }

    /// Returns the target mask.
    #[inline]
    #[must_use]
    pub fn mask(&self) -> &ComponentMask {
        &self.mask
    }
}

impl<Q: ComponentSet> Clone for Query<Q> {
    fn clone(&self) -> Self {
        Self {
            registry_id: self.registry_id,
            indices: self.indices.clone(),
            mask: self.mask,
            _marker: PhantomData,
        }
    }
}

impl<Q: ComponentSet> std::fmt::Debug for Query<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("registry_id", &self.registry_id)
            .field("components", &Q::names())
            .field("indices", &self.indices)
            .finish()
    }
}

/// The active rows of one table, filtered by a target mask.
///
/// Only the table creates scans; this type is public so [`QueryFn`] and
/// [`BoundQueryFn`] implementations can walk the matching rows.
pub struct Scan<'t> {
    entities: &'t [Entity],
    masks: &'t [ComponentMask],
    cards: &'t [IndexCard],
    target: &'t ComponentMask,
}

impl<'t> Scan<'t> {
    fn new(rows: &'t EntityRows, active: usize, target: &'t ComponentMask) -> Self {
        Self {
            entities: &rows.entities()[..active],
            masks: &rows.masks()[..active],
            cards: &rows.cards()[..active],
            target,
        }
    }

    /// Calls `visit` for each matching row in ascending row order.
    #[inline]
    pub fn for_each_match(&self, mut visit: impl FnMut(Entity, &IndexCard)) {
        for ((entity, mask), card) in self.entities.iter().zip(self.masks).zip(self.cards) {
            if mask.contains_all(self.target) {
                visit(*entity, card);
            }
        }
    }
}

/// A callback that can be dispatched over a query for `Q`.
///
/// Implemented for every `FnMut(Entity, &mut A, &mut B, ...)` matching the
/// types of `Q` in order. Closures need their parameter types written out.
/// A callback without the leading entity parameter is rejected:
///
/// ```compile_fail
/// use std::sync::Arc;
/// use tessera_core::{EcsConfig, EntityTable, Position, Query, TypeRegistry};
///
/// let mut registry = TypeRegistry::new(&EcsConfig::default()).unwrap();
/// registry.register::<Position>().unwrap();
/// let query = Query::<(Position,)>::new(&registry).unwrap();
/// let mut table = EntityTable::new(Arc::new(registry));
///
/// table.for_each(&query, |position: &mut Position| position.x += 1.0);
/// ```
pub trait QueryFn<Q: ComponentSet> {
    /// Runs the callback for every matching row of `scan`.
    ///
    /// `pools` holds the pools of `Q`'s types in declared order and
    /// `indices` their component indices.
    fn dispatch(&mut self, scan: &Scan<'_>, pools: &mut [Box<dyn ErasedPool>], indices: &[ComponentIndex]);
}

/// A callback bound to an external object, dispatched over a query for `Q`.
///
/// Implemented for every `FnMut(&mut S, Entity, &mut A, ...)`, which includes
/// method paths such as `Mover::step` for
/// `fn step(&mut self, entity: Entity, position: &mut Position)`.
pub trait BoundQueryFn<S, Q: ComponentSet> {
    /// Runs the callback on `object` for every matching row of `scan`.
    fn dispatch_bound(
        &mut self,
        object: &mut S,
        scan: &Scan<'_>,
        pools: &mut [Box<dyn ErasedPool>],
        indices: &[ComponentIndex],
    );
}

/// Downcasts a leased pool to its concrete type.
fn downcast_pool<T: Component>(pool: &mut Box<dyn ErasedPool>) -> &mut ObjectPool<T> {
    pool.as_any_mut()
        .downcast_mut::<ObjectPool<T>>()
        .unwrap_or_else(|| panic!("Query pool is not a pool of {}", type_name::<T>()))
}

impl ComponentSet for () {
    const LEN: usize = 0;

    fn resolve(_registry: &TypeRegistry) -> EcsResult<Vec<ComponentIndex>> {
        Ok(Vec::new())
    }

    fn names() -> Vec<&'static str> {
        Vec::new()
    }
}

impl<Func> QueryFn<()> for Func
where
    Func: FnMut(Entity),
{
    fn dispatch(&mut self, scan: &Scan<'_>, _pools: &mut [Box<dyn ErasedPool>], _indices: &[ComponentIndex]) {
        scan.for_each_match(|entity, _card| self(entity));
    }
}

impl<S, Func> BoundQueryFn<S, ()> for Func
where
    Func: FnMut(&mut S, Entity),
{
    fn dispatch_bound(
        &mut self,
        object: &mut S,
        scan: &Scan<'_>,
        _pools: &mut [Box<dyn ErasedPool>],
        _indices: &[ComponentIndex],
    ) {
        scan.for_each_match(|entity, _card| self(&mut *object, entity));
    }
}

macro_rules! impl_query {
    ($len:expr; $(($ty:ident, $pool:ident, $index:ident)),+) => {
        impl<$($ty: Component),+> ComponentSet for ($($ty,)+) {
            const LEN: usize = $len;

            fn resolve(registry: &TypeRegistry) -> EcsResult<Vec<ComponentIndex>> {
                Ok(vec![$(
                    registry
                        .index_of::<$ty>()
                        .ok_or(EcsError::UnregisteredComponent(type_name::<$ty>()))?
                ),+])
            }

            fn names() -> Vec<&'static str> {
                vec![$(type_name::<$ty>()),+]
            }
        }

        impl<Func, $($ty: Component),+> QueryFn<($($ty,)+)> for Func
        where
            Func: FnMut(Entity, $(&mut $ty),+),
        {
            fn dispatch(
                &mut self,
                scan: &Scan<'_>,
                pools: &mut [Box<dyn ErasedPool>],
                indices: &[ComponentIndex],
            ) {
                let [$($pool),+] = pools else {
                    unreachable!("query pools do not match the query arity");
                };
                let [$($index),+] = indices else {
                    unreachable!("query indices do not match the query arity");
                };
                $(let $pool = downcast_pool::<$ty>($pool);)+
                $(let $index = usize::from(*$index);)+

                scan.for_each_match(|entity, card| {
                    self(entity, $($pool.get_mut(card[$index])),+);
                });
            }
        }

        impl<S, Func, $($ty: Component),+> BoundQueryFn<S, ($($ty,)+)> for Func
        where
            Func: FnMut(&mut S, Entity, $(&mut $ty),+),
        {
            fn dispatch_bound(
                &mut self,
                object: &mut S,
                scan: &Scan<'_>,
                pools: &mut [Box<dyn ErasedPool>],
                indices: &[ComponentIndex],
            ) {
                let [$($pool),+] = pools else {
                    unreachable!("query pools do not match the query arity");
                };
                let [$($index),+] = indices else {
                    unreachable!("query indices do not match the query arity");
                };
                $(let $pool = downcast_pool::<$ty>($pool);)+
                $(let $index = usize::from(*$index);)+

                scan.for_each_match(|entity, card| {
                    self(&mut *object, entity, $($pool.get_mut(card[$index])),+);
                });
            }
        }
    };
}

impl_query!(1; (A, pool_a, index_a));
impl_query!(2; (A, pool_a, index_a), (B, pool_b, index_b));
impl_query!(3; (A, pool_a, index_a), (B, pool_b, index_b), (C, pool_c, index_c));
impl_query!(4; (A, pool_a, index_a), (B, pool_b, index_b), (C, pool_c, index_c), (D, pool_d, index_d));
impl_query!(5; (A, pool_a, index_a), (B, pool_b, index_b), (C, pool_c, index_c), (D, pool_d, index_d),
    (E, pool_e, index_e));
impl_query!(6; (A, pool_a, index_a), (B, pool_b, index_b), (C, pool_c, index_c), (D, pool_d, index_d),
    (E, pool_e, index_e), (F, pool_f, index_f));
impl_query!(7; (A, pool_a, index_a), (B, pool_b, index_b), (C, pool_c, index_c), (D, pool_d, index_d),
    (E, pool_e, index_e), (F, pool_f, index_f), (G, pool_g, index_g));
impl_query!(8; (A, pool_a, index_a), (B, pool_b, index_b), (C, pool_c, index_c), (D, pool_d, index_d),
    (E, pool_e, index_e), (F, pool_f, index_f), (G, pool_g, index_g), (H, pool_h, index_h));

/// Pools moved out of a table for the duration of one scan.
///
/// Taking the requested pools out of the table lets the scan hand out one
/// `&mut` per requested type without aliasing. Dropping the lease puts them
/// back.
struct PoolLease<'p> {
    home: &'p mut PoolSet,
    indices: &'p [ComponentIndex],
    taken: Vec<Box<dyn ErasedPool>>,
}

impl<'p> PoolLease<'p> {
    /// Takes the pools at `indices`, or returns `None` if any of them was
    /// never created (no entity can match then).
    fn take(home: &'p mut PoolSet, indices: &'p [ComponentIndex]) -> Option<Self> {
        let all_present = indices
            .iter()
            .all(|&index| home.get(usize::from(index)).is_some_and(Option::is_some));
        if !all_present {
            return None;
        }
        let taken = indices
            .iter()
            .filter_map(|&index| home[usize::from(index)].take())
            .collect();
        Some(Self {
            home,
            indices,
            taken,
        })
    }
}

impl Drop for PoolLease<'_> {
    fn drop(&mut self) {
        for (&index, pool) in self.indices.iter().zip(self.taken.drain(..)) {
            self.home[usize::from(index)] = Some(pool);
        }
    }
}

impl EntityTable {
    /// Calls `callback` for every active entity owning all of `query`'s
    /// component types.
    ///
    /// The callback receives the entity and one `&mut` per requested type in
    /// declared order. Rows are visited in ascending order, each at most once.
    ///
    /// # Panics
    ///
    /// Panics if `query` was built against a different registry than this
    /// table's.
    pub fn for_each<Q: ComponentSet>(&mut self, query: &Query<Q>, mut callback: impl QueryFn<Q>) {
        self.assert_same_registry(query);
        let (rows, active, pools) = self.scan_parts();
        let Some(mut lease) = PoolLease::take(pools, query.indices()) else {
            return;
        };
        let scan = Scan::new(rows, active, query.mask());
        callback.dispatch(&scan, &mut lease.taken, query.indices());
    }

    /// Like [`for_each`](Self::for_each), with `callback` also receiving
    /// `object` as its first argument.
    ///
    /// # Panics
    ///
    /// Panics if `query` was built against a different registry than this
    /// table's.
    pub fn for_each_bound<S, Q: ComponentSet>(
        &mut self,
        query: &Query<Q>,
        object: &mut S,
        mut callback: impl BoundQueryFn<S, Q>,
    ) {
        self.assert_same_registry(query);
        let (rows, active, pools) = self.scan_parts();
        let Some(mut lease) = PoolLease::take(pools, query.indices()) else {
            return;
        };
        let scan = Scan::new(rows, active, query.mask());
        callback.dispatch_bound(object, &scan, &mut lease.taken, query.indices());
    }

    /// Builds a transient [`Query`] for `Q` and runs
    /// [`for_each`](Self::for_each) with it.
    ///
    /// # Panics
    ///
    /// Panics if a type of `Q` is unregistered or listed twice.
    pub fn query<Q: ComponentSet>(&mut self, callback: impl QueryFn<Q>) {
        let query = Query::<Q>::new(self.registry())
            .unwrap_or_else(|err| panic!("Invalid query: {err}"));
        self.for_each(&query, callback);
    }

    /// Rejects descriptors whose indices belong to another registry.
    fn assert_same_registry<Q: ComponentSet>(&self, query: &Query<Q>) {
        assert_eq!(
            query.registry_id(),
            self.registry().id(),
            "Query {query:?} was built against a different registry than this table's"
        );
    }
}
