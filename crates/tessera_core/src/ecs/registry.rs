//! # Component Type Registry
//!
//! Assigns every component type a dense [`ComponentIndex`] in registration
//! order. The registry is built once at startup, then shared read-only (behind
//! an `Arc`) by every table that uses the same set of component types.
//!
//! ## Invariants
//!
//! - Indices are unique, dense and stable for the registry's lifetime.
//! - At most `config.max_components` types are registered.
//! - Every registered index has a descriptor with its pool block size.
//! - Every registry carries a process-unique id, so descriptors resolved
//!   against one registry can be told apart from another's.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::component::Component;
use super::mask::ComponentIndex;
use crate::config::EcsConfig;
use crate::error::{EcsError, EcsResult};

/// Source of registry ids.
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Metadata kept for each registered component type.
#[derive(Clone, Copy, Debug)]
struct ComponentDesc {
    /// Rust type name, for diagnostics.
    name: &'static str,
    /// Pool block size in elements.
    block_size: u32,
}

/// Mapping from component types to dense indices.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = TypeRegistry::new(&EcsConfig::default())?;
/// registry.register::<Position>()?;
/// registry.register_with_block_size::<Velocity>(256)?;
///
/// let registry = Arc::new(registry);
/// let mut table = EntityTable::new(Arc::clone(&registry));
/// ```
#[derive(Debug)]
pub struct TypeRegistry {
    /// Process-unique identity of this registry.
    id: u64,
    /// `TypeId -> index` lookup.
    by_type: HashMap<TypeId, ComponentIndex>,
    /// Descriptors indexed by component index.
    by_index: Vec<ComponentDesc>,
    /// Registration limit.
    max_components: usize,
    /// Block size used when none is given at registration.
    default_block_size: u32,
}

impl TypeRegistry {
    /// Creates an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: &EcsConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            by_type: HashMap::with_capacity(config.max_components),
            by_index: Vec::with_capacity(config.max_components),
            max_components: config.max_components,
            default_block_size: config.block_size,
        })
    }

    /// Registers `T` with the configured default block size.
    ///
    /// Registering an already-known type returns its existing index.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::TooManyComponents`] once the limit is reached.
    pub fn register<T: Component>(&mut self) -> EcsResult<ComponentIndex> {
        self.register_with_block_size::<T>(self.default_block_size)
    }

    /// Registers `T` with a specific pool block size.
    ///
    /// If `T` is already registered its index is returned unchanged and
    /// `block_size` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] for a zero block size and
    /// [`EcsError::TooManyComponents`] once the limit is reached.
    pub fn register_with_block_size<T: Component>(
        &mut self,
        block_size: u32,
    ) -> EcsResult<ComponentIndex> {
        if let Some(&existing) = self.by_type.get(&TypeId::of::<T>()) {
            return Ok(existing);
        }
        if block_size == 0 {
            return Err(EcsError::InvalidConfig(format!(
                "block size for {} must be greater than zero",
                type_name::<T>()
            )));
        }
        if self.by_index.len() >= self.max_components {
            return Err(EcsError::TooManyComponents {
                limit: self.max_components,
            });
        }

        let index = ComponentIndex::try_from(self.by_index.len()).map_err(|_| {
            EcsError::TooManyComponents {
                limit: self.max_components,
            }
        })?;
        let name = type_name::<T>();
        self.by_type.insert(TypeId::of::<T>(), index);
        self.by_index.push(ComponentDesc { name, block_size });

        tracing::debug!(component = name, index, block_size, "registered component type");
        Ok(index)
    }

    /// Returns the process-unique id of this registry.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the index of `T`, if registered.
    #[inline]
    #[must_use]
    pub fn index_of<T: Component>(&self) -> Option<ComponentIndex> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the index of `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was not registered.
    #[inline]
    #[must_use]
    pub fn require_index_of<T: Component>(&self) -> ComponentIndex {
        self.index_of::<T>()
            .unwrap_or_else(|| panic!("Component type {} is not registered", type_name::<T>()))
    }

    /// Returns the type name registered at `index`.
    #[must_use]
    pub fn name_of(&self, index: ComponentIndex) -> Option<&'static str> {
        self.by_index.get(usize::from(index)).map(|desc| desc.name)
    }

    /// Returns the pool block size registered at `index`.
    #[must_use]
    pub fn block_size_of(&self, index: ComponentIndex) -> Option<u32> {
        self.by_index.get(usize::from(index)).map(|desc| desc.block_size)
    }

    /// Returns the number of registered types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    /// Checks if no type is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Returns the registration limit.
    #[inline]
    #[must_use]
    pub const fn max_components(&self) -> usize {
        self.max_components
    }
}
