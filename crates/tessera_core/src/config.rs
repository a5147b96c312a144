//! # Engine Configuration
//!
//! Capacity settings consumed once at startup, before any table exists.
//! They can be built in code or loaded from a TOML document:
//!
//! ```toml
//! max_components = 32
//! block_size = 1024
//! ```

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};
use crate::{DEFAULT_BLOCK_SIZE, MAX_COMPONENTS};

/// Engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EcsConfig {
    /// Number of component types the registry accepts.
    ///
    /// Must lie in `1..=MAX_COMPONENTS`; masks and index cards are always
    /// `MAX_COMPONENTS` wide, this only lowers the registration limit.
    pub max_components: usize,
    /// Default pool block size, in elements, for every component type.
    pub block_size: u32,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            max_components: MAX_COMPONENTS,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl EcsConfig {
    /// Parses and validates a TOML configuration document.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ConfigParse`] for malformed documents and
    /// [`EcsError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> EcsResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is within its hard limits.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_components == 0 || self.max_components > MAX_COMPONENTS {
            return Err(EcsError::InvalidConfig(format!(
                "max_components must be in 1..={MAX_COMPONENTS}, got {}",
                self.max_components
            )));
        }
        if self.block_size == 0 {
            return Err(EcsError::InvalidConfig(
                "block_size must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}
