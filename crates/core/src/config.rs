// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus configuration
//!
//! ```toml
//! name = "gameplay"
//! initial_capacity = 64
//! catch_panics = true
//! dispatch_disabled = "loading plugins"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name given to buses that are not configured otherwise
pub const DEFAULT_BUS_NAME: &str = "event-bus";

/// Chain-cache slots reserved up front
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Configuration of a single event bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    /// Used in error context and log fields
    pub name: String,
    pub initial_capacity: usize,
    /// Contain listener panics and report them as dispatch failures
    pub catch_panics: bool,
    /// Start a managed bus with dispatch disabled for this reason
    pub dispatch_disabled: Option<String>,
}

impl BusConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    pub fn with_initial_capacity(self, initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            ..self
        }
    }

    pub fn with_catch_panics(self, catch_panics: bool) -> Self {
        Self {
            catch_panics,
            ..self
        }
    }

    pub fn with_dispatch_disabled(self, reason: impl Into<String>) -> Self {
        Self {
            dispatch_disabled: Some(reason.into()),
            ..self
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BusConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Cache slots to allocate; at least one for the dead-event slot
    pub fn cache_capacity(&self) -> usize {
        self.initial_capacity.max(1)
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_BUS_NAME.to_string(),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            catch_panics: true,
            dispatch_disabled: None,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
