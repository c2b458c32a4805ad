//! Configuration loading and validation.
//!
//! A single YAML file holds any number of named connection profiles. The
//! CLI selects one by name (`default` unless overridden), so a project can
//! keep local, staging and production targets side by side.

mod types;
mod validation;

pub use types::*;

use crate::error::{Result, WeaveError};
use std::path::Path;

impl ConnectionConfig {
    /// Load the named profile from a YAML config file.
    pub fn load<P: AsRef<Path>>(path: P, profile: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WeaveError::Config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content, profile)
    }

    /// Parse the named profile from a YAML string.
    pub fn from_yaml(yaml: &str, profile: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        let config = file.get(profile).cloned().ok_or_else(|| {
            WeaveError::Config(format!("no config named '{}' found", profile))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate this connection profile.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}
