//! Configuration file discovery and loading.
//!
//! Layers, later overriding earlier:
//! 1. Built-in defaults
//! 2. Project config (`.basecamp/config.yml`)
//! 3. Local overrides (`.basecamp/config.local.yml`)
//! 4. Environment variables (`BASECAMP_INDEX_URL`, `BASECAMP_UPGRADE`)
//!
//! Command-line flags are applied on top by the commands themselves.
//! No config file at all is not an error: the defaults describe the
//! stock-analyzer project.

use crate::config::merger::merge_configs;
use crate::config::schema::{BasecampConfig, UpgradePolicy};
use crate::config::validator::ensure_valid;
use crate::error::{BasecampError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding basecamp's config files.
pub const CONFIG_DIR: &str = ".basecamp";

/// Environment variable overriding `registry.index_url`.
pub const ENV_INDEX_URL: &str = "BASECAMP_INDEX_URL";

/// Environment variable overriding `upgrade`.
pub const ENV_UPGRADE: &str = "BASECAMP_UPGRADE";

/// Paths to the config files that exist for a project.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Project config: .basecamp/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .basecamp/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        let dir = project_root.join(CONFIG_DIR);
        Self {
            project: existing(dir.join("config.yml")),
            project_local: existing(dir.join("config.local.yml")),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Load a config file as a raw YAML value.
///
/// An empty file yields `None`.
pub fn load_config_value(path: &Path) -> Result<Option<serde_yaml::Value>> {
    let content = fs::read_to_string(path).map_err(|e| BasecampError::ConfigParseError {
        path: path.to_path_buf(),
        message: format!("cannot read file: {}", e),
    })?;

    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| BasecampError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if value.is_null() {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

/// Load and merge the config files of a project.
pub fn load_merged_config(project_root: &Path) -> Result<BasecampConfig> {
    let paths = ConfigPaths::discover(project_root);

    let mut layers = Vec::new();
    for path in paths.all_existing() {
        tracing::debug!("Loading config from {}", path.display());
        if let Some(value) = load_config_value(path)? {
            layers.push(value);
        }
    }

    let merged = merge_configs(&layers);

    serde_yaml::from_value(merged).map_err(|e| BasecampError::ConfigParseError {
        path: paths
            .project
            .unwrap_or_else(|| project_root.join(CONFIG_DIR).join("config.yml")),
        message: e.to_string(),
    })
}

/// Apply environment variable overrides using a custom lookup.
pub fn apply_env_overrides<F>(mut config: BasecampConfig, lookup: F) -> Result<BasecampConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_INDEX_URL).filter(|v| !v.trim().is_empty()) {
        config.registry.index_url = url.trim().to_string();
    }

    if let Some(policy) = lookup(ENV_UPGRADE).filter(|v| !v.trim().is_empty()) {
        config.upgrade = policy
            .parse::<UpgradePolicy>()
            .map_err(|message| BasecampError::ConfigValidationError {
                message: format!("{}: {}", ENV_UPGRADE, message),
            })?;
    }

    Ok(config)
}

/// Load the full configuration: files, then process environment, then
/// validation.
pub fn load_config(project_root: &Path) -> Result<BasecampConfig> {
    let config = load_merged_config(project_root)?;
    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    ensure_valid(&config)?;
    Ok(config)
}
