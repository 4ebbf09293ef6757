//! Configuration loading for basecamp.
//!
//! - Schema definitions and defaults in [`schema`]
//! - File discovery, loading and env overrides in [`loader`]
//! - Deep merging of config layers in [`merger`]
//! - Sanity checks in [`validator`]
//!
//! # Example
//!
//! ```
//! use basecamp::config::load_merged_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".basecamp");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "tracked_package: pandas").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! assert_eq!(config.tracked_package, "pandas");
//! assert_eq!(config.env_dir.to_str(), Some("venv"));
//! ```

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use loader::{
    apply_env_overrides, load_config, load_config_value, load_merged_config, ConfigPaths,
    CONFIG_DIR, ENV_INDEX_URL, ENV_UPGRADE,
};
pub use merger::{deep_merge, merge_configs};
pub use schema::{BasecampConfig, EntryPoint, RegistryConfig, UpgradePolicy};
pub use validator::{ensure_valid, validate_config, ValidationError};
