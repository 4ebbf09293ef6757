//! Configuration schema.
//!
//! Every field has a default, so a project without any config file gets
//! the stock-analyzer setup: a `venv/` environment, `requirements.txt` as
//! the manifest, `akshare` as the tracked package and
//! `src.main.stock_analyzer` as the entry point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::shell::default_base_python;

/// Root configuration for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasecampConfig {
    /// Interpreter used to create the environment (`python3 -m venv`).
    #[serde(default = "default_python")]
    pub python: String,

    /// Environment directory, relative to the project root.
    #[serde(default = "default_env_dir")]
    pub env_dir: PathBuf,

    /// Dependency manifest, relative to the project root.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Package whose installed version is checked against the registry.
    #[serde(default = "default_tracked_package")]
    pub tracked_package: String,

    /// Packages installed when no manifest exists.
    #[serde(default = "default_packages")]
    pub default_packages: Vec<String>,

    /// Program launched once the environment is ready.
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub entry: EntryPoint,

    /// What to do when a newer tracked package is published.
    #[serde(default)]
    pub upgrade: UpgradePolicy,

    /// Package registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl Default for BasecampConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            env_dir: default_env_dir(),
            manifest: default_manifest(),
            tracked_package: default_tracked_package(),
            default_packages: default_packages(),
            entry: EntryPoint::default(),
            upgrade: UpgradePolicy::default(),
            registry: RegistryConfig::default(),
        }
    }
}

fn default_python() -> String {
    default_base_python().to_string()
}

fn default_env_dir() -> PathBuf {
    PathBuf::from("venv")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("requirements.txt")
}

fn default_tracked_package() -> String {
    "akshare".to_string()
}

fn default_packages() -> Vec<String> {
    vec![
        "akshare".to_string(),
        "pandas".to_string(),
        "numpy".to_string(),
    ]
}

/// The downstream program to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    /// A script path relative to the project root (`python <script>`).
    Script(PathBuf),
    /// A dotted module name (`python -m <module>`).
    Module(String),
}

impl Default for EntryPoint {
    fn default() -> Self {
        Self::Module("src.main.stock_analyzer".to_string())
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script(path) => write!(f, "{}", path.display()),
            Self::Module(module) => write!(f, "{}", module),
        }
    }
}

/// Upgrade behavior when the registry reports a different version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradePolicy {
    /// Ask the operator (answers "no" when not attached to a terminal).
    #[default]
    Prompt,
    /// Upgrade without asking.
    Always,
    /// Report the new version but never upgrade.
    Never,
}

impl FromStr for UpgradePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prompt" => Ok(Self::Prompt),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(format!(
                "unknown upgrade policy: {} (expected prompt, always or never)",
                s
            )),
        }
    }
}

/// Package registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of a PyPI-compatible JSON API.
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Timeout for the metadata request, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl RegistryConfig {
    /// The request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_index_url() -> String {
    "https://pypi.org".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mapping_yields_defaults() {
        let config: BasecampConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, BasecampConfig::default());
        assert_eq!(config.env_dir, PathBuf::from("venv"));
        assert_eq!(config.tracked_package, "akshare");
        assert_eq!(config.default_packages, vec!["akshare", "pandas", "numpy"]);
        assert_eq!(config.registry.timeout(), Duration::from_secs(2));
        assert_eq!(config.upgrade, UpgradePolicy::Prompt);
    }

    #[test]
    fn entry_point_script_form() {
        let yaml = "entry:\n  script: stock_analyzer.py\n";
        let config: BasecampConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.entry,
            EntryPoint::Script(PathBuf::from("stock_analyzer.py"))
        );
    }

    #[test]
    fn entry_point_module_form() {
        let yaml = "entry:\n  module: app.main\n";
        let config: BasecampConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.entry, EntryPoint::Module("app.main".to_string()));
        assert_eq!(config.entry.to_string(), "app.main");
    }

    #[test]
    fn partial_registry_keeps_other_defaults() {
        let yaml = "registry:\n  index_url: http://localhost:8080\n";
        let config: BasecampConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.registry.index_url, "http://localhost:8080");
        assert_eq!(config.registry.timeout_ms, 2000);
    }

    #[test]
    fn upgrade_policy_parses() {
        assert_eq!("prompt".parse(), Ok(UpgradePolicy::Prompt));
        assert_eq!("ALWAYS".parse(), Ok(UpgradePolicy::Always));
        assert_eq!(" never ".parse(), Ok(UpgradePolicy::Never));
        assert!("sometimes".parse::<UpgradePolicy>().is_err());
    }

    #[test]
    fn upgrade_policy_deserializes_lowercase() {
        let config: BasecampConfig = serde_yaml::from_str("upgrade: never").unwrap();
        assert_eq!(config.upgrade, UpgradePolicy::Never);
    }
}
