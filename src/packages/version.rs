//! Upgrade decision for the tracked package.

use serde::Serialize;

/// Installed and latest known version of one package.
///
/// Versions are compared as plain strings: any difference counts as an
/// available upgrade, including a "latest" that is older than what is
/// installed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VersionPair {
    /// Version reported by the installer, if installed.
    pub installed: Option<String>,
    /// Version reported by the registry, if the lookup succeeded.
    pub latest: Option<String>,
}

impl VersionPair {
    pub fn new(installed: Option<String>, latest: Option<String>) -> Self {
        Self { installed, latest }
    }

    /// The version to upgrade to, if both are known and differ.
    pub fn upgrade_target(&self) -> Option<&str> {
        match (self.installed.as_deref(), self.latest.as_deref()) {
            (Some(installed), Some(latest)) if installed.trim() != latest.trim() => {
                Some(latest.trim())
            }
            _ => None,
        }
    }
}
