//! Bring the environment's packages in line with the requirement set.
//!
//! ```text
//! CHECK_PRESENCE ── missing ──> INSTALL_ALL ─────────────────────────> DONE
//!        │
//!        └─ present ─> READ_VERSION ─> FETCH_LATEST ─┬─ differs ─> PROMPT ─> MAYBE_UPGRADE ─> DONE
//!                                                    └─ equal / unknown ───────────────────> DONE
//! ```
//!
//! Install and upgrade failures become warnings and the analysis program
//! is launched regardless. Only an interrupted prompt ends the run.

use std::collections::HashMap;
use std::fmt;

use crate::error::Result;
use crate::ui::UserInterface;

use super::confirm::Confirmer;
use super::manifest::{normalize_name, RequirementSet};
use super::pip::PackageManager;
use super::registry::VersionSource;
use super::version::VersionPair;

/// How reconciliation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Something was missing and the full set was installed.
    Installed,
    /// Something was missing and installing the set failed.
    InstallFailed { message: String },
    /// The tracked package is at the latest version.
    UpToDate { version: String },
    /// The registry could not be asked; nothing changed.
    LatestUnknown { installed: String },
    /// The tracked package was upgraded.
    Upgraded { from: String, to: String },
    /// An upgrade was available and refused.
    UpgradeDeclined { installed: String, latest: String },
    /// An upgrade was accepted and failed.
    UpgradeFailed { message: String },
    /// The version check was disabled.
    CheckSkipped { installed: String },
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installed => write!(f, "installed requirements"),
            Self::InstallFailed { message } => write!(f, "install failed: {}", message),
            Self::UpToDate { version } => write!(f, "up to date ({})", version),
            Self::LatestUnknown { installed } => {
                write!(f, "latest version unknown (installed {})", installed)
            }
            Self::Upgraded { from, to } => write!(f, "upgraded {} -> {}", from, to),
            Self::UpgradeDeclined { installed, latest } => {
                write!(f, "kept {} ({} available)", installed, latest)
            }
            Self::UpgradeFailed { message } => write!(f, "upgrade failed: {}", message),
            Self::CheckSkipped { installed } => {
                write!(f, "version check skipped (installed {})", installed)
            }
        }
    }
}

/// Reconciles one environment against one requirement set.
pub struct Reconciler<'a> {
    manager: &'a dyn PackageManager,
    registry: Option<&'a dyn VersionSource>,
    requirements: &'a RequirementSet,
    tracked: &'a str,
}

impl<'a> Reconciler<'a> {
    /// `registry == None` disables the latest-version check.
    pub fn new(
        manager: &'a dyn PackageManager,
        registry: Option<&'a dyn VersionSource>,
        requirements: &'a RequirementSet,
        tracked: &'a str,
    ) -> Self {
        Self {
            manager,
            registry,
            requirements,
            tracked,
        }
    }

    /// Every name whose presence is checked: the requirement set plus the
    /// tracked package.
    pub fn checked_names(&self) -> Vec<&'a str> {
        let mut names = self.requirements.names();
        let tracked = normalize_name(self.tracked);
        if !names.iter().any(|n| normalize_name(n) == tracked) {
            names.push(self.tracked);
        }
        names
    }

    /// Run the reconciliation.
    ///
    /// Errors only come from the confirmer.
    pub fn reconcile(
        &self,
        ui: &mut dyn UserInterface,
        confirmer: &mut dyn Confirmer,
    ) -> Result<ReconcileOutcome> {
        let names = self.checked_names();
        let installed = self.installed_versions(&names);

        let missing: Vec<&str> = names
            .iter()
            .filter(|n| !installed.contains_key(&normalize_name(n)))
            .copied()
            .collect();

        let current = match installed.get(&normalize_name(self.tracked)) {
            Some(version) if missing.is_empty() => version.clone(),
            _ => return Ok(self.install_all(ui, &missing)),
        };

        let Some(registry) = self.registry else {
            tracing::debug!("Version check disabled");
            return Ok(ReconcileOutcome::CheckSkipped { installed: current });
        };

        let mut spinner = ui.start_spinner(&format!("Checking latest {}", self.tracked));
        let pair = VersionPair::new(Some(current.clone()), registry.latest_version(self.tracked));

        let Some(latest) = pair.latest.clone() else {
            spinner.finish_skipped(&format!(
                "Could not check for a newer {}; keeping {}",
                self.tracked, current
            ));
            return Ok(ReconcileOutcome::LatestUnknown { installed: current });
        };

        let Some(target) = pair.upgrade_target() else {
            spinner.finish_success(&format!("{} {} is up to date", self.tracked, current));
            return Ok(ReconcileOutcome::UpToDate { version: current });
        };
        spinner.finish_success(&format!(
            "{} {} is available (installed {})",
            self.tracked, target, current
        ));

        let question = format!(
            "Upgrade {} from {} to {}?",
            self.tracked, current, target
        );
        if !confirmer.confirm(&question)? {
            ui.message(&format!("Keeping {} {}", self.tracked, current));
            return Ok(ReconcileOutcome::UpgradeDeclined {
                installed: current,
                latest,
            });
        }

        Ok(self.upgrade(ui, current, target.to_string()))
    }

    fn installed_versions(&self, names: &[&str]) -> HashMap<String, String> {
        match self.manager.installed_versions(names) {
            Ok(versions) => versions,
            Err(e) => {
                tracing::debug!("Presence check failed, assuming nothing is installed: {:#}", e);
                HashMap::new()
            }
        }
    }

    fn install_all(&self, ui: &mut dyn UserInterface, missing: &[&str]) -> ReconcileOutcome {
        tracing::debug!("Missing packages: {}", missing.join(", "));
        let mut spinner = ui.start_spinner(&format!(
            "Installing requirements from {}",
            self.requirements.source()
        ));

        match self.manager.install(self.requirements) {
            Ok(()) => {
                spinner.finish_success("Requirements installed");
                ReconcileOutcome::Installed
            }
            Err(e) => {
                let message = format!("{:#}", e);
                spinner.finish_error("Installing requirements failed");
                ui.warning(&format!(
                    "Could not install requirements ({}); continuing anyway",
                    message
                ));
                ReconcileOutcome::InstallFailed { message }
            }
        }
    }

    fn upgrade(&self, ui: &mut dyn UserInterface, from: String, to: String) -> ReconcileOutcome {
        let mut spinner = ui.start_spinner(&format!("Upgrading {} to {}", self.tracked, to));

        match self.manager.upgrade(self.tracked, &to) {
            Ok(()) => {
                spinner.finish_success(&format!("{} upgraded to {}", self.tracked, to));
                ReconcileOutcome::Upgraded { from, to }
            }
            Err(e) => {
                let message = format!("{:#}", e);
                spinner.finish_error(&format!("Upgrading {} failed", self.tracked));
                ui.warning(&format!(
                    "Could not upgrade {} ({}); continuing with {}",
                    self.tracked, message, from
                ));
                ReconcileOutcome::UpgradeFailed { message }
            }
        }
    }
}
