//! Virtual environment creation.

use std::path::{Path, PathBuf};

use crate::error::{BasecampError, Result};
use crate::shell::{execute_quiet, CommandSpec};

use super::handle::{EnvironmentDescriptor, EnvironmentHandle};

/// Result of [`Provisioner::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    /// Handle on the ready environment.
    pub handle: EnvironmentHandle,
    /// Whether this call created the environment.
    pub created: bool,
}

impl Provisioned {
    /// Descriptor of the environment after provisioning.
    pub fn descriptor(&self) -> EnvironmentDescriptor {
        EnvironmentDescriptor {
            root: self.handle.root().to_path_buf(),
            exists: self.handle.root().is_dir(),
            activated: true,
        }
    }
}

/// Creates the project's virtual environment when it is missing.
#[derive(Debug, Clone)]
pub struct Provisioner {
    base_python: String,
    env_root: PathBuf,
    project_root: PathBuf,
}

impl Provisioner {
    /// Provisioner for `env_root`, creating it with `base_python -m venv`.
    pub fn new(base_python: &str, env_root: &Path, project_root: &Path) -> Self {
        Self {
            base_python: base_python.to_string(),
            env_root: env_root.to_path_buf(),
            project_root: project_root.to_path_buf(),
        }
    }

    /// Environment directory this provisioner manages.
    pub fn env_root(&self) -> &Path {
        &self.env_root
    }

    /// Current filesystem state, without side effects.
    pub fn descriptor(&self) -> EnvironmentDescriptor {
        EnvironmentDescriptor {
            root: self.env_root.clone(),
            exists: self.env_root.is_dir(),
            activated: false,
        }
    }

    /// Make sure the environment exists and return a handle on it.
    ///
    /// An existing directory is used as is. Creation failure is fatal.
    pub fn ensure(&self) -> Result<Provisioned> {
        let created = if self.env_root.is_dir() {
            tracing::debug!("Environment exists at {}", self.env_root.display());
            false
        } else {
            self.create()?;
            true
        };

        let handle = EnvironmentHandle::from_root(&self.env_root);
        if !handle.has_interpreter() {
            tracing::warn!(
                "No interpreter at {}; the environment may be incomplete",
                handle.python().display()
            );
        }

        Ok(Provisioned { handle, created })
    }

    fn create(&self) -> Result<()> {
        tracing::info!("Creating environment at {}", self.env_root.display());

        let spec = CommandSpec::new(&self.base_python)
            .args(["-m", "venv"])
            .arg(&self.env_root);

        let result = execute_quiet(&spec, Some(&self.project_root)).map_err(|_| {
            BasecampError::EnvironmentCreateFailed {
                path: self.env_root.clone(),
                message: format!("could not run '{}'", self.base_python),
            }
        })?;

        if !result.success {
            return Err(BasecampError::EnvironmentCreateFailed {
                path: self.env_root.clone(),
                message: result.error_summary(),
            });
        }

        Ok(())
    }
}
