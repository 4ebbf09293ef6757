//! pip, driven through the environment's interpreter.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::environment::EnvironmentHandle;
use crate::shell::{execute, CommandSpec};

use super::manifest::{normalize_name, RequirementSet, RequirementSource};

/// Installs and inspects packages in an environment.
pub trait PackageManager {
    /// Installed versions of `names`, keyed by normalized name.
    ///
    /// Packages that are not installed are simply absent from the map.
    fn installed_versions(&self, names: &[&str]) -> Result<HashMap<String, String>>;

    /// Install every requirement in `requirements`.
    fn install(&self, requirements: &RequirementSet) -> Result<()>;

    /// Install exactly `version` of `package`, replacing what is there.
    fn upgrade(&self, package: &str, version: &str) -> Result<()>;
}

/// [`PackageManager`] backed by `<env python> -m pip`.
#[derive(Debug, Clone)]
pub struct PipManager {
    handle: EnvironmentHandle,
    project_root: PathBuf,
}

impl PipManager {
    pub fn new(handle: &EnvironmentHandle, project_root: &Path) -> Self {
        Self {
            handle: handle.clone(),
            project_root: project_root.to_path_buf(),
        }
    }

    fn pip(&self, subcommand: &str) -> CommandSpec {
        CommandSpec::new(self.handle.python())
            .args(["-m", "pip", subcommand])
            .arg("--disable-pip-version-check")
    }

    fn run(&self, spec: CommandSpec) -> Result<()> {
        let options = self.handle.command_options(&self.project_root, true);
        let result = execute(&spec, &options)
            .with_context(|| format!("Could not run {}", spec.display()))?;

        tracing::debug!("pip stdout:\n{}", result.stdout);
        if !result.success {
            bail!("{}", result.error_summary());
        }
        Ok(())
    }
}

impl PackageManager for PipManager {
    fn installed_versions(&self, names: &[&str]) -> Result<HashMap<String, String>> {
        if names.is_empty() {
            return Ok(HashMap::new());
        }

        let spec = self.pip("show").args(names);
        let options = self.handle.command_options(&self.project_root, true);
        let result = execute(&spec, &options)
            .with_context(|| format!("Could not run {}", spec.display()))?;

        // pip exits 1 when any name is missing but still reports the rest.
        let versions = parse_pip_show(&result.stdout);
        if !result.success && versions.is_empty() && !result.stderr.contains("not found") {
            bail!("pip show failed: {}", result.error_summary());
        }
        Ok(versions)
    }

    fn install(&self, requirements: &RequirementSet) -> Result<()> {
        let spec = match requirements.source() {
            RequirementSource::Manifest(path) => self.pip("install").arg("-r").arg(path),
            RequirementSource::Defaults => {
                if requirements.is_empty() {
                    return Ok(());
                }
                self.pip("install")
                    .args(requirements.requirements().iter().map(|r| r.spec()))
            }
        };
        self.run(spec)
    }

    fn upgrade(&self, package: &str, version: &str) -> Result<()> {
        let spec = self
            .pip("install")
            .arg("--upgrade")
            .arg(format!("{}=={}", package, version));
        self.run(spec)
    }
}

/// Parse `pip show` output into normalized name to version.
pub fn parse_pip_show(output: &str) -> HashMap<String, String> {
    let mut versions = HashMap::new();
    let mut current: Option<String> = None;

    for line in output.lines() {
        if line.trim() == "---" {
            current = None;
        } else if let Some(name) = line.strip_prefix("Name:") {
            current = Some(normalize_name(name));
        } else if let Some(version) = line.strip_prefix("Version:") {
            if let Some(name) = current.take() {
                versions.insert(name, version.trim().to_string());
            }
        }
    }
    versions
}
