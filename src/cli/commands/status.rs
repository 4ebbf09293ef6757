//! Status command implementation.
//!
//! The `basecamp status` command reports what `run` would find, without
//! creating, installing or launching anything.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::StatusArgs;
use crate::config::{load_config, BasecampConfig, ConfigPaths};
use crate::environment::{EnvironmentDescriptor, EnvironmentHandle, ProjectLocation, Provisioner};
use crate::error::Result;
use crate::launcher::Launcher;
use crate::packages::{
    normalize_name, PackageManager, PipManager, PypiRegistry, RequirementSet, RequirementSource,
    VersionPair, VersionSource,
};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Everything `status` reports.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub project_root: PathBuf,
    pub config_files: Vec<PathBuf>,
    pub environment: EnvironmentDescriptor,
    pub interpreter: Option<PathBuf>,
    pub requirements: RequirementSource,
    pub requirement_count: usize,
    pub tracked_package: String,
    pub versions: VersionPair,
    pub upgrade_available: Option<String>,
    pub entry_point: String,
    pub entry_point_path: PathBuf,
    pub entry_point_found: bool,
}

impl StatusReport {
    /// Gather the report for a project.
    pub fn collect(
        root: &Path,
        config: &BasecampConfig,
        registry: Option<&dyn VersionSource>,
    ) -> Self {
        let env_root = root.join(&config.env_dir);
        let provisioner = Provisioner::new(&config.python, &env_root, root);
        let environment = provisioner.descriptor();
        let handle = EnvironmentHandle::from_root(&env_root);
        let interpreter = handle.has_interpreter().then(|| handle.python().to_path_buf());

        let requirements = RequirementSet::load(&root.join(&config.manifest), &config.default_packages);

        let installed = if interpreter.is_some() {
            PipManager::new(&handle, root)
                .installed_versions(&[config.tracked_package.as_str()])
                .map_err(|e| tracing::debug!("Cannot query installed version: {:#}", e))
                .ok()
                .and_then(|mut v| v.remove(&normalize_name(&config.tracked_package)))
        } else {
            None
        };
        let latest = registry.and_then(|r| r.latest_version(&config.tracked_package));
        let versions = VersionPair::new(installed, latest);
        let upgrade_available = versions.upgrade_target().map(String::from);

        let launcher = Launcher::new(&handle, root, &config.entry);
        let entry_point_path = launcher.entry_path();
        let entry_point_found = launcher.resolve().is_ok();

        Self {
            project_root: root.to_path_buf(),
            config_files: ConfigPaths::discover(root)
                .all_existing()
                .into_iter()
                .cloned()
                .collect(),
            environment,
            interpreter,
            requirements: requirements.source().clone(),
            requirement_count: requirements.len(),
            tracked_package: config.tracked_package.clone(),
            versions,
            upgrade_available,
            entry_point: config.entry.to_string(),
            entry_point_path,
            entry_point_found,
        }
    }

    /// Render the report as fields on the UI.
    pub fn show(&self, ui: &mut dyn UserInterface) {
        let or = |value: Option<&str>, fallback: &str| value.unwrap_or(fallback).to_string();

        ui.show_field("Project", &self.project_root.display().to_string());
        let config = if self.config_files.is_empty() {
            "defaults".to_string()
        } else {
            self.config_files
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        ui.show_field("Config", &config);

        let env_state = if self.environment.exists { "" } else { " (missing)" };
        ui.show_field(
            "Environment",
            &format!("{}{}", self.environment.root.display(), env_state),
        );
        ui.show_field(
            "Interpreter",
            &self
                .interpreter
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "missing".to_string()),
        );
        ui.show_field(
            "Requirements",
            &format!("{} ({} entries)", self.requirements, self.requirement_count),
        );
        ui.show_field(
            "Installed",
            &format!(
                "{} {}",
                self.tracked_package,
                or(self.versions.installed.as_deref(), "not installed")
            ),
        );
        ui.show_field("Latest", &or(self.versions.latest.as_deref(), "unknown"));
        if let Some(target) = &self.upgrade_available {
            ui.show_field("Upgrade", &format!("{} available", target));
        }
        let entry_state = if self.entry_point_found { "" } else { " (missing)" };
        ui.show_field(
            "Entry point",
            &format!(
                "{} -> {}{}",
                self.entry_point,
                self.entry_point_path.display(),
                entry_state
            ),
        );
    }
}

/// The status command implementation.
pub struct StatusCommand {
    project: Option<PathBuf>,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(project: Option<&Path>, args: StatusArgs) -> Self {
        Self {
            project: project.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &StatusArgs {
        &self.args
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let location = ProjectLocation::resolve(self.project.as_deref())?;
        let config = load_config(location.root())?;

        let registry = (!self.args.offline)
            .then(|| PypiRegistry::new(&config.registry.index_url, config.registry.timeout()));
        let report = StatusReport::collect(
            location.root(),
            &config,
            registry.as_ref().map(|r| r as &dyn VersionSource),
        );

        if self.args.json {
            let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
            println!("{}", json);
        } else {
            ui.show_header("basecamp status");
            report.show(ui);
        }

        Ok(CommandResult::success())
    }
}
