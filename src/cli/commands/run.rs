//! Run command implementation.
//!
//! The `basecamp run` command (also the default when no command is given)
//! drives the whole workflow: locate the project, make sure the virtual
//! environment exists, reconcile packages, then hand the terminal to the
//! analysis program and return its exit code.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use console::Term;

use crate::cli::args::RunArgs;
use crate::config::{load_config, UpgradePolicy};
use crate::environment::{EnvironmentHandle, ProjectLocation, Provisioned, Provisioner};
use crate::error::Result;
use crate::launcher::Launcher;
use crate::packages::{
    Confirmer, FixedConfirmer, PipManager, PypiRegistry, Reconciler, RequirementSet,
    VersionSource,
};
use crate::shell::is_ci;
use crate::ui::{TerminalConfirmer, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// How upgrade questions get answered in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    /// Ask on the terminal.
    Ask,
    /// Answer without asking.
    Auto(bool),
}

impl ConfirmMode {
    /// Decide from the configured policy, `--yes`, and whether a person can
    /// answer.
    pub fn select(policy: UpgradePolicy, yes: bool, interactive: bool) -> Self {
        match policy {
            _ if yes => Self::Auto(true),
            UpgradePolicy::Always => Self::Auto(true),
            UpgradePolicy::Never => Self::Auto(false),
            UpgradePolicy::Prompt if interactive => Self::Ask,
            UpgradePolicy::Prompt => Self::Auto(false),
        }
    }

    fn confirmer(self) -> Box<dyn Confirmer> {
        match self {
            Self::Ask => Box::new(TerminalConfirmer::new()),
            Self::Auto(answer) => Box::new(FixedConfirmer(answer)),
        }
    }
}

/// Which standard streams are attached to a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalStreams {
    pub stdin: bool,
    pub stdout: bool,
    pub stderr: bool,
}

impl TerminalStreams {
    /// Probe the current process.
    pub fn detect() -> Self {
        Self {
            stdin: io::stdin().is_terminal(),
            stdout: Term::stdout().is_term(),
            stderr: Term::stderr().is_term(),
        }
    }
}

/// Whether an upgrade question can be put to a person.
///
/// All three standard streams must be terminals. A redirected stdin still
/// leaves `/dev/tty` reachable, and a prompt there would never be answered.
pub fn can_prompt(non_interactive: bool, ci: bool, streams: TerminalStreams) -> bool {
    !non_interactive && !ci && streams.stdin && streams.stdout && streams.stderr
}

/// The run command implementation.
pub struct RunCommand {
    project: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project: Option<&Path>, args: RunArgs) -> Self {
        Self {
            project: project.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    fn is_interactive(&self, ui: &dyn UserInterface) -> bool {
        ui.is_interactive()
            && can_prompt(self.args.non_interactive, is_ci(), TerminalStreams::detect())
    }

    fn provision(&self, provisioner: &Provisioner, ui: &mut dyn UserInterface) -> Result<Provisioned> {
        if provisioner.descriptor().exists {
            return provisioner.ensure();
        }

        let mut spinner = ui.start_spinner(&format!(
            "Creating environment at {}",
            provisioner.env_root().display()
        ));
        match provisioner.ensure() {
            Ok(provisioned) => {
                spinner.finish_success("Environment created");
                Ok(provisioned)
            }
            Err(e) => {
                spinner.finish_error("Creating environment failed");
                Err(e)
            }
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let location = ProjectLocation::resolve(self.project.as_deref())?;
        location.enter()?;
        let root = location.root();

        let config = load_config(root)?;
        ui.show_header(&format!("basecamp · {}", root.display()));

        let env_root = location.join(&config.env_dir);
        let launcher = Launcher::new(&EnvironmentHandle::from_root(&env_root), root, &config.entry);
        launcher.resolve()?;

        let provisioner = Provisioner::new(&config.python, &env_root, root);
        let provisioned = self.provision(&provisioner, ui)?;

        let requirements =
            RequirementSet::load(&location.join(&config.manifest), &config.default_packages);
        tracing::debug!(
            "{} requirement(s) from {}",
            requirements.len(),
            requirements.source()
        );

        let manager = PipManager::new(&provisioned.handle, root);
        let registry = (!self.args.offline)
            .then(|| PypiRegistry::new(&config.registry.index_url, config.registry.timeout()));
        let mode = ConfirmMode::select(config.upgrade, self.args.yes, self.is_interactive(ui));
        let mut confirmer = mode.confirmer();

        let outcome = Reconciler::new(
            &manager,
            registry.as_ref().map(|r| r as &dyn VersionSource),
            &requirements,
            &config.tracked_package,
        )
        .reconcile(ui, confirmer.as_mut())?;
        tracing::debug!("Reconciled: {}", outcome);

        ui.message(&format!("Launching {}", config.entry));
        let code = launcher.launch(&self.args.args)?;
        Ok(CommandResult::from_exit_code(code))
    }
}
