//! Launching the analysis program.
//!
//! The program runs under the environment's interpreter with the project
//! root as working directory and the terminal handed over (stdin, stdout
//! and stderr inherited). Its exit code is returned untouched.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::EntryPoint;
use crate::environment::EnvironmentHandle;
use crate::error::{BasecampError, Result};
use crate::shell::{execute_interactive, exit_code_of, CommandSpec};

/// Launches one entry point inside one environment.
#[derive(Debug, Clone)]
pub struct Launcher {
    handle: EnvironmentHandle,
    project_root: PathBuf,
    entry: EntryPoint,
}

impl Launcher {
    pub fn new(handle: &EnvironmentHandle, project_root: &Path, entry: &EntryPoint) -> Self {
        Self {
            handle: handle.clone(),
            project_root: project_root.to_path_buf(),
            entry: entry.clone(),
        }
    }

    /// Path where the entry point is expected.
    ///
    /// For a module this is the first of `a/b/c.py` and
    /// `a/b/c/__main__.py` that exists, or the former if neither does.
    pub fn entry_path(&self) -> PathBuf {
        match &self.entry {
            EntryPoint::Script(path) => self.project_root.join(path),
            EntryPoint::Module(dotted) => {
                let base = dotted
                    .split('.')
                    .fold(self.project_root.clone(), |acc, part| acc.join(part));
                let module_file = base.with_extension("py");
                let package_main = base.join("__main__.py");
                if !module_file.is_file() && package_main.is_file() {
                    package_main
                } else {
                    module_file
                }
            }
        }
    }

    /// Check that the entry point exists before anything is spawned.
    pub fn resolve(&self) -> Result<PathBuf> {
        let path = self.entry_path();
        let valid_module = match &self.entry {
            EntryPoint::Module(dotted) => {
                !dotted.is_empty() && dotted.split('.').all(|p| !p.is_empty())
            }
            EntryPoint::Script(_) => true,
        };

        if valid_module && path.is_file() {
            Ok(path)
        } else {
            Err(BasecampError::EntryPointMissing {
                entry: self.entry.to_string(),
                path,
            })
        }
    }

    /// The command that runs the entry point with `args` appended.
    pub fn command(&self, args: &[OsString]) -> CommandSpec {
        let spec = CommandSpec::new(self.handle.python());
        let spec = match &self.entry {
            EntryPoint::Script(path) => spec.arg(self.project_root.join(path)),
            EntryPoint::Module(dotted) => spec.arg("-m").arg(dotted),
        };
        spec.args(args)
    }

    /// Run the program and wait for it, returning its exit code.
    pub fn launch(&self, args: &[OsString]) -> Result<i32> {
        self.resolve()?;

        let spec = self.command(args);
        let options = self.handle.command_options(&self.project_root, false);
        tracing::info!("Launching {}", self.entry);

        let status =
            execute_interactive(&spec, &options).map_err(|e| BasecampError::LaunchFailed {
                program: spec.display(),
                message: e.to_string(),
            })?;

        let code = exit_code_of(status);
        tracing::debug!("{} exited with {}", self.entry, code);
        Ok(code)
    }
}
