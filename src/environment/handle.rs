//! Explicit handle on an activated virtual environment.
//!
//! Activation never touches the basecamp process's own environment. The
//! handle describes what a child process needs to see (`VIRTUAL_ENV`, a
//! `PATH` led by the environment's bin dir, no `PYTHONHOME`) and every
//! subprocess that must run inside the environment is built from it.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::shell::{venv_bin_dir, venv_python_name, CommandOptions};

/// Filesystem state of the environment directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentDescriptor {
    /// Environment directory.
    pub root: PathBuf,
    /// Whether the directory exists.
    pub exists: bool,
    /// Whether a handle has been produced for it in this process.
    pub activated: bool,
}

/// An environment ready to run commands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentHandle {
    root: PathBuf,
    bin_dir: PathBuf,
    python: PathBuf,
}

impl EnvironmentHandle {
    /// Build the handle for an environment rooted at `root`.
    pub fn from_root(root: &Path) -> Self {
        let bin_dir = venv_bin_dir(root);
        let python = bin_dir.join(venv_python_name());
        Self {
            root: root.to_path_buf(),
            bin_dir,
            python,
        }
    }

    /// Environment directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the environment's executables.
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// The environment's interpreter.
    pub fn python(&self) -> &Path {
        &self.python
    }

    /// Whether the interpreter is present on disk.
    pub fn has_interpreter(&self) -> bool {
        self.python.is_file()
    }

    /// Variables a child process needs to run inside the environment.
    pub fn activation_env(&self) -> HashMap<String, String> {
        self.activation_env_with_path(std::env::var_os("PATH"))
    }

    /// Same as [`activation_env`](Self::activation_env) with an explicit
    /// inherited `PATH`.
    pub fn activation_env_with_path(
        &self,
        inherited: Option<OsString>,
    ) -> HashMap<String, String> {
        let mut entries = vec![self.bin_dir.clone()];
        if let Some(path) = inherited {
            entries.extend(std::env::split_paths(&path).filter(|p| p != &self.bin_dir));
        }

        let path = std::env::join_paths(&entries)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| self.bin_dir.to_string_lossy().into_owned());

        let mut env = HashMap::new();
        env.insert(
            "VIRTUAL_ENV".to_string(),
            self.root.to_string_lossy().into_owned(),
        );
        env.insert("PATH".to_string(), path);
        env
    }

    /// Variables that must not leak into the environment's processes.
    pub fn removed_env(&self) -> Vec<String> {
        vec!["PYTHONHOME".to_string()]
    }

    /// Command options for running inside this environment.
    pub fn command_options(&self, cwd: &Path, capture: bool) -> CommandOptions {
        CommandOptions {
            cwd: Some(cwd.to_path_buf()),
            env: self.activation_env(),
            env_remove: self.removed_env(),
            capture_stdout: capture,
            capture_stderr: capture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpreter_lives_in_bin_dir() {
        let handle = EnvironmentHandle::from_root(Path::new("/proj/venv"));
        assert!(handle.python().starts_with(handle.bin_dir()));
        assert!(handle.bin_dir().starts_with("/proj/venv"));
        assert_eq!(handle.root(), Path::new("/proj/venv"));
    }

    #[test]
    fn activation_sets_virtual_env() {
        let handle = EnvironmentHandle::from_root(Path::new("/proj/venv"));
        let env = handle.activation_env_with_path(None);
        assert_eq!(env.get("VIRTUAL_ENV").map(String::as_str), Some("/proj/venv"));
    }

    #[cfg(unix)]
    #[test]
    fn activation_prepends_bin_dir_to_path() {
        let handle = EnvironmentHandle::from_root(Path::new("/proj/venv"));
        let env = handle.activation_env_with_path(Some(OsString::from("/usr/bin:/bin")));
        assert_eq!(
            env.get("PATH").map(String::as_str),
            Some("/proj/venv/bin:/usr/bin:/bin")
        );
    }

    #[cfg(unix)]
    #[test]
    fn activation_does_not_duplicate_bin_dir() {
        let handle = EnvironmentHandle::from_root(Path::new("/proj/venv"));
        let env =
            handle.activation_env_with_path(Some(OsString::from("/proj/venv/bin:/usr/bin")));
        assert_eq!(
            env.get("PATH").map(String::as_str),
            Some("/proj/venv/bin:/usr/bin")
        );
    }

    #[test]
    fn activation_leaves_process_env_untouched() {
        let before = std::env::var_os("VIRTUAL_ENV");
        let handle = EnvironmentHandle::from_root(Path::new("/proj/venv"));
        let _ = handle.activation_env();
        assert_eq!(std::env::var_os("VIRTUAL_ENV"), before);
    }

    #[test]
    fn command_options_carry_activation() {
        let handle = EnvironmentHandle::from_root(Path::new("/proj/venv"));
        let options = handle.command_options(Path::new("/proj"), true);
        assert_eq!(options.cwd.as_deref(), Some(Path::new("/proj")));
        assert!(options.env.contains_key("VIRTUAL_ENV"));
        assert!(options.env_remove.contains(&"PYTHONHOME".to_string()));
        assert!(options.capture_stdout && options.capture_stderr);
    }

    #[test]
    fn missing_interpreter_detected() {
        let temp = tempfile::TempDir::new().unwrap();
        let handle = EnvironmentHandle::from_root(temp.path());
        assert!(!handle.has_interpreter());
    }
}
