//! Platform-specific details of virtual environments and terminals.

use std::path::{Path, PathBuf};

/// Directory inside a virtual environment that holds its executables.
pub fn venv_bin_dir(env_root: &Path) -> PathBuf {
    if cfg!(target_os = "windows") {
        env_root.join("Scripts")
    } else {
        env_root.join("bin")
    }
}

/// File name of the interpreter inside a virtual environment's bin dir.
pub fn venv_python_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "python.exe"
    } else {
        "python"
    }
}

/// Default interpreter used to create new environments.
pub fn default_base_python() -> &'static str {
    if cfg!(target_os = "windows") {
        "python"
    } else {
        "python3"
    }
}

/// Check if running in a CI environment.
///
/// Used to force non-interactive mode in `main()`, which in turn makes
/// upgrade confirmations answer "no" instead of waiting on stdin.
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}
