//! Error types for basecamp operations.
//!
//! This module defines [`BasecampError`], the error type for the fatal tier
//! of the workflow, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Fatal errors abort the workflow before the analysis program launches
//!   and map to a stable process exit code (see [`BasecampError::exit_code`])
//! - Recoverable problems (registry unreachable, failed install or upgrade,
//!   missing manifest) never become a `BasecampError`; they are reported to
//!   the operator and the workflow continues
//! - Use `anyhow::Error` (via `BasecampError::Other`) for unexpected errors
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | *n*  | The analysis program ran; its exit code is passed through verbatim |
//! | 1    | Unexpected internal error, or the program could not be spawned |
//! | 2    | Invalid configuration |
//! | 3    | Project root could not be resolved |
//! | 4    | Virtual environment could not be created |
//! | 5    | Entry point does not exist |
//! | 130  | Interrupted at the upgrade prompt |

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for unexpected failures.
pub const EXIT_INTERNAL: i32 = 1;
/// Exit code for an invalid configuration file.
pub const EXIT_CONFIG: i32 = 2;
/// Exit code when the project root cannot be resolved.
pub const EXIT_LOCATE: i32 = 3;
/// Exit code when the environment cannot be created.
pub const EXIT_PROVISION: i32 = 4;
/// Exit code when the entry point is missing.
pub const EXIT_ENTRY_POINT: i32 = 5;
/// Exit code when the operator interrupts a prompt (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

/// Core error type for basecamp operations.
#[derive(Debug, Error)]
pub enum BasecampError {
    /// The project root could not be determined.
    #[error("Cannot resolve project directory: {message}")]
    ProjectRootUnresolved { message: String },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Creating the virtual environment failed.
    #[error("Cannot create environment at {path}: {message}")]
    EnvironmentCreateFailed { path: PathBuf, message: String },

    /// The configured entry point does not exist on disk.
    #[error("Entry point '{entry}' not found (looked for {path})")]
    EntryPointMissing { entry: String, path: PathBuf },

    /// The analysis program could not be started at all.
    #[error("Failed to launch '{program}': {message}")]
    LaunchFailed { program: String, message: String },

    /// The operator interrupted a prompt.
    #[error("Interrupted")]
    Interrupted,

    /// Shell command failed to spawn.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BasecampError {
    /// Workflow phase the error belongs to, for operator-facing messages.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::ProjectRootUnresolved { .. } => "locate",
            Self::ConfigParseError { .. } | Self::ConfigValidationError { .. } => "configure",
            Self::EnvironmentCreateFailed { .. } => "provision",
            Self::EntryPointMissing { .. } | Self::LaunchFailed { .. } => "launch",
            Self::Interrupted => "reconcile",
            Self::CommandFailed { .. } | Self::Io(_) | Self::Other(_) => "internal",
        }
    }

    /// Stable process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ProjectRootUnresolved { .. } => EXIT_LOCATE,
            Self::ConfigParseError { .. } | Self::ConfigValidationError { .. } => EXIT_CONFIG,
            Self::EnvironmentCreateFailed { .. } => EXIT_PROVISION,
            Self::EntryPointMissing { .. } => EXIT_ENTRY_POINT,
            Self::Interrupted => EXIT_INTERRUPTED,
            Self::LaunchFailed { .. }
            | Self::CommandFailed { .. }
            | Self::Io(_)
            | Self::Other(_) => EXIT_INTERNAL,
        }
    }
}

/// Result type alias for basecamp operations.
pub type Result<T> = std::result::Result<T, BasecampError>;
