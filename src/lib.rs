//! basecamp - prepare a Python environment and run the stock analyzer.
//!
//! basecamp sits in front of a Python analysis program. Each run it finds
//! the project directory, makes sure the project's virtual environment
//! exists, installs missing packages (or offers to upgrade the tracked
//! package when the registry has a different version), then runs the
//! program inside the environment and exits with the program's exit code.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, merging, and validation
//! - [`environment`] - Project location and virtual environment provisioning
//! - [`error`] - Error types, result alias, and exit codes
//! - [`launcher`] - Running the analysis program
//! - [`packages`] - Requirement sets, pip, registry lookup, and reconciliation
//! - [`shell`] - Subprocess execution and platform details
//! - [`ui`] - Spinners, prompts, and terminal output
//!
//! # Example
//!
//! ```
//! use basecamp::packages::VersionPair;
//!
//! let pair = VersionPair::new(Some("1.2.0".into()), Some("1.3.0".into()));
//! assert_eq!(pair.upgrade_target(), Some("1.3.0"));
//!
//! let unknown = VersionPair::new(Some("1.2.0".into()), None);
//! assert_eq!(unknown.upgrade_target(), None);
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod launcher;
pub mod packages;
pub mod shell;
pub mod ui;

pub use error::{BasecampError, Result};
