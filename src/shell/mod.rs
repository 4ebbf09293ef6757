//! Subprocess execution and platform details.

pub mod command;
pub mod platform;

pub use command::{
    execute, execute_interactive, execute_quiet, exit_code_of, CommandOptions,
    CommandResult, CommandSpec,
};
pub use platform::{default_base_python, is_ci, venv_bin_dir, venv_python_name};
