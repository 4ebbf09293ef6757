//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::ffi::OsString;
use std::path::PathBuf;

/// basecamp - prepare the Python environment and run the stock analyzer.
#[derive(Debug, Parser)]
#[command(name = "basecamp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project root (default: derived from the executable's location)
    #[arg(short, long, global = true, env = "BASECAMP_PROJECT")]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Prepare the environment and launch the analyzer (default)
    Run(RunArgs),

    /// Show environment and package status without changing anything
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Upgrade the tracked package without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Never prompt; available upgrades are declined
    #[arg(long)]
    pub non_interactive: bool,

    /// Skip the latest-version lookup
    #[arg(long)]
    pub offline: bool,

    /// Arguments passed to the analysis program
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<OsString>,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Skip the latest-version lookup
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["basecamp"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_collects_trailing_args() {
        let cli =
            Cli::try_parse_from(["basecamp", "run", "--yes", "--", "--symbol", "600519"]).unwrap();

        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert!(args.yes);
        assert_eq!(args.args, [OsString::from("--symbol"), OsString::from("600519")]);
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["basecamp", "status", "--project", "/tmp", "-q"]).unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("/tmp")));
        assert!(cli.quiet);
    }

    #[test]
    fn run_flags() {
        let cli = Cli::try_parse_from(["basecamp", "run", "--offline", "--non-interactive"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert!(args.offline);
        assert!(args.non_interactive);
        assert!(!args.yes);
        assert!(args.args.is_empty());
    }

    #[test]
    fn completions_requires_known_shell() {
        assert!(Cli::try_parse_from(["basecamp", "completions", "bash"]).is_ok());
        assert!(Cli::try_parse_from(["basecamp", "completions", "cmd"]).is_err());
    }
}
