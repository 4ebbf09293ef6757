//! basecamp CLI entry point.

use std::process::ExitCode;

use basecamp::cli::{Cli, CommandDispatcher, Commands};
use basecamp::shell::is_ci;
use basecamp::ui::{create_ui, OutputMode};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("basecamp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("basecamp=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// The exit code as a byte, if it is one.
fn exit_byte(code: i32) -> Option<u8> {
    u8::try_from(code).ok()
}

/// Exit with `code`. Codes outside 0..=255 (Windows, NTSTATUS values)
/// bypass `ExitCode` so they are not truncated.
fn exit_with(code: i32) -> ExitCode {
    match exit_byte(code) {
        Some(byte) => ExitCode::from(byte),
        None => std::process::exit(code),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("basecamp starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let is_interactive = match &cli.command {
        Some(Commands::Run(args)) => !args.non_interactive && !is_ci(),
        _ => !is_ci(),
    };

    let mut ui = create_ui(is_interactive, output_mode);

    let dispatcher = CommandDispatcher::new(cli.project.clone());

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => exit_with(result.exit_code),
        Err(e) => {
            ui.error(&format!("Error ({}): {}", e.phase(), e));
            exit_with(e.exit_code())
        }
    }
}
