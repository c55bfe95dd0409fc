//! # ipcs CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Reports go to stdout; logs go to stderr.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ipcs_cli::generate::{run_generate, GenerateArgs};
use ipcs_cli::validate::{run_validate, ValidateArgs};
use ipcs_cli::EXIT_FAILURE;

/// IPC schema toolchain
///
/// Validates the YAML contract shared by the real-time and non-real-time
/// processes and generates the C++ headers both sides compile against.
#[derive(Parser, Debug)]
#[command(name = "ipcs", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a schema document and print the report.
    Validate(ValidateArgs),

    /// Validate a schema document and generate the C++ headers.
    Generate(GenerateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG, when set, overrides the verbosity flags.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "ipcs starting");

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args),
        Commands::Generate(args) => run_generate(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
