//! # Validate Subcommand
//!
//! `ipcs validate <SCHEMA> [--json]`: run every rule over one document and
//! print the report on stdout.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::{check_file, format_report, EXIT_FAILURE, EXIT_OK};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema document to validate.
    pub schema: PathBuf,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let report = check_file(&args.schema);
    print!("{}", format_report(&report, args.json)?);
    if args.json {
        println!();
    }

    if report.accepted {
        tracing::info!(
            schema = %args.schema.display(),
            warnings = report.warnings.len(),
            "schema accepted"
        );
        Ok(EXIT_OK)
    } else {
        Ok(EXIT_FAILURE)
    }
}
