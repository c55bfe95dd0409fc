//! # ipcs-cli: IPC Schema Toolchain CLI
//!
//! Provides the `ipcs` command-line interface.
//!
//! ## Subcommands
//!
//! - `ipcs validate`: Check a schema document and print a report.
//! - `ipcs generate`: Validate, then emit `DataStoreKeys.h` and
//!   `EventBusEvents.h` into an output directory.
//!
//! ```bash
//! ipcs validate schemas/ipc-schema.yaml
//! ipcs validate schemas/ipc-schema.yaml --json
//! ipcs generate schemas/ipc-schema.yaml build/generated/ipc --namespace mxrc::ipc
//! ```
//!
//! Both subcommands exit 0 on success and 1 when the document is unreadable,
//! malformed or rejected.

pub mod generate;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use ipcs_schema::{load, validate as validate_document, ValidationReport};

/// Exit code for a successful run.
pub const EXIT_OK: u8 = 0;
/// Exit code for an unreadable, malformed or rejected schema, or a failed
/// emission.
pub const EXIT_FAILURE: u8 = 1;

/// Load and validate the document at `path`. A document that cannot be
/// read or parsed yields a failed report rather than an error.
pub fn check_file(path: &Path) -> ValidationReport {
    match load(path) {
        Ok(doc) => validate_document(&doc),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "schema not loadable");
            ValidationReport::structural_failure(e.to_string())
        }
    }
}

/// Render a report as text or pretty JSON.
pub fn format_report(report: &ValidationReport, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(report).context("failed to serialize validation report")
    } else {
        Ok(report.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_structural_failure() {
        let dir = tempfile::tempdir().unwrap();
        let report = check_file(&dir.path().join("absent.yaml"));
        assert!(!report.accepted);
        assert_eq!(report.errors.len(), 1);
        assert!(report.summary.is_none());
    }

    #[test]
    fn json_report_carries_rule_names() {
        let report = ValidationReport::structural_failure("boom");
        let text = format_report(&report, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["accepted"], false);
        assert_eq!(value["errors"][0]["rule"], "structure");
        assert_eq!(value["errors"][0]["message"], "boom");
        assert!(value.get("summary").is_none());
    }

    #[test]
    fn text_report_is_the_display_form() {
        let report = ValidationReport::structural_failure("boom");
        assert_eq!(format_report(&report, false).unwrap(), report.to_string());
    }
}
