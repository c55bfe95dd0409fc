//! # Diagnostics
//!
//! Errors and warnings produced by the validators, and the final
//! [`ValidationReport`] with its summary statistics.
//!
//! Each validator returns its own [`Diagnostics`]; the caller merges them in
//! invocation order. An exact repeat of a message with the same severity is
//! kept once. The schema is accepted iff no error was recorded.

use serde::Serialize;

use ipcs_core::MAX_HOT_KEYS;

use crate::model::SchemaDocument;

/// The validator that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// The document could not be parsed; no validator ran.
    Structure,
    Version,
    Sections,
    Names,
    Types,
    Access,
    Events,
    HotKeys,
    Defaults,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Version => "version",
            Self::Sections => "sections",
            Self::Names => "names",
            Self::Types => "types",
            Self::Access => "access",
            Self::Events => "events",
            Self::HotKeys => "hot_keys",
            Self::Defaults => "defaults",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One message tagged with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule: Rule,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered errors and warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. An identical error already recorded is not repeated.
    pub fn error(&mut self, rule: Rule, message: impl Into<String>) {
        Self::push(&mut self.errors, rule, message.into());
    }

    /// Record a warning. An identical warning already recorded is not repeated.
    pub fn warning(&mut self, rule: Rule, message: impl Into<String>) {
        Self::push(&mut self.warnings, rule, message.into());
    }

    pub fn record(&mut self, severity: Severity, rule: Rule, message: impl Into<String>) {
        match severity {
            Severity::Error => self.error(rule, message),
            Severity::Warning => self.warning(rule, message),
        }
    }

    fn push(list: &mut Vec<Diagnostic>, rule: Rule, message: String) {
        if list.iter().any(|d| d.message == message) {
            return;
        }
        list.push(Diagnostic { rule, message });
    }

    /// Append `other` after the diagnostics already collected.
    pub fn merge(&mut self, other: Diagnostics) {
        for d in other.errors {
            Self::push(&mut self.errors, d.rule, d.message);
        }
        for d in other.warnings {
            Self::push(&mut self.warnings, d.rule, d.message);
        }
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn is_accepted(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Counts reported with a validation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_keys: usize,
    pub hot_keys: usize,
    pub max_hot_keys: usize,
    /// `None` when the document has no `eventbus_events` section.
    pub total_events: Option<usize>,
    pub custom_types: usize,
}

impl Summary {
    pub fn of(doc: &SchemaDocument) -> Self {
        Self {
            total_keys: doc.keys().len(),
            hot_keys: doc.hot_key_count(),
            max_hot_keys: MAX_HOT_KEYS,
            total_events: doc.eventbus_events.as_ref().map(Vec::len),
            custom_types: doc.types.len(),
        }
    }
}

/// The outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub accepted: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    /// Absent when the document could not be parsed at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl ValidationReport {
    pub fn new(diagnostics: Diagnostics, summary: Summary) -> Self {
        Self {
            accepted: diagnostics.is_accepted(),
            errors: diagnostics.errors,
            warnings: diagnostics.warnings,
            summary: Some(summary),
        }
    }

    /// A failed report for a document that never reached the validators.
    pub fn structural_failure(message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            errors: vec![Diagnostic {
                rule: Rule::Structure,
                message: message.into(),
            }],
            warnings: Vec::new(),
            summary: None,
        }
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.accepted {
            writeln!(f, "Schema validation FAILED")?;
            writeln!(f)?;
            writeln!(f, "Errors:")?;
            for e in &self.errors {
                writeln!(f, "  - {e}")?;
            }
        }

        if !self.warnings.is_empty() {
            if !self.accepted {
                writeln!(f)?;
            }
            writeln!(f, "Warnings:")?;
            for w in &self.warnings {
                writeln!(f, "  - {w}")?;
            }
            if self.accepted {
                writeln!(f)?;
            }
        }

        if self.accepted {
            writeln!(f, "Schema validation PASSED")?;
            if let Some(summary) = &self.summary {
                writeln!(f)?;
                writeln!(f, "Statistics:")?;
                writeln!(f, "  - Total DataStore keys: {}", summary.total_keys)?;
                writeln!(
                    f,
                    "  - Hot Keys: {}/{}",
                    summary.hot_keys, summary.max_hot_keys
                )?;
                if let Some(events) = summary.total_events {
                    writeln!(f, "  - EventBus events: {events}")?;
                }
                if summary.custom_types > 0 {
                    writeln!(f, "  - Custom types: {}", summary.custom_types)?;
                }
            }
        }
        Ok(())
    }
}
