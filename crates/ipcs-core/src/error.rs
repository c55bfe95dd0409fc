//! # Error Types
//!
//! Structural errors abort a run before validation starts. Semantic defects
//! are never represented here: they are collected as diagnostics by
//! `ipcs-schema` so that one run reports every problem in a document.

use thiserror::Error;

/// The schema document could not be turned into a model.
#[derive(Error, Debug)]
pub enum StructuralError {
    /// The document file could not be read.
    #[error("failed to read schema document {path}: {source}")]
    Unreadable {
        /// Path that was being read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The input is not well-formed YAML, or its root is not a mapping.
    #[error("schema document is not well-formed: {0}")]
    Malformed(String),

    /// A section or field has the wrong shape.
    #[error("invalid structure at '{path}': {message}")]
    Shape {
        /// Dotted path to the offending node, e.g. `datastore_keys.robot_mode.access`.
        path: String,
        /// What was expected at that location.
        message: String,
    },

    /// Neither `schema_version` nor `schema.version` is present.
    #[error("schema document declares no version (expected 'schema_version' or 'schema.version')")]
    MissingVersion,
}

impl StructuralError {
    /// Shorthand for a [`StructuralError::Shape`] at `path`.
    pub fn shape(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A version string that is not `MAJOR.MINOR.PATCH`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version '{0}' (expected: MAJOR.MINOR.PATCH, e.g., 1.0.0)")]
pub struct VersionError(pub String);

/// A priority string outside the four supported levels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown event priority '{0}' (expected one of LOW, NORMAL, HIGH, CRITICAL)")]
pub struct PriorityError(pub String);
