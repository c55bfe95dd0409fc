//! # Schema Version
//!
//! `MAJOR.MINOR.PATCH` with non-negative decimal components and nothing else:
//! no `v` prefix, no pre-release or build suffix, no surrounding whitespace.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::VersionError;
use crate::limits::SUPPORTED_MAJOR_VERSION;

/// A parsed semantic version of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Incompatible contract changes.
    pub major: u64,
    /// Backward-compatible additions.
    pub minor: u64,
    /// Fixes that do not change the contract.
    pub patch: u64,
}

impl SchemaVersion {
    /// Parse a `MAJOR.MINOR.PATCH` string.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError`] if the string does not have exactly three
    /// dot-separated components made only of ASCII digits, or if a component
    /// overflows `u64`.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let malformed = || VersionError(s.to_string());
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(malformed());
        }
        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            *slot = part.parse().map_err(|_| malformed())?;
        }
        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
        })
    }

    /// Whether the MAJOR component is the one the toolchain is tested against.
    pub fn is_supported_major(&self) -> bool {
        self.major == SUPPORTED_MAJOR_VERSION
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
