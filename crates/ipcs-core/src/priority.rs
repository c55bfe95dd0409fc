//! # Event Priority
//!
//! The four delivery priorities of the event bus. The ordinal values are part
//! of the generated `EventPriority` enum and must not be renumbered.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PriorityError;

/// Delivery priority of an event bus event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventPriority {
    /// Background traffic, dropped first under pressure.
    Low,
    /// Default priority.
    #[default]
    Normal,
    /// Delivered ahead of normal traffic.
    High,
    /// Safety-relevant; never coalesced or dropped.
    Critical,
}

impl EventPriority {
    /// All priorities in ascending order.
    pub fn all() -> &'static [EventPriority] {
        &[Self::Low, Self::Normal, Self::High, Self::Critical]
    }

    /// The identifier used in schema documents and generated code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// Numeric value of the generated C++ enumerator.
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Normal => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }
}

impl std::fmt::Display for EventPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventPriority {
    type Err = PriorityError;

    /// Case-sensitive: `"high"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "NORMAL" => Ok(Self::Normal),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(PriorityError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_parses_back() {
        for p in EventPriority::all() {
            assert_eq!(p.as_str().parse::<EventPriority>().unwrap(), *p);
        }
    }

    #[test]
    fn ordinals_are_ascending_from_zero() {
        let ordinals: Vec<u8> = EventPriority::all().iter().map(|p| p.ordinal()).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
    }

    #[test]
    fn lowercase_is_rejected() {
        assert!("high".parse::<EventPriority>().is_err());
        assert!("".parse::<EventPriority>().is_err());
        assert!("URGENT".parse::<EventPriority>().is_err());
    }

    #[test]
    fn default_is_normal() {
        assert_eq!(EventPriority::default(), EventPriority::Normal);
    }

    #[test]
    fn serde_uses_uppercase_names() {
        let json = serde_json::to_string(&EventPriority::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }
}
