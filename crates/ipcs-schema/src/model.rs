//! # Schema Model
//!
//! The typed, read-only representation of a schema document. Built once by
//! [`crate::parse`], then shared by the validators and the code emitter.
//!
//! Sections keep document order and keep duplicate names, so the uniqueness
//! validator can report every repeat. Field values the validators must judge
//! (priority text, `ttl_ms`, the `type` string) are stored as written rather
//! than rejected during parsing.

use ipcs_core::EventPriority;

/// A parsed schema document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDocument {
    /// Top-level `schema_version`. The canonical version field.
    pub schema_version: Option<String>,
    /// `schema.version`. Deprecated location of the version.
    pub legacy_version: Option<String>,
    /// C++ namespace for generated code, e.g. `mxrc::ipc`.
    pub namespace: Option<String>,
    /// Custom type declarations from `types`.
    pub types: Vec<CustomTypeDef>,
    /// `datastore_keys`; `None` when the section is missing.
    pub datastore_keys: Option<Vec<DataStoreKeySpec>>,
    /// `eventbus_events`; `None` when the section is missing.
    pub eventbus_events: Option<Vec<EventSpec>>,
}

impl SchemaDocument {
    /// Declared keys, empty when the section is missing.
    pub fn keys(&self) -> &[DataStoreKeySpec] {
        self.datastore_keys.as_deref().unwrap_or(&[])
    }

    /// Declared events, empty when the section is missing.
    pub fn events(&self) -> &[EventSpec] {
        self.eventbus_events.as_deref().unwrap_or(&[])
    }

    /// Keys flagged `hot_key: true`, in document order.
    pub fn hot_keys(&self) -> impl Iterator<Item = &DataStoreKeySpec> {
        self.keys().iter().filter(|k| k.hot_key)
    }

    pub fn hot_key_count(&self) -> usize {
        self.hot_keys().count()
    }
}

/// A custom type declared in the `types` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomTypeDef {
    pub name: String,
    /// Free-form kind such as `struct` or `enum`.
    pub kind: Option<String>,
    /// Size in bytes, if declared.
    pub size: Option<u64>,
    pub description: Option<String>,
}

/// Access permissions of a data store key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessSpec {
    pub rt_read: bool,
    pub rt_write: bool,
    pub nonrt_read: bool,
    pub nonrt_write: bool,
}

impl AccessSpec {
    /// A key writable from the real-time path must be readable from it.
    pub fn is_coherent(&self) -> bool {
        !self.rt_write || self.rt_read
    }
}

/// One entry of `datastore_keys`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataStoreKeySpec {
    pub name: String,
    /// The `type` string as written; `None` when missing.
    pub type_name: Option<String>,
    pub access: Option<AccessSpec>,
    pub hot_key: bool,
    /// Explicit `default` (or `default_value`).
    pub default: Option<DefaultValue>,
    pub description: Option<String>,
}

impl DataStoreKeySpec {
    /// Access flags, all `false` when no `access` block is present.
    pub fn effective_access(&self) -> AccessSpec {
        self.access.unwrap_or_default()
    }
}

/// An explicit default value, as written in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
    List(Vec<DefaultValue>),
    Map(Vec<(String, DefaultValue)>),
}

/// The `priority` field of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityField {
    Level(EventPriority),
    /// Anything that is not one of the four level names.
    Invalid(String),
}

/// The `ttl_ms` field of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum TtlField {
    /// A YAML number. `literal` keeps the spelling for code generation.
    Millis { value: f64, literal: String },
    /// A non-numeric value.
    Invalid(String),
}

/// A payload field of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub type_name: String,
}

/// One entry of `eventbus_events`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSpec {
    pub name: String,
    pub priority: Option<PriorityField>,
    pub ttl_ms: Option<TtlField>,
    /// Whether bursts of this event may be merged into one delivery.
    pub coalescing: bool,
    pub description: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl EventSpec {
    /// The declared priority, or `NORMAL` when absent or invalid.
    pub fn effective_priority(&self) -> EventPriority {
        match &self.priority {
            Some(PriorityField::Level(p)) => *p,
            Some(PriorityField::Invalid(_)) | None => EventPriority::default(),
        }
    }

    /// The TTL literal when a numeric `ttl_ms` is declared.
    pub fn ttl_literal(&self) -> Option<&str> {
        match &self.ttl_ms {
            Some(TtlField::Millis { literal, .. }) => Some(literal),
            Some(TtlField::Invalid(_)) | None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, hot: bool) -> DataStoreKeySpec {
        DataStoreKeySpec {
            name: name.to_string(),
            type_name: Some("double".to_string()),
            hot_key: hot,
            ..Default::default()
        }
    }

    #[test]
    fn access_coherence() {
        let ok = AccessSpec {
            rt_read: true,
            rt_write: true,
            ..Default::default()
        };
        let read_only = AccessSpec {
            rt_read: true,
            ..Default::default()
        };
        let write_only = AccessSpec {
            rt_write: true,
            ..Default::default()
        };
        assert!(ok.is_coherent());
        assert!(read_only.is_coherent());
        assert!(!write_only.is_coherent());
        assert!(AccessSpec::default().is_coherent());
    }

    #[test]
    fn hot_keys_keep_document_order() {
        let doc = SchemaDocument {
            datastore_keys: Some(vec![key("a", true), key("b", false), key("c", true)]),
            ..Default::default()
        };
        let names: Vec<&str> = doc.hot_keys().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(doc.hot_key_count(), 2);
    }

    #[test]
    fn missing_sections_read_as_empty() {
        let doc = SchemaDocument::default();
        assert!(doc.keys().is_empty());
        assert!(doc.events().is_empty());
    }

    #[test]
    fn effective_priority_defaults_to_normal() {
        let mut event = EventSpec {
            name: "TaskStarted".into(),
            ..Default::default()
        };
        assert_eq!(event.effective_priority(), EventPriority::Normal);
        event.priority = Some(PriorityField::Level(EventPriority::Critical));
        assert_eq!(event.effective_priority(), EventPriority::Critical);
    }
}
