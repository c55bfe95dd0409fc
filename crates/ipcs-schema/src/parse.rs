//! # Document Parsing
//!
//! Turns YAML text into a [`SchemaDocument`]. Parsing checks shape only:
//! sections must be mappings, flags must be booleans, and so on. Cross
//! references and field-level semantics are left to the validators.
//!
//! `serde_yaml::Mapping` rejects repeated keys, but the uniqueness validator
//! needs to see them. The document is therefore first read into a [`Node`]
//! tree whose mappings are plain entry lists in document order.

use std::fmt;
use std::path::Path;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use ipcs_core::{EventPriority, StructuralError};

use crate::model::{
    AccessSpec, CustomTypeDef, DataStoreKeySpec, DefaultValue, EventSpec, FieldSpec,
    PriorityField, SchemaDocument, TtlField,
};

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse a schema document from YAML (or JSON) text.
///
/// # Errors
///
/// Returns [`StructuralError`] if the text is not well-formed YAML, the root
/// or a section has the wrong shape, or no version is declared.
pub fn parse(text: &str) -> Result<SchemaDocument, StructuralError> {
    let root: Node =
        serde_yaml::from_str(text).map_err(|e| StructuralError::Malformed(e.to_string()))?;
    match root {
        Node::Map(entries) => build_document(entries),
        other => Err(StructuralError::Malformed(format!(
            "document root must be a mapping, found {}",
            other.kind()
        ))),
    }
}

/// Read and parse a schema document from disk.
///
/// # Errors
///
/// Returns [`StructuralError::Unreadable`] if the file cannot be read, or any
/// error [`parse`] returns.
pub fn load(path: &Path) -> Result<SchemaDocument, StructuralError> {
    let text = std::fs::read_to_string(path).map_err(|source| StructuralError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "read schema document");
    parse(&text)
}

// ---------------------------------------------------------------------------
// Raw YAML tree
// ---------------------------------------------------------------------------

/// A YAML node whose mappings keep every entry, repeats included.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Seq(Vec<Node>),
    Map(Vec<(Node, Node)>),
}

impl Node {
    fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "a boolean",
            Node::Int(_) | Node::UInt(_) | Node::Float(_) => "a number",
            Node::Str(_) => "a string",
            Node::Seq(_) => "a sequence",
            Node::Map(_) => "a mapping",
        }
    }

    /// Scalar text as it would appear in a message.
    fn text(&self) -> String {
        match self {
            Node::Null => "null".to_string(),
            Node::Bool(b) => b.to_string(),
            Node::Int(i) => i.to_string(),
            Node::UInt(u) => u.to_string(),
            Node::Float(f) => f.to_string(),
            Node::Str(s) => s.clone(),
            Node::Seq(_) => "[...]".to_string(),
            Node::Map(_) => "{...}".to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(match i64::try_from(v) {
            Ok(i) => Node::Int(i),
            Err(_) => Node::UInt(v),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::Str(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry()? {
            entries.push(entry);
        }
        Ok(Node::Map(entries))
    }
}

// ---------------------------------------------------------------------------
// Field access helpers
// ---------------------------------------------------------------------------

type Entries = Vec<(Node, Node)>;

/// Field lookup over one mapping. Repeated field names inside a single
/// mapping are rejected; repeated entry names in sections are not, since
/// sections are walked entry by entry.
struct Fields<'a> {
    path: String,
    entries: &'a [(Node, Node)],
}

impl<'a> Fields<'a> {
    fn new(path: impl Into<String>, entries: &'a [(Node, Node)]) -> Result<Self, StructuralError> {
        let path = path.into();
        for (i, (key, _)) in entries.iter().enumerate() {
            let repeated = entries[..i].iter().any(|(k, _)| k == key);
            if repeated {
                return Err(StructuralError::shape(
                    &path,
                    format!("field '{}' appears more than once", key.text()),
                ));
            }
        }
        Ok(Self { path, entries })
    }

    fn child(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path, name)
        }
    }

    /// The value of `name`, treating an explicit `null` as absent.
    fn get(&self, name: &str) -> Option<&'a Node> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, Node::Str(s) if s == name))
            .map(|(_, v)| v)
            .filter(|v| !matches!(v, Node::Null))
    }

    fn string(&self, name: &str) -> Result<Option<String>, StructuralError> {
        match self.get(name) {
            None => Ok(None),
            Some(Node::Str(s)) => Ok(Some(s.clone())),
            Some(other) => Err(StructuralError::shape(
                self.child(name),
                format!("expected a string, found {}", other.kind()),
            )),
        }
    }

    /// A scalar rendered as text. Used for version fields, where `1.0`
    /// written without quotes should still reach the version validator.
    fn scalar_text(&self, name: &str) -> Result<Option<String>, StructuralError> {
        match self.get(name) {
            None => Ok(None),
            Some(node @ (Node::Seq(_) | Node::Map(_))) => Err(StructuralError::shape(
                self.child(name),
                format!("expected a scalar, found {}", node.kind()),
            )),
            Some(node) => Ok(Some(node.text())),
        }
    }

    fn flag(&self, name: &str) -> Result<bool, StructuralError> {
        match self.get(name) {
            None => Ok(false),
            Some(Node::Bool(b)) => Ok(*b),
            Some(other) => Err(StructuralError::shape(
                self.child(name),
                format!("expected a boolean, found {}", other.kind()),
            )),
        }
    }

    fn mapping(&self, name: &str) -> Result<Option<&'a Entries>, StructuralError> {
        match self.get(name) {
            None => Ok(None),
            Some(Node::Map(entries)) => Ok(Some(entries)),
            Some(other) => Err(StructuralError::shape(
                self.child(name),
                format!("expected a mapping, found {}", other.kind()),
            )),
        }
    }
}

/// Walk the entries of a section, yielding `(name, fields)` per entry.
fn section_entries<'a>(
    section: &str,
    entries: &'a [(Node, Node)],
) -> Result<Vec<(String, Fields<'a>)>, StructuralError> {
    let mut out = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let name = match key {
            Node::Str(s) => s.clone(),
            Node::Int(_) | Node::UInt(_) | Node::Bool(_) | Node::Float(_) => key.text(),
            other => {
                return Err(StructuralError::shape(
                    section,
                    format!("entry names must be scalars, found {}", other.kind()),
                ))
            }
        };
        let path = format!("{section}.{name}");
        let fields = match value {
            Node::Map(body) => Fields::new(path, body)?,
            other => {
                return Err(StructuralError::shape(
                    path,
                    format!("expected a mapping, found {}", other.kind()),
                ))
            }
        };
        out.push((name, fields));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Document assembly
// ---------------------------------------------------------------------------

fn build_document(entries: Entries) -> Result<SchemaDocument, StructuralError> {
    let root = Fields::new("", &entries)?;

    let schema_version = root.scalar_text("schema_version")?;
    let legacy_version = match root.mapping("schema")? {
        Some(schema) => Fields::new("schema", schema)?.scalar_text("version")?,
        None => None,
    };
    if schema_version.is_none() && legacy_version.is_none() {
        return Err(StructuralError::MissingVersion);
    }

    let namespace = root.string("namespace")?;

    let types = match root.mapping("types")? {
        Some(section) => section_entries("types", section)?
            .into_iter()
            .map(|(name, fields)| build_type(name, &fields))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let datastore_keys = match root.mapping("datastore_keys")? {
        Some(section) => Some(
            section_entries("datastore_keys", section)?
                .into_iter()
                .map(|(name, fields)| build_key(name, &fields))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    let eventbus_events = match root.mapping("eventbus_events")? {
        Some(section) => Some(
            section_entries("eventbus_events", section)?
                .into_iter()
                .map(|(name, fields)| build_event(name, &fields))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };

    let doc = SchemaDocument {
        schema_version,
        legacy_version,
        namespace,
        types,
        datastore_keys,
        eventbus_events,
    };
    tracing::debug!(
        keys = doc.keys().len(),
        events = doc.events().len(),
        types = doc.types.len(),
        "parsed schema document"
    );
    Ok(doc)
}

fn build_type(name: String, fields: &Fields<'_>) -> Result<CustomTypeDef, StructuralError> {
    let size = match fields.get("size") {
        None => None,
        Some(Node::Int(n)) if *n > 0 => u64::try_from(*n).ok(),
        Some(Node::UInt(n)) => Some(*n),
        Some(other) => {
            return Err(StructuralError::shape(
                fields.child("size"),
                format!("expected a positive integer, found {}", other.text()),
            ))
        }
    };
    Ok(CustomTypeDef {
        name,
        kind: fields.string("kind")?,
        size,
        description: fields.string("description")?,
    })
}

fn build_key(name: String, fields: &Fields<'_>) -> Result<DataStoreKeySpec, StructuralError> {
    let access = match fields.mapping("access")? {
        Some(entries) => {
            let access = Fields::new(fields.child("access"), entries)?;
            Some(AccessSpec {
                rt_read: access.flag("rt_read")?,
                rt_write: access.flag("rt_write")?,
                nonrt_read: access.flag("nonrt_read")?,
                nonrt_write: access.flag("nonrt_write")?,
            })
        }
        None => None,
    };

    // `default_value` is an alias. A non-null `default` wins over it; a null
    // one does not hide it.
    let default = fields
        .get("default")
        .or_else(|| fields.get("default_value"))
        .map(default_value);

    Ok(DataStoreKeySpec {
        name,
        type_name: fields.string("type")?,
        access,
        hot_key: fields.flag("hot_key")?,
        default,
        description: fields.string("description")?,
    })
}

fn build_event(name: String, fields: &Fields<'_>) -> Result<EventSpec, StructuralError> {
    let priority = fields.get("priority").map(|node| match node {
        Node::Str(s) => match s.parse::<EventPriority>() {
            Ok(level) => PriorityField::Level(level),
            Err(_) => PriorityField::Invalid(s.clone()),
        },
        other => PriorityField::Invalid(other.text()),
    });

    let ttl_ms = fields.get("ttl_ms").map(|node| match node {
        Node::Int(i) => TtlField::Millis {
            value: *i as f64,
            literal: i.to_string(),
        },
        Node::UInt(u) => TtlField::Millis {
            value: *u as f64,
            literal: u.to_string(),
        },
        Node::Float(f) => TtlField::Millis {
            value: *f,
            literal: f.to_string(),
        },
        other => TtlField::Invalid(other.text()),
    });

    let payload = match fields.mapping("fields")? {
        Some(entries) => {
            let path = fields.child("fields");
            let payload = Fields::new(&path, entries)?;
            let mut out = Vec::with_capacity(entries.len());
            for (key, value) in payload.entries {
                let field_name = key.text();
                match value {
                    Node::Str(type_name) => out.push(FieldSpec {
                        name: field_name,
                        type_name: type_name.clone(),
                    }),
                    other => {
                        return Err(StructuralError::shape(
                            format!("{path}.{field_name}"),
                            format!("expected a type string, found {}", other.kind()),
                        ))
                    }
                }
            }
            out
        }
        None => Vec::new(),
    };

    Ok(EventSpec {
        name,
        priority,
        ttl_ms,
        coalescing: fields.flag("coalescing")?,
        description: fields.string("description")?,
        fields: payload,
    })
}

fn default_value(node: &Node) -> DefaultValue {
    match node {
        Node::Null => DefaultValue::Null,
        Node::Bool(b) => DefaultValue::Bool(*b),
        Node::Int(i) => DefaultValue::Integer(*i),
        Node::UInt(u) => DefaultValue::Unsigned(*u),
        Node::Float(f) => DefaultValue::Float(*f),
        Node::Str(s) => DefaultValue::Text(s.clone()),
        Node::Seq(items) => DefaultValue::List(items.iter().map(default_value).collect()),
        Node::Map(entries) => DefaultValue::Map(
            entries
                .iter()
                .map(|(k, v)| (k.text(), default_value(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
schema_version: "1.0.0"
namespace: mxrc::ipc
types:
  Vector3d:
    kind: struct
    size: 24
datastore_keys:
  robot_position:
    type: Vector3d
    access: { rt_read: true, rt_write: true }
    hot_key: true
    description: "Cartesian TCP position"
  ethercat_target_positions:
    type: array<double, 64>
    default_value: [0.0]
eventbus_events:
  RTDeadlineMissEvent:
    priority: CRITICAL
    ttl_ms: 5000
    fields:
      cycle_id: uint64_t
      overrun_us: double
"#;

    #[test]
    fn parses_minimal_document() {
        let doc = parse(MINIMAL).unwrap();
        assert_eq!(doc.schema_version.as_deref(), Some("1.0.0"));
        assert_eq!(doc.namespace.as_deref(), Some("mxrc::ipc"));
        assert_eq!(doc.types.len(), 1);
        assert_eq!(doc.types[0].size, Some(24));
        assert_eq!(doc.keys().len(), 2);

        let pos = &doc.keys()[0];
        assert_eq!(pos.type_name.as_deref(), Some("Vector3d"));
        assert!(pos.hot_key);
        assert!(pos.effective_access().rt_write);
        assert!(!pos.effective_access().nonrt_read);

        let arr = &doc.keys()[1];
        assert_eq!(
            arr.default,
            Some(DefaultValue::List(vec![DefaultValue::Float(0.0)]))
        );

        let ev = &doc.events()[0];
        assert_eq!(ev.effective_priority(), EventPriority::Critical);
        assert_eq!(ev.ttl_literal(), Some("5000"));
        assert_eq!(ev.fields.len(), 2);
        assert_eq!(ev.fields[1].type_name, "double");
    }

    #[test]
    fn keeps_duplicate_entry_names() {
        let doc = parse(
            "schema_version: '1.0.0'\ndatastore_keys:\n  a: {type: double}\n  a: {type: bool}\n",
        )
        .unwrap();
        assert_eq!(doc.keys().len(), 2);
        assert_eq!(doc.keys()[1].type_name.as_deref(), Some("bool"));
    }

    #[test]
    fn missing_sections_stay_none() {
        let doc = parse("schema_version: '1.0.0'\n").unwrap();
        assert!(doc.datastore_keys.is_none());
        assert!(doc.eventbus_events.is_none());

        let doc = parse("schema_version: '1.0.0'\ndatastore_keys:\n").unwrap();
        assert!(doc.datastore_keys.is_none());
    }

    #[test]
    fn unquoted_version_reaches_the_model_as_text() {
        let doc = parse("schema_version: 1.0\ndatastore_keys: {}\n").unwrap();
        assert_eq!(doc.schema_version.as_deref(), Some("1"));
    }

    #[test]
    fn legacy_version_location() {
        let doc = parse("schema:\n  version: '1.0.0'\ndatastore_keys: {}\n").unwrap();
        assert_eq!(doc.schema_version, None);
        assert_eq!(doc.legacy_version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn no_version_anywhere_is_structural() {
        assert!(matches!(
            parse("datastore_keys: {}\n"),
            Err(StructuralError::MissingVersion)
        ));
    }

    #[test]
    fn malformed_yaml_and_non_mapping_root() {
        assert!(matches!(
            parse("datastore_keys: [unclosed"),
            Err(StructuralError::Malformed(_))
        ));
        assert!(matches!(
            parse("- just\n- a list\n"),
            Err(StructuralError::Malformed(_))
        ));
    }

    #[test]
    fn wrong_shapes_name_the_path() {
        let err = parse("schema_version: '1.0.0'\ndatastore_keys:\n  k:\n    type: double\n    hot_key: yes please\n")
            .unwrap_err();
        match err {
            StructuralError::Shape { path, .. } => assert_eq!(path, "datastore_keys.k.hot_key"),
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            parse("schema_version: '1.0.0'\ndatastore_keys: [a, b]\n"),
            Err(StructuralError::Shape { .. })
        ));
        assert!(matches!(
            parse("schema_version: '1.0.0'\ndatastore_keys:\n  k: double\n"),
            Err(StructuralError::Shape { .. })
        ));
        assert!(matches!(
            parse("schema_version: '1.0.0'\ntypes:\n  T: { size: -4 }\n"),
            Err(StructuralError::Shape { .. })
        ));
        assert!(matches!(
            parse("schema_version: '1.0.0'\ndatastore_keys:\n  k: { type: 3 }\n"),
            Err(StructuralError::Shape { .. })
        ));
    }

    #[test]
    fn bad_priority_and_ttl_are_kept_for_validation() {
        let doc = parse(
            "schema_version: '1.0.0'\ndatastore_keys: {}\neventbus_events:\n  E:\n    priority: URGENT\n    ttl_ms: soon\n",
        )
        .unwrap();
        let ev = &doc.events()[0];
        assert_eq!(ev.priority, Some(PriorityField::Invalid("URGENT".into())));
        assert_eq!(ev.ttl_ms, Some(TtlField::Invalid("soon".into())));
    }

    #[test]
    fn null_ttl_counts_as_absent() {
        let doc = parse(
            "schema_version: '1.0.0'\ndatastore_keys: {}\neventbus_events:\n  E: { ttl_ms: null }\n",
        )
        .unwrap();
        assert_eq!(doc.events()[0].ttl_ms, None);
    }

    #[test]
    fn default_alias_resolution() {
        let keys = |yaml: &str| parse(yaml).unwrap().keys()[0].default.clone();
        assert_eq!(
            keys("schema_version: '1.0.0'\ndatastore_keys:\n  k: { type: int32_t, default: null, default_value: 7 }\n"),
            Some(DefaultValue::Integer(7))
        );
        assert_eq!(
            keys("schema_version: '1.0.0'\ndatastore_keys:\n  k: { type: int32_t, default: 3, default_value: 7 }\n"),
            Some(DefaultValue::Integer(3))
        );
        assert_eq!(
            keys("schema_version: '1.0.0'\ndatastore_keys:\n  k: { type: int32_t, default: null }\n"),
            None
        );
    }

    #[test]
    fn missing_type_is_not_structural() {
        let doc = parse("schema_version: '1.0.0'\ndatastore_keys:\n  k: { hot_key: true }\n").unwrap();
        assert_eq!(doc.keys()[0].type_name, None);
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipc-schema.yaml");
        std::fs::write(&path, MINIMAL).unwrap();
        let doc = load(&path).unwrap();
        assert_eq!(doc, parse(MINIMAL).unwrap());
    }

    #[test]
    fn load_reports_unreadable_path() {
        let err = load(Path::new("/nonexistent/ipc-schema.yaml")).unwrap_err();
        assert!(matches!(err, StructuralError::Unreadable { .. }));
    }
}
