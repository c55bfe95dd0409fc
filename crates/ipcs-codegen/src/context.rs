//! # Template Contexts
//!
//! Flat, serializable views of an accepted schema. Every value a template
//! prints is computed here, so templates only arrange text. Optional values
//! serialize as `null` rather than being omitted, which keeps strict-mode
//! rendering happy.

use serde::Serialize;

use ipcs_core::{EventPriority, MAX_HOT_KEYS};
use ipcs_schema::{AcceptedSchema, DataStoreKeySpec, EventSpec, TypeCatalog};

use crate::cpp;

/// Stamped into every artifact.
pub const GENERATOR: &str = concat!("ipcs ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyView {
    pub name: String,
    /// Type as written in the schema.
    pub schema_type: String,
    pub cpp_type: String,
    /// Default literal, e.g. `{0, 0, 0, 0}`.
    pub default_value: String,
    /// Brace initializer for a declaration, e.g. `{{0, 0, 0, 0}}`.
    pub default_init: String,
    pub rt_read: bool,
    pub rt_write: bool,
    pub nonrt_read: bool,
    pub nonrt_write: bool,
    pub hot_key: bool,
    pub size_bytes: Option<u64>,
    pub description: Option<String>,
}

impl KeyView {
    pub fn new(key: &DataStoreKeySpec, catalog: &TypeCatalog) -> Self {
        let schema_type = key.type_name.clone().unwrap_or_default();
        let resolved = catalog.resolve(&schema_type).ok();
        let default_value = cpp::default_literal(key, catalog);
        let access = key.effective_access();
        Self {
            name: key.name.clone(),
            cpp_type: cpp::cpp_type_for(catalog, &schema_type),
            default_init: cpp::initializer(resolved.as_ref(), &default_value),
            default_value,
            schema_type,
            rt_read: access.rt_read,
            rt_write: access.rt_write,
            nonrt_read: access.nonrt_read,
            nonrt_write: access.nonrt_write,
            hot_key: key.hot_key,
            size_bytes: resolved.as_ref().map(|t| catalog.size_of(t)),
            description: key.description.as_deref().map(one_line),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub name: String,
    pub cpp_type: String,
    pub default_init: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    pub name: String,
    pub priority: &'static str,
    pub priority_ordinal: u8,
    /// `ttl_ms` as written, `None` when absent.
    pub ttl_ms: Option<String>,
    /// Constructor argument for `std::chrono::milliseconds`.
    pub ttl_init: String,
    pub coalescing: bool,
    pub description: Option<String>,
    pub fields: Vec<FieldView>,
}

impl EventView {
    pub fn new(event: &EventSpec, catalog: &TypeCatalog) -> Self {
        let priority = event.effective_priority();
        let ttl_ms = event.ttl_literal().map(str::to_string);
        let ttl_init = match ttl_ms.as_deref() {
            None => "0".to_string(),
            Some(lit) if lit.bytes().all(|b| b.is_ascii_digit()) => lit.to_string(),
            Some(lit) => format!("static_cast<std::chrono::milliseconds::rep>({lit})"),
        };
        let fields = event
            .fields
            .iter()
            .map(|field| {
                let resolved = catalog.resolve(&field.type_name).ok();
                let zero = resolved
                    .as_ref()
                    .map(cpp::zero_value)
                    .unwrap_or_else(|| "{}".to_string());
                FieldView {
                    name: field.name.clone(),
                    cpp_type: cpp::cpp_type_for(catalog, &field.type_name),
                    default_init: cpp::initializer(resolved.as_ref(), &zero),
                }
            })
            .collect();
        Self {
            name: event.name.clone(),
            priority: priority.as_str(),
            priority_ordinal: priority.ordinal(),
            ttl_ms,
            ttl_init,
            coalescing: event.coalescing,
            description: event.description.as_deref().map(one_line),
            fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityView {
    pub name: &'static str,
    pub ordinal: u8,
}

/// Context for `DataStoreKeys.h`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataStoreContext {
    pub generator: &'static str,
    pub schema_version: String,
    pub namespace: String,
    /// Custom types the header refers to but does not declare.
    pub custom_types: Vec<String>,
    pub keys: Vec<KeyView>,
    /// The `hot_key: true` subset of `keys`, in document order.
    pub hot_keys: Vec<KeyView>,
    pub hot_key_count: usize,
    pub max_hot_keys: usize,
}

impl DataStoreContext {
    pub fn build(schema: &AcceptedSchema, namespace: &str) -> Self {
        let doc = schema.document();
        let keys: Vec<KeyView> = doc
            .keys()
            .iter()
            .map(|k| KeyView::new(k, schema.catalog()))
            .collect();
        let hot_keys: Vec<KeyView> = keys.iter().filter(|k| k.hot_key).cloned().collect();
        Self {
            generator: GENERATOR,
            schema_version: schema.version().to_string(),
            namespace: namespace.to_string(),
            custom_types: doc.types.iter().map(|t| t.name.clone()).collect(),
            hot_key_count: hot_keys.len(),
            max_hot_keys: MAX_HOT_KEYS,
            keys,
            hot_keys,
        }
    }
}

/// Context for `EventBusEvents.h`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventContext {
    pub generator: &'static str,
    pub schema_version: String,
    pub namespace: String,
    pub custom_types: Vec<String>,
    pub priorities: Vec<PriorityView>,
    pub events: Vec<EventView>,
}

impl EventContext {
    pub fn build(schema: &AcceptedSchema, namespace: &str) -> Self {
        let doc = schema.document();
        Self {
            generator: GENERATOR,
            schema_version: schema.version().to_string(),
            namespace: namespace.to_string(),
            custom_types: doc.types.iter().map(|t| t.name.clone()).collect(),
            priorities: EventPriority::all()
                .iter()
                .map(|p| PriorityView {
                    name: p.as_str(),
                    ordinal: p.ordinal(),
                })
                .collect(),
            events: doc
                .events()
                .iter()
                .map(|e| EventView::new(e, schema.catalog()))
                .collect(),
        }
    }
}

/// Descriptions end up in `///` comments, which cannot span lines. A
/// trailing backslash would splice the next source line into the comment.
fn one_line(text: &str) -> String {
    let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
    joined.trim_end_matches(|c: char| c == '\\' || c.is_whitespace()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipcs_schema::{accept, parse};

    fn accepted(yaml: &str) -> AcceptedSchema {
        accept(parse(yaml).unwrap()).unwrap()
    }

    const DOC: &str = r#"
schema_version: "1.0.0"
types:
  Vector3d: { size: 24 }
datastore_keys:
  robot_position:
    type: Vector3d
    hot_key: true
    access: { rt_read: true, rt_write: true }
    description: |
      Cartesian position
      of the tool centre point
  gains:
    type: array<int32_t, 4>
  offsets:
    type: array<int32_t, 4>
    default: [1, 2, 3, 4]
eventbus_events:
  TaskStarted:
    fields: { task_id: string, axes: 'array<double, 2>' }
  Tick:
    priority: LOW
    ttl_ms: 2.5
"#;

    #[test]
    fn hot_keys_are_a_subset_in_order() {
        let ctx = DataStoreContext::build(&accepted(DOC), "ipc");
        assert_eq!(ctx.keys.len(), 3);
        assert_eq!(ctx.hot_key_count, 1);
        assert_eq!(ctx.hot_keys[0].name, "robot_position");
        assert_eq!(ctx.max_hot_keys, 32);
    }

    #[test]
    fn key_views_carry_cpp_details() {
        let ctx = DataStoreContext::build(&accepted(DOC), "ipc");
        let pos = &ctx.keys[0];
        assert_eq!(pos.cpp_type, "Vector3d");
        assert_eq!(pos.default_init, "{}");
        assert_eq!(pos.size_bytes, Some(24));
        assert_eq!(
            pos.description.as_deref(),
            Some("Cartesian position of the tool centre point")
        );
        assert_eq!(ctx.keys[1].default_value, "{0, 0, 0, 0}");
        assert_eq!(ctx.keys[1].default_init, "{{0, 0, 0, 0}}");
        assert_eq!(ctx.keys[2].default_value, "{1, 2, 3, 4}");
    }

    #[test]
    fn descriptions_never_end_in_a_backslash() {
        assert_eq!(one_line("Windows path like C:\\"), "Windows path like C:");
        assert_eq!(one_line("ends with \\ \\\n"), "ends with");
        assert_eq!(one_line("a \\ in the middle"), "a \\ in the middle");
    }

    #[test]
    fn event_views() {
        let ctx = EventContext::build(&accepted(DOC), "mxrc::ipc");
        let started = &ctx.events[0];
        assert_eq!(started.priority, "NORMAL");
        assert_eq!(started.ttl_init, "0");
        assert_eq!(started.fields[0].cpp_type, "std::string");
        assert_eq!(started.fields[0].default_init, "{\"\"}");
        assert_eq!(started.fields[1].default_init, "{{0.0, 0.0}}");

        let tick = &ctx.events[1];
        assert_eq!(tick.priority_ordinal, 0);
        assert_eq!(tick.ttl_ms.as_deref(), Some("2.5"));
        assert_eq!(
            tick.ttl_init,
            "static_cast<std::chrono::milliseconds::rep>(2.5)"
        );
        assert_eq!(ctx.priorities.len(), 4);
    }
}
