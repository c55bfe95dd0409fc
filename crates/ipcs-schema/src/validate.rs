//! # Constraint Validators
//!
//! Each rule is a pure function from the document and its type catalog to a
//! set of [`Diagnostics`]. All rules run on every document, in the order of
//! [`VALIDATORS`], so one run reports every defect.
//!
//! A document that passes is wrapped in an [`AcceptedSchema`], which is the
//! only input the code emitter takes.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use ipcs_core::ident::{
    constant_case, is_cpp_keyword, is_identifier, is_namespace_path, pascal_case,
};
use ipcs_core::{SchemaVersion, MAX_HOT_KEYS, MAX_HOT_KEY_SIZE_BYTES};

use crate::catalog::{ResolvedType, ScalarCategory, ScalarType, TypeCatalog};
use crate::diagnostics::{Diagnostics, Rule, Summary, ValidationReport};
use crate::model::{DefaultValue, PriorityField, SchemaDocument, TtlField};

/// Signature shared by every rule.
pub type Validator = fn(&SchemaDocument, &TypeCatalog) -> Diagnostics;

/// Every rule, in invocation order.
pub const VALIDATORS: &[(Rule, Validator)] = &[
    (Rule::Version, check_version),
    (Rule::Sections, check_sections),
    (Rule::Names, check_names),
    (Rule::Types, check_types),
    (Rule::Access, check_access),
    (Rule::Events, check_events),
    (Rule::HotKeys, check_hot_keys),
    (Rule::Defaults, check_defaults),
];

/// Validate a document against the catalog built from its own `types`.
pub fn validate(doc: &SchemaDocument) -> ValidationReport {
    validate_with(doc, &TypeCatalog::from_document(doc))
}

/// Validate a document against an explicit catalog.
pub fn validate_with(doc: &SchemaDocument, catalog: &TypeCatalog) -> ValidationReport {
    let mut diagnostics = Diagnostics::new();
    for (rule, check) in VALIDATORS {
        let found = check(doc, catalog);
        tracing::debug!(
            rule = %rule,
            errors = found.errors().len(),
            warnings = found.warnings().len(),
            "validator finished"
        );
        diagnostics.merge(found);
    }
    ValidationReport::new(diagnostics, Summary::of(doc))
}

// ---------------------------------------------------------------------------
// Accepted schemas
// ---------------------------------------------------------------------------

/// A document that passed every validator.
///
/// Only [`accept`] constructs this type, so holding one proves the document
/// is internally consistent.
#[derive(Debug, Clone)]
pub struct AcceptedSchema {
    document: SchemaDocument,
    catalog: TypeCatalog,
    report: ValidationReport,
    version: String,
}

impl AcceptedSchema {
    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// The passing report, warnings included.
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// The canonical `schema_version` text.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// The document failed validation. Carries the full report.
#[derive(Error, Debug, Clone)]
#[error("schema rejected with {} error(s)", .0.errors.len())]
pub struct Rejected(pub ValidationReport);

/// Validate `doc` and, if it passes, wrap it for emission.
///
/// # Errors
///
/// Returns [`Rejected`] with the failing report if any validator recorded an
/// error.
pub fn accept(doc: SchemaDocument) -> Result<AcceptedSchema, Rejected> {
    let catalog = TypeCatalog::from_document(&doc);
    let report = validate_with(&doc, &catalog);
    if !report.accepted {
        tracing::warn!(errors = report.errors.len(), "schema rejected");
        return Err(Rejected(report));
    }
    // The version rule rejects documents without `schema_version`.
    let version = doc.schema_version.clone().unwrap_or_default();
    Ok(AcceptedSchema {
        document: doc,
        catalog,
        report,
        version,
    })
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// `schema_version` must be `MAJOR.MINOR.PATCH`; MAJOR other than 1 warns.
/// The legacy `schema.version` warns, and must agree when both are present.
pub fn check_version(doc: &SchemaDocument, _catalog: &TypeCatalog) -> Diagnostics {
    let mut d = Diagnostics::new();
    match doc.schema_version.as_deref() {
        None => d.error(Rule::Version, "Missing 'schema_version' field in schema"),
        Some(text) => match SchemaVersion::parse(text) {
            Err(_) => d.error(
                Rule::Version,
                format!(
                    "Invalid schema_version format: '{text}' (expected: MAJOR.MINOR.PATCH, e.g., 1.0.0)"
                ),
            ),
            Ok(version) if !version.is_supported_major() => d.warning(
                Rule::Version,
                format!(
                    "Schema version {text} uses MAJOR version {}. Only version 1.x.x is currently tested.",
                    version.major
                ),
            ),
            Ok(_) => {}
        },
    }

    if let Some(legacy) = doc.legacy_version.as_deref() {
        d.warning(
            Rule::Version,
            "'schema.version' is deprecated; declare the version as top-level 'schema_version'",
        );
        if let Some(canonical) = doc.schema_version.as_deref() {
            if canonical != legacy {
                d.error(
                    Rule::Version,
                    format!(
                        "Conflicting schema versions: schema_version '{canonical}' differs from schema.version '{legacy}'"
                    ),
                );
            }
        }
    }
    d
}

/// `datastore_keys` is required; `eventbus_events` is optional.
pub fn check_sections(doc: &SchemaDocument, _catalog: &TypeCatalog) -> Diagnostics {
    let mut d = Diagnostics::new();
    if doc.datastore_keys.is_none() {
        d.error(Rule::Sections, "Missing 'datastore_keys' section in schema");
    }
    if doc.eventbus_events.is_none() {
        d.warning(Rule::Sections, "Missing 'eventbus_events' section (optional)");
    }
    d
}

/// Members every generated event struct declares.
const RESERVED_EVENT_MEMBERS: &[&str] = &["NAME", "PRIORITY", "TTL", "COALESCING"];

/// Types declared next to the event structs.
const RESERVED_EVENT_NAMES: &[&str] = &["EventPriority"];

/// Uniqueness and identifier shape of every name that reaches generated code.
pub fn check_names(doc: &SchemaDocument, _catalog: &TypeCatalog) -> Diagnostics {
    let mut d = Diagnostics::new();

    report_duplicates(&mut d, "key", doc.keys().iter().map(|k| k.name.as_str()));
    report_duplicates(&mut d, "event", doc.events().iter().map(|e| e.name.as_str()));
    report_duplicates(&mut d, "type", doc.types.iter().map(|t| t.name.as_str()));

    for key in doc.keys() {
        if !is_identifier(&key.name) {
            d.error(Rule::Names, format!("Invalid key name '{}': not a C identifier", key.name));
        }
    }
    for event in doc.events() {
        if !is_identifier(&event.name) {
            d.error(
                Rule::Names,
                format!("Invalid event name '{}': not a C identifier", event.name),
            );
        } else if is_cpp_keyword(&event.name) || RESERVED_EVENT_NAMES.contains(&event.name.as_str()) {
            d.error(
                Rule::Names,
                format!("Invalid event name '{}': reserved in generated code", event.name),
            );
        }
        for field in &event.fields {
            if !is_identifier(&field.name) {
                d.error(
                    Rule::Names,
                    format!(
                        "Invalid field name '{}' in event '{}': not a C identifier",
                        field.name, event.name
                    ),
                );
            } else if is_cpp_keyword(&field.name)
                || RESERVED_EVENT_MEMBERS.contains(&field.name.as_str())
            {
                d.error(
                    Rule::Names,
                    format!(
                        "Invalid field name '{}' in event '{}': reserved in generated code",
                        field.name, event.name
                    ),
                );
            }
        }
    }
    for def in &doc.types {
        let scalar = ScalarType::from_name(&def.name);
        if !is_identifier(&def.name) {
            d.error(
                Rule::Names,
                format!("Invalid type name '{}': not a C identifier", def.name),
            );
        } else if scalar.is_none() && is_cpp_keyword(&def.name) {
            d.error(
                Rule::Names,
                format!("Invalid type name '{}': reserved in generated code", def.name),
            );
        }
        if let Some(scalar) = scalar {
            d.warning(
                Rule::Names,
                format!(
                    "Custom type '{}' shadows built-in type '{scalar}' and is never used",
                    def.name
                ),
            );
        }
    }

    if let Some(ns) = doc.namespace.as_deref() {
        if !is_namespace_path(ns) {
            d.error(
                Rule::Names,
                format!("Invalid namespace '{ns}': expected identifiers joined by '::'"),
            );
        }
    }

    // Distinct key names must still map to distinct generated identifiers.
    report_collisions(&mut d, "constant", doc.keys().iter().map(|k| k.name.as_str()), constant_case);
    report_collisions(&mut d, "traits struct", doc.keys().iter().map(|k| k.name.as_str()), pascal_case);
    d
}

fn report_duplicates<'a>(d: &mut Diagnostics, kind: &str, names: impl Iterator<Item = &'a str>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for name in names {
        let count = seen.entry(name).or_insert(0);
        *count += 1;
        if *count > 1 {
            d.error(
                Rule::Names,
                format!("Duplicate {kind} name: {name} (occurrence {count})"),
            );
        }
    }
}

fn report_collisions<'a>(
    d: &mut Diagnostics,
    what: &str,
    names: impl Iterator<Item = &'a str>,
    generate: fn(&str) -> String,
) {
    let mut owners: BTreeMap<String, &str> = BTreeMap::new();
    for name in names {
        let generated = generate(name);
        match owners.get(&generated) {
            Some(first) if *first != name => d.error(
                Rule::Names,
                format!("Key names '{first}' and '{name}' both generate {what} '{generated}'"),
            ),
            Some(_) => {}
            None => {
                owners.insert(generated, name);
            }
        }
    }
}

/// Every key type, array element type and event field type must resolve.
pub fn check_types(doc: &SchemaDocument, catalog: &TypeCatalog) -> Diagnostics {
    let mut d = Diagnostics::new();
    for key in doc.keys() {
        match key.type_name.as_deref() {
            None => d.error(Rule::Types, format!("Missing 'type' for key: {}", key.name)),
            Some(text) => {
                if let Err(reason) = catalog.resolve(text) {
                    d.error(Rule::Types, format!("{reason} for key: {}", key.name));
                }
            }
        }
    }
    for event in doc.events() {
        for field in &event.fields {
            if let Err(reason) = catalog.resolve(&field.type_name) {
                d.error(
                    Rule::Types,
                    format!("{reason} for field '{}' of event: {}", field.name, event.name),
                );
            }
        }
    }
    d
}

/// A key writable from the real-time path must be readable from it.
pub fn check_access(doc: &SchemaDocument, _catalog: &TypeCatalog) -> Diagnostics {
    let mut d = Diagnostics::new();
    for key in doc.keys() {
        if !key.effective_access().is_coherent() {
            d.error(
                Rule::Access,
                format!(
                    "Inconsistent access for key '{}': rt_write=true requires rt_read=true",
                    key.name
                ),
            );
        }
    }
    d
}

/// Priority must be one of the four levels; `ttl_ms` must be positive.
pub fn check_events(doc: &SchemaDocument, _catalog: &TypeCatalog) -> Diagnostics {
    let mut d = Diagnostics::new();
    for event in doc.events() {
        if let Some(PriorityField::Invalid(text)) = &event.priority {
            d.error(
                Rule::Events,
                format!("Invalid priority '{text}' for event: {}", event.name),
            );
        }
        match &event.ttl_ms {
            None => {}
            Some(TtlField::Millis { value, .. }) if value.is_finite() && *value > 0.0 => {
                if value.fract() != 0.0 {
                    d.warning(
                        Rule::Events,
                        format!(
                            "Fractional ttl_ms for event: {} is truncated to whole milliseconds",
                            event.name
                        ),
                    );
                }
            }
            Some(_) => d.error(
                Rule::Events,
                format!("Invalid ttl_ms for event: {} (must be positive)", event.name),
            ),
        }
    }
    d
}

/// At most [`MAX_HOT_KEYS`] hot keys, each at most [`MAX_HOT_KEY_SIZE_BYTES`].
pub fn check_hot_keys(doc: &SchemaDocument, catalog: &TypeCatalog) -> Diagnostics {
    let mut d = Diagnostics::new();
    let count = doc.hot_key_count();
    if count > MAX_HOT_KEYS {
        d.error(
            Rule::HotKeys,
            format!("Too many hot keys: {count} (max: {MAX_HOT_KEYS})"),
        );
    }
    for key in doc.hot_keys() {
        // Unresolvable types are reported by the types rule.
        let Some(resolved) = key.type_name.as_deref().and_then(|t| catalog.resolve(t).ok()) else {
            continue;
        };
        let size = catalog.size_of(&resolved);
        if size > MAX_HOT_KEY_SIZE_BYTES {
            d.error(
                Rule::HotKeys,
                format!(
                    "Hot key '{}' too large: {size} bytes (max: {MAX_HOT_KEY_SIZE_BYTES})",
                    key.name
                ),
            );
        }
    }
    d
}

/// Explicit defaults must be valid initializers for the declared type.
///
/// A value the type cannot hold (wrong kind, out of range, too many array
/// elements) is an error. A short array default or a list for a custom type
/// compiles but is probably unintended, and warns.
pub fn check_defaults(doc: &SchemaDocument, catalog: &TypeCatalog) -> Diagnostics {
    let mut d = Diagnostics::new();
    for key in doc.keys() {
        let (Some(default), Some(text)) = (&key.default, key.type_name.as_deref()) else {
            continue;
        };
        let Ok(resolved) = catalog.resolve(text) else {
            continue;
        };
        check_default(&mut d, &key.name, &resolved, default);
    }
    d
}

fn check_default(d: &mut Diagnostics, key: &str, ty: &ResolvedType, default: &DefaultValue) {
    match (ty, default) {
        (_, DefaultValue::Null) => {}
        (ResolvedType::Array { element, count }, DefaultValue::List(items)) => {
            let message = format!(
                "Default for key '{key}' has {} element(s) but type {ty} declares {count}",
                items.len()
            );
            match (items.len() as u64).cmp(count) {
                Ordering::Greater => d.error(Rule::Defaults, message),
                Ordering::Less => d.warning(Rule::Defaults, message),
                Ordering::Equal => {}
            }
            for item in items {
                check_default(d, key, element, item);
            }
        }
        // Brace elision: a lone value initializes the first element.
        (ResolvedType::Array { element, .. }, value) => check_default(d, key, element, value),
        (ResolvedType::Custom { .. }, DefaultValue::List(_)) => d.warning(
            Rule::Defaults,
            format!("List default for non-array key '{key}' (type {ty})"),
        ),
        (ResolvedType::Custom { .. }, _) => {}
        (ResolvedType::Scalar(_), DefaultValue::List(_)) => d.error(
            Rule::Defaults,
            format!("List default for non-array key '{key}' (type {ty})"),
        ),
        (ResolvedType::Scalar(scalar), value) => {
            if let Some(reason) = scalar_mismatch(*scalar, value) {
                d.error(
                    Rule::Defaults,
                    format!("Invalid default for key '{key}': {reason}"),
                );
            }
        }
    }
}

/// Why `value` cannot initialize a `scalar`, if it cannot.
fn scalar_mismatch(scalar: ScalarType, value: &DefaultValue) -> Option<String> {
    let integer = match value {
        DefaultValue::Integer(i) => Some(i128::from(*i)),
        DefaultValue::Unsigned(u) => Some(i128::from(*u)),
        _ => None,
    };
    match (scalar.category(), value, integer) {
        (_, DefaultValue::Null, _) => None,
        (ScalarCategory::Integer, _, Some(v)) => {
            let (min, max) = scalar.integer_bounds()?;
            (v < min || v > max).then(|| format!("{v} is out of range for {scalar}"))
        }
        (ScalarCategory::Floating, DefaultValue::Float(f), _) => {
            let too_large =
                scalar == ScalarType::Float && f.is_finite() && f.abs() > f64::from(f32::MAX);
            too_large.then(|| format!("{f} is out of range for {scalar}"))
        }
        (ScalarCategory::Floating, _, Some(v)) => {
            let exact = match scalar {
                ScalarType::Float => (v as f32) as i128 == v,
                _ => (v as f64) as i128 == v,
            };
            (!exact).then(|| format!("{v} is not exactly representable as {scalar}"))
        }
        (ScalarCategory::Boolean, DefaultValue::Bool(_), _) => None,
        (ScalarCategory::Text, DefaultValue::Text(_), _) => None,
        (category, value, _) => Some(format!(
            "expected {} for {scalar}, found {}",
            expected_kind(category),
            value_kind(value)
        )),
    }
}

fn expected_kind(category: ScalarCategory) -> &'static str {
    match category {
        ScalarCategory::Integer => "an integer",
        ScalarCategory::Floating => "a number",
        ScalarCategory::Boolean => "a boolean",
        ScalarCategory::Text => "a string",
    }
}

fn value_kind(value: &DefaultValue) -> &'static str {
    match value {
        DefaultValue::Null => "null",
        DefaultValue::Bool(_) => "a boolean",
        DefaultValue::Integer(_) | DefaultValue::Unsigned(_) => "an integer",
        DefaultValue::Float(_) => "a floating-point number",
        DefaultValue::Text(_) => "a string",
        DefaultValue::List(_) => "a list",
        DefaultValue::Map(_) => "a mapping",
    }
}
