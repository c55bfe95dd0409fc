//! # C++ Mapping
//!
//! Translation of schema types and default values into C++17 source text.
//!
//! | schema                    | C++                                  |
//! |---------------------------|--------------------------------------|
//! | `string`                  | `std::string`                        |
//! | `int32`, `uint64`, ...    | `int32_t`, `uint64_t`, ...           |
//! | `array<T, N>`             | `std::array<T', N>` (recursively)    |
//! | custom type               | the type name, unchanged             |
//! | anything unresolvable     | the text as written                  |

use ipcs_schema::{DataStoreKeySpec, DefaultValue, ResolvedType, ScalarCategory, ScalarType, TypeCatalog};

/// Zero-filled array literals are only spelled out up to this many scalar
/// elements; larger arrays are value-initialized with `{}`.
pub const ZERO_FILL_LIMIT: u64 = 1024;

/// C++ spelling of a resolved type.
pub fn cpp_type(ty: &ResolvedType) -> String {
    match ty {
        ResolvedType::Scalar(ScalarType::String) => "std::string".to_string(),
        ResolvedType::Scalar(scalar) => scalar.as_str().to_string(),
        ResolvedType::Array { element, count } => {
            format!("std::array<{}, {count}>", cpp_type(element))
        }
        ResolvedType::Custom { name, .. } => name.clone(),
    }
}

/// C++ spelling of a type string, passing unresolvable text through verbatim.
pub fn cpp_type_for(catalog: &TypeCatalog, text: &str) -> String {
    match catalog.resolve(text) {
        Ok(ty) => cpp_type(&ty),
        Err(_) => text.to_string(),
    }
}

/// The value a key or field takes when no default is declared.
pub fn zero_value(ty: &ResolvedType) -> String {
    match ty {
        ResolvedType::Scalar(scalar) => match scalar.category() {
            ScalarCategory::Integer => "0".to_string(),
            ScalarCategory::Floating => "0.0".to_string(),
            ScalarCategory::Boolean => "false".to_string(),
            ScalarCategory::Text => "\"\"".to_string(),
        },
        ResolvedType::Array { element, count } => {
            if scalar_elements(ty).is_some_and(|n| n <= ZERO_FILL_LIMIT) {
                let inner = zero_value(element);
                let items = vec![inner; usize::try_from(*count).unwrap_or(0)];
                format!("{{{}}}", items.join(", "))
            } else {
                "{}".to_string()
            }
        }
        ResolvedType::Custom { .. } => "{}".to_string(),
    }
}

/// Total scalar elements of a (possibly nested) array of scalars, or `None`
/// when a custom type is involved.
fn scalar_elements(ty: &ResolvedType) -> Option<u64> {
    match ty {
        ResolvedType::Scalar(_) => Some(1),
        ResolvedType::Array { element, count } => {
            scalar_elements(element).map(|n| n.saturating_mul(*count))
        }
        ResolvedType::Custom { .. } => None,
    }
}

/// C++ literal for an explicit default value.
pub fn literal(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Null => "{}".to_string(),
        DefaultValue::Bool(b) => b.to_string(),
        DefaultValue::Integer(i) => i.to_string(),
        DefaultValue::Unsigned(u) => u.to_string(),
        DefaultValue::Float(f) => float_literal(*f),
        DefaultValue::Text(s) => quote(s),
        DefaultValue::List(items) => braced(items.iter()),
        DefaultValue::Map(entries) => braced(entries.iter().map(|(_, v)| v)),
    }
}

fn braced<'a>(items: impl Iterator<Item = &'a DefaultValue>) -> String {
    let parts: Vec<String> = items.map(literal).collect();
    format!("{{{}}}", parts.join(", "))
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "std::numeric_limits<double>::quiet_NaN()".to_string()
    } else if f.is_infinite() {
        let sign = if f < 0.0 { "-" } else { "" };
        format!("{sign}std::numeric_limits<double>::infinity()")
    } else {
        // Debug keeps the decimal point: `1.0`, `0.1`, `1e-7`.
        format!("{f:?}")
    }
}

/// A C++ string literal. Control characters are written as octal escapes.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// The default literal for a key: the explicit default if declared,
/// otherwise the zero value of its type.
pub fn default_literal(key: &DataStoreKeySpec, catalog: &TypeCatalog) -> String {
    if let Some(value) = &key.default {
        return literal(value);
    }
    key.type_name
        .as_deref()
        .and_then(|text| catalog.resolve(text).ok())
        .map(|ty| zero_value(&ty))
        .unwrap_or_else(|| "{}".to_string())
}

/// Brace initializer for a declaration of type `ty` with value `literal`.
///
/// `std::array` needs an extra pair of braces around a braced list; scalars
/// and aggregates take the literal as-is.
pub fn initializer(ty: Option<&ResolvedType>, literal: &str) -> String {
    if literal == "{}" {
        return "{}".to_string();
    }
    let is_array = ty.is_some_and(ResolvedType::is_array);
    if literal.starts_with('{') && !is_array {
        literal.to_string()
    } else {
        format!("{{{literal}}}")
    }
}
