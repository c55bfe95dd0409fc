//! # Type Catalog
//!
//! Resolves the type strings used in a schema document. Three kinds of type
//! exist:
//!
//! - **Scalars** from a closed set with fixed sizes (`string` is budgeted at
//!   [`STRING_SIZE_ESTIMATE`] bytes).
//! - **Arrays** written `array<ELEMENT, COUNT>`, where `ELEMENT` is itself any
//!   resolvable type and `COUNT` is a positive integer literal.
//! - **Custom types** declared in the document's `types` section.
//!
//! Type strings are parsed once into a [`TypeExpr`] by a small recursive-descent
//! parser over the grammar
//!
//! ```text
//! TYPE  := SCALAR | "array" "<" TYPE "," COUNT ">" | IDENT
//! COUNT := [0-9]+            (value > 0)
//! IDENT := [A-Za-z_][A-Za-z0-9_]*
//! ```
//!
//! and then resolved against the catalog into a [`ResolvedType`]. A type that
//! does not resolve is reported as [`Unresolved`]; whether that is an error is
//! up to the caller.

use std::collections::BTreeMap;

use thiserror::Error;

use ipcs_core::{CUSTOM_TYPE_SIZE_ESTIMATE, STRING_SIZE_ESTIMATE};

use crate::model::SchemaDocument;

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    Bool,
    String,
}

/// Families of scalars that share a zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarCategory {
    Integer,
    Floating,
    Boolean,
    Text,
}

impl ScalarType {
    /// All scalar types in declaration order.
    pub fn all() -> &'static [ScalarType] {
        &[
            Self::Int32,
            Self::UInt32,
            Self::Int64,
            Self::UInt64,
            Self::Float,
            Self::Double,
            Self::Bool,
            Self::String,
        ]
    }

    /// Look up a scalar by name. The short integer spellings (`int32`,
    /// `uint64`, ...) are aliases of the fixed-width `_t` names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int32_t" | "int32" => Some(Self::Int32),
            "uint32_t" | "uint32" => Some(Self::UInt32),
            "int64_t" | "int64" => Some(Self::Int64),
            "uint64_t" | "uint64" => Some(Self::UInt64),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "bool" => Some(Self::Bool),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// Canonical schema spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int32 => "int32_t",
            Self::UInt32 => "uint32_t",
            Self::Int64 => "int64_t",
            Self::UInt64 => "uint64_t",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::String => "string",
        }
    }

    /// Size in bytes used for budgeting.
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::Int32 | Self::UInt32 | Self::Float => 4,
            Self::Int64 | Self::UInt64 | Self::Double => 8,
            Self::Bool => 1,
            Self::String => STRING_SIZE_ESTIMATE,
        }
    }

    /// Inclusive value range of the integer scalars.
    pub fn integer_bounds(&self) -> Option<(i128, i128)> {
        match self {
            Self::Int32 => Some((i32::MIN.into(), i32::MAX.into())),
            Self::UInt32 => Some((0, u32::MAX.into())),
            Self::Int64 => Some((i64::MIN.into(), i64::MAX.into())),
            Self::UInt64 => Some((0, u64::MAX.into())),
            Self::Float | Self::Double | Self::Bool | Self::String => None,
        }
    }

    pub fn category(&self) -> ScalarCategory {
        match self {
            Self::Int32 | Self::UInt32 | Self::Int64 | Self::UInt64 => ScalarCategory::Integer,
            Self::Float | Self::Double => ScalarCategory::Floating,
            Self::Bool => ScalarCategory::Boolean,
            Self::String => ScalarCategory::Text,
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Type expressions
// ---------------------------------------------------------------------------

/// Syntax tree of a type string, before name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A bare identifier: scalar or custom type name.
    Named(String),
    /// `array<element, count>`.
    Array { element: Box<TypeExpr>, count: u64 },
}

/// A type string that does not match the grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeSyntaxError {
    #[error("empty type")]
    Empty,

    #[error("expected {expected} at offset {offset}")]
    Expected {
        expected: &'static str,
        offset: usize,
    },

    #[error("array count '{0}' is not a positive integer")]
    BadCount(String),

    #[error("unexpected input at offset {0}")]
    Trailing(usize),
}

impl TypeExpr {
    /// Parse a type string.
    pub fn parse(text: &str) -> Result<Self, TypeSyntaxError> {
        let mut parser = Parser { src: text.as_bytes(), pos: 0 };
        parser.skip_ws();
        if parser.at_end() {
            return Err(TypeSyntaxError::Empty);
        }
        let expr = parser.parse_type()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(TypeSyntaxError::Trailing(parser.pos));
        }
        Ok(expr)
    }
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), TypeSyntaxError> {
        self.skip_ws();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(TypeSyntaxError::Expected {
                expected,
                offset: self.pos,
            })
        }
    }

    fn ident(&mut self) -> Result<&str, TypeSyntaxError> {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            _ => {
                return Err(TypeSyntaxError::Expected {
                    expected: "a type name",
                    offset: start,
                })
            }
        }
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        // Only ASCII bytes were consumed, so the slice is valid UTF-8.
        std::str::from_utf8(&self.src[start..self.pos]).map_err(|_| TypeSyntaxError::Expected {
            expected: "a type name",
            offset: start,
        })
    }

    fn count(&mut self) -> Result<u64, TypeSyntaxError> {
        self.skip_ws();
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(TypeSyntaxError::Expected {
                expected: "an element count",
                offset: start,
            });
        }
        let digits = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        match digits.parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(TypeSyntaxError::BadCount(digits)),
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, TypeSyntaxError> {
        let name = self.ident()?.to_string();
        self.skip_ws();
        if name == "array" && self.peek() == Some(b'<') {
            self.expect(b'<', "'<'")?;
            let element = self.parse_type()?;
            self.expect(b',', "','")?;
            let count = self.count()?;
            self.expect(b'>', "'>'")?;
            return Ok(TypeExpr::Array {
                element: Box::new(element),
                count,
            });
        }
        Ok(TypeExpr::Named(name))
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A fully resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Scalar(ScalarType),
    Array {
        element: Box<ResolvedType>,
        count: u64,
    },
    Custom {
        name: String,
        /// Size declared by the document, if any.
        size: Option<u64>,
    },
}

impl ResolvedType {
    /// Size in bytes used for budgeting. Array sizes saturate rather than
    /// overflow.
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::Scalar(s) => s.size_bytes(),
            Self::Array { element, count } => element.size_bytes().saturating_mul(*count),
            Self::Custom { size, .. } => size.unwrap_or(CUSTOM_TYPE_SIZE_ESTIMATE),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array { .. })
    }
}

impl std::fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Array { element, count } => write!(f, "array<{element}, {count}>"),
            Self::Custom { name, .. } => f.write_str(name),
        }
    }
}

/// Why a type string did not resolve.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    #[error("Malformed type '{text}' ({error})")]
    Syntax {
        text: String,
        error: TypeSyntaxError,
    },

    #[error("Unknown type '{0}'")]
    UnknownType(String),

    #[error("Invalid array element type '{0}'")]
    UnknownElement(String),
}

/// Registry of the types a document may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCatalog {
    /// Custom type name → declared size.
    custom: BTreeMap<String, Option<u64>>,
}

impl TypeCatalog {
    /// A catalog holding only the built-in scalars.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalog for a document. When a custom type is declared more
    /// than once, the first declaration wins.
    pub fn from_document(doc: &SchemaDocument) -> Self {
        let mut catalog = Self::new();
        for def in &doc.types {
            catalog.custom.entry(def.name.clone()).or_insert(def.size);
        }
        catalog
    }

    /// Register a custom type. An existing registration is kept.
    pub fn with_custom(mut self, name: impl Into<String>, size: Option<u64>) -> Self {
        self.custom.entry(name.into()).or_insert(size);
        self
    }

    pub fn custom_count(&self) -> usize {
        self.custom.len()
    }

    /// Resolve a type string.
    pub fn resolve(&self, text: &str) -> Result<ResolvedType, Unresolved> {
        let expr = TypeExpr::parse(text).map_err(|error| Unresolved::Syntax {
            text: text.to_string(),
            error,
        })?;
        match self.resolve_expr(&expr) {
            Some(resolved) => Ok(resolved),
            None => Err(self.explain(&expr, text)),
        }
    }

    /// Size of a resolved type in bytes.
    pub fn size_of(&self, ty: &ResolvedType) -> u64 {
        ty.size_bytes()
    }

    fn resolve_expr(&self, expr: &TypeExpr) -> Option<ResolvedType> {
        match expr {
            TypeExpr::Named(name) => {
                if let Some(scalar) = ScalarType::from_name(name) {
                    Some(ResolvedType::Scalar(scalar))
                } else {
                    self.custom.get(name).map(|size| ResolvedType::Custom {
                        name: name.clone(),
                        size: *size,
                    })
                }
            }
            TypeExpr::Array { element, count } => {
                self.resolve_expr(element).map(|element| ResolvedType::Array {
                    element: Box::new(element),
                    count: *count,
                })
            }
        }
    }

    /// Find the innermost name that failed to resolve.
    fn explain(&self, expr: &TypeExpr, text: &str) -> Unresolved {
        let mut current = expr;
        let mut inside_array = false;
        while let TypeExpr::Array { element, .. } = current {
            current = element;
            inside_array = true;
        }
        match current {
            TypeExpr::Named(name) if inside_array => Unresolved::UnknownElement(name.clone()),
            _ => Unresolved::UnknownType(text.to_string()),
        }
    }
}
