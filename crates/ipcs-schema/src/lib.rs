//! # ipcs-schema: Schema Model, Type Catalog and Validators
//!
//! The front half of the pipeline:
//!
//! ```text
//! YAML text ──parse──▶ SchemaDocument ──TypeCatalog::from_document──▶ TypeCatalog
//!                             │                                          │
//!                             └──────────────validate_with───────────────┘
//!                                               │
//!                                   ValidationReport / AcceptedSchema
//! ```
//!
//! - [`parse`] / [`load`] build the typed [`SchemaDocument`]. Shape problems
//!   are a [`StructuralError`](ipcs_core::StructuralError) and stop the run.
//! - [`TypeCatalog`] resolves scalar, array and custom type strings.
//! - [`validate`] runs every rule in [`VALIDATORS`] and collects
//!   [`Diagnostics`] into a [`ValidationReport`].
//! - [`accept`] turns a passing document into an [`AcceptedSchema`], the only
//!   input `ipcs-codegen` accepts.

pub mod catalog;
pub mod diagnostics;
pub mod model;
pub mod parse;
pub mod validate;

pub use catalog::{ResolvedType, ScalarCategory, ScalarType, TypeCatalog, TypeExpr, Unresolved};
pub use diagnostics::{Diagnostic, Diagnostics, Rule, Severity, Summary, ValidationReport};
pub use model::{
    AccessSpec, CustomTypeDef, DataStoreKeySpec, DefaultValue, EventSpec, FieldSpec,
    PriorityField, SchemaDocument, TtlField,
};
pub use parse::{load, parse};
pub use validate::{accept, validate, validate_with, AcceptedSchema, Rejected, Validator, VALIDATORS};
