//! # ipcs-core: Foundational Types for the IPC Schema Toolchain
//!
//! This crate is the leaf of the workspace. It defines the primitives shared
//! by the schema front end (`ipcs-schema`), the code emitter
//! (`ipcs-codegen`) and the CLI (`ipcs-cli`).
//!
//! ## Key Design Principles
//!
//! 1. **Structural failures are typed.** A document that cannot be read or
//!    does not have the expected shape produces a [`StructuralError`] and
//!    aborts before any semantic check runs.
//!
//! 2. **One `EventPriority` enum.** Validators, the model and the emitter
//!    share a single definition with an exhaustive `match` everywhere.
//!
//! 3. **Budgets are constants.** The hot-key count and size ceilings live in
//!    [`limits`] and are not configurable per document.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ipcs-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod ident;
pub mod limits;
pub mod priority;
pub mod version;

// Re-export primary types for ergonomic imports.
pub use error::{PriorityError, StructuralError, VersionError};
pub use limits::{
    CUSTOM_TYPE_SIZE_ESTIMATE, MAX_HOT_KEYS, MAX_HOT_KEY_SIZE_BYTES, STRING_SIZE_ESTIMATE,
    SUPPORTED_MAJOR_VERSION,
};
pub use priority::EventPriority;
pub use version::SchemaVersion;
