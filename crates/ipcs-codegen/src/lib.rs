//! # ipcs-codegen: C++ Emitter for Accepted IPC Schemas
//!
//! Produces two headers from an [`AcceptedSchema`](ipcs_schema::AcceptedSchema):
//!
//! - `DataStoreKeys.h`: key name constants, a traits struct per key (C++
//!   type, access flags, hot-key flag, default value) and the `HotKeys`
//!   table.
//! - `EventBusEvents.h`: the `EventPriority` enum and one struct per event
//!   with `NAME`, `PRIORITY`, `TTL`, `COALESCING` and payload members.
//!
//! Both are stamped with the schema version. Rendering goes through
//! Handlebars templates ([`render`]); the C++ spelling of types and
//! defaults lives in [`cpp`] and the per-template data in [`context`].

pub mod config;
pub mod context;
pub mod cpp;
pub mod emit;
pub mod error;
pub mod render;

pub use config::{EmitConfig, DATASTORE_KEYS_FILE, DEFAULT_NAMESPACE, EVENTBUS_EVENTS_FILE};
pub use emit::{Artifact, Emitter};
pub use error::EmitError;
pub use render::Renderer;
