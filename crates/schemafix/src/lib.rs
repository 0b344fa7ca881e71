//! JSON Schema validation with mechanical document repair.
//!
//! A schema is compiled once into an immutable [`CompiledSchema`] and then
//! validated against any number of documents, concurrently if desired.
//! Validation either collects every violation in document order or stops at
//! the first one; the violation list doubles as the work list for
//! [`generate_patch`](CompiledSchema::generate_patch), which derives an
//! RFC 6902 patch bringing the document into compliance, and
//! [`update`](CompiledSchema::update), which also applies it.
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = schemafix::compile(&json!({
//!     "type": "object",
//!     "required": ["id"],
//!     "properties": {"id": {"type": "integer", "default": 0}}
//! }))?;
//!
//! assert!(!schema.is_valid(&json!({})));
//! assert_eq!(schema.update(&json!({}))?, json!({"id": 0}));
//! # Ok::<(), schemafix::Error>(())
//! ```
//!
//! External references are resolved through a [`SchemaRegistry`] populated up
//! front; nothing is fetched over the network.
mod compiler;
mod error;
pub mod ops;
mod paths;
mod patch;
mod pointer;
mod registry;
mod schema;
mod types;
mod validator;

use serde_json::Value;

pub use compiler::CompileOptions;
pub use error::{
    Error, ParseError, PatchApplyError, PatchError, RecursionLimitError, SchemaError,
    ValidationFailure, Violation, ViolationKind,
};
pub use paths::Location;
pub use patch::{apply, Patch, PatchOperation};
pub use registry::SchemaRegistry;
pub use schema::CompiledSchema;
pub use types::{JsonType, JsonTypeSet};
pub use validator::Mode;

/// Compile a schema document with default options.
///
/// # Errors
///
/// Fails with [`Error::Schema`] when the document is not a structurally valid
/// schema.
pub fn compile(schema: &Value) -> Result<CompiledSchema, Error> {
    CompileOptions::default().compile(schema)
}

/// Start building compile options.
#[must_use]
pub fn options() -> CompileOptions {
    CompileOptions::default()
}
