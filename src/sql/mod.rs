//! Logical schema to SQL DDL, per dialect.

mod dialect;
mod emitter;
mod names;
mod types;

pub use dialect::Dialect;
pub use emitter::{emit, SqlEmitter, SqlScript};
pub use types::{fallback_type, identity_type, map_declared_type, map_type, TypeParams, TypeSpec};
