//! Schema-driven inspection of trait compositions
//!
//! Backs the `traitclass` CLI: load a schema, materialize its traits and
//! hosts through the real augmenter, and report the result.

pub mod report;
pub mod schema;

pub use report::{HostReport, MemberRow, Report};
pub use schema::{HostSchema, Literal, MethodSchema, Model, Schema, SchemaFormat, TraitSchema};
