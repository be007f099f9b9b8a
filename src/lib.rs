//! traitclass
//!
//! Trait composition for dynamic host types. A host type declares an ordered
//! sequence of traits; the augmenter synthesizes one linearized composite
//! type from them, lifts unimplemented required operations onto the host,
//! and makes every trait member reachable from host instances through a
//! last-resort fallback resolver. Hosts never structurally inherit from
//! their traits; membership is queried with `extends`.
//!
//! # Example
//!
//! ```
//! use traitclass::runtime::value::Value;
//! use traitclass::traits::{HostType, Trait};
//!
//! let simple = Trait::builder("SimpleTrait")
//!     .property("is_simple", |_| Ok(Value::Bool(true)))
//!     .data("__privateattr__", 1)
//!     .build()?;
//! let host = HostType::builder("SimpleTraitedClass").traits([&simple]).define()?;
//! let obj = host.instantiate()?;
//!
//! assert_eq!(obj.getattr("is_simple")?, Value::Bool(true));
//! assert!(obj.getattr("__privateattr__").is_err());
//! # Ok::<(), traitclass::Error>(())
//! ```

#![warn(rust_2018_idioms)]

// Public modules
pub mod inspect;
pub mod runtime;
pub mod traits;

// Utility modules
pub mod util;

// Re-exports
pub use traits::{
    extends, issubclass, AttributeError, CallError, CompositeType, DefinitionError, Error,
    HostType, Instance, InstantiationError, InternalError, Result, Trait, TypeHandle,
};

use std::path::Path;

use anyhow::Context;
use tracing::debug;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "traitclass";

/// Load a schema file and materialize its traits and hosts
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use traitclass::inspect::SchemaFormat;
///
/// fn main() -> anyhow::Result<()> {
///     let model = traitclass::load_model(Path::new("shapes.ron"), SchemaFormat::Ron)?;
///     println!("{} hosts", model.hosts.len());
///     Ok(())
/// }
/// ```
pub fn load_model(
    path: &Path,
    default_format: inspect::SchemaFormat,
) -> anyhow::Result<inspect::Model> {
    let schema = inspect::Schema::from_path(path, default_format)?;
    debug!(
        traits = schema.traits.len(),
        hosts = schema.hosts.len(),
        "schema parsed"
    );
    schema
        .materialize()
        .with_context(|| format!("Failed to materialize schema: {}", path.display()))
}
