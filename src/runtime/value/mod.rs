//! Core runtime types for trait composition
//!
//! This module provides the value and callable types that trait members
//! resolve to when reached through a host instance.

pub mod function;
pub mod runtime_value;
pub use function::*;
pub use runtime_value::*;

#[cfg(test)]
mod tests;
