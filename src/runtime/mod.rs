//! Runtime support for trait composition
//!
//! - `value`: dynamic values, callables and argument binding

pub mod value;
