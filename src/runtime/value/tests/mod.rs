//! Tests for value and callable types

mod binding;
mod primitives;
