//! Runtime value model for trait composition
//!
//! `Value` is what every trait member produces when it is resolved from a host
//! instance: plain data, computed property results, the composite type handle,
//! or a callable bound to the requesting instance.

use std::fmt;
use std::sync::Arc;

use super::function::{Args, BoundMethod, Function};
use crate::traits::errors::CallError;
use crate::traits::TypeHandle;

/// Runtime value
///
/// # Design Principles
/// - `enum` for easy pattern matching
/// - `Arc` for shared strings and handles, cloning a value never deep-copies a type
/// - Callables are either free (`Function`) or bound to an instance (`Method`)
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Empty value
    #[default]
    Unit,

    /// Boolean
    Bool(bool),

    /// Integer
    Int(i64),

    /// Float
    Float(f64),

    /// String (shared string, Arc<str>)
    Str(Arc<str>),

    /// List of values
    List(Vec<Value>),

    /// A type object (trait, composite or host type)
    Type(TypeHandle),

    /// Unbound function
    Function(Function),

    /// Function bound to its receiver instance
    Method(BoundMethod),
}

impl Value {
    /// Name of the value's kind, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Type(_) => "type",
            Value::Function(_) => "function",
            Value::Method(_) => "method",
        }
    }

    /// Convert to bool
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to i64
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to f64 (integers widen)
    pub fn to_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrow string contents
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow list elements
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the type handle
    pub fn as_type(&self) -> Option<&TypeHandle> {
        match self {
            Value::Type(handle) => Some(handle),
            _ => None,
        }
    }

    /// Borrow the bound method
    pub fn as_method(&self) -> Option<&BoundMethod> {
        match self {
            Value::Method(method) => Some(method),
            _ => None,
        }
    }

    /// Check if this value is a type object rather than an instance value
    pub fn is_type(&self) -> bool {
        matches!(self, Value::Type(_))
    }

    /// Check if this value can be called
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Method(_))
    }

    /// Call a bound method
    ///
    /// Free functions have no receiver and cannot be called through a value.
    pub fn call(
        &self,
        args: Args,
    ) -> Result<Value, CallError> {
        match self {
            Value::Method(method) => method.call(args),
            other => Err(CallError::NotCallable {
                type_name: other.type_name(),
            }),
        }
    }
}

impl PartialEq for Value {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.same_body(b),
            (Value::Method(a), Value::Method(b)) => {
                Arc::ptr_eq(a.receiver(), b.receiver()) && a.function().same_body(b.function())
            }
            _ => false,
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<TypeHandle> for Value {
    fn from(handle: TypeHandle) -> Self {
        Value::Type(handle)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "unit"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                write!(
                    f,
                    "[{}]",
                    items
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Value::Type(handle) => write!(f, "<type '{}'>", handle.name()),
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::Method(method) => write!(
                f,
                "<bound method {} of {}>",
                method.function().name(),
                method.receiver().type_name()
            ),
        }
    }
}
