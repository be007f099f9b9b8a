//! Primitive value tests

use crate::runtime::value::{Args, Value};
use crate::traits::errors::CallError;

#[test]
fn test_unit_value() {
    let v = Value::default();
    assert_eq!(v, Value::Unit);
    assert_eq!(v.type_name(), "unit");
    assert!(!v.is_callable());
}

#[test]
fn test_bool_values() {
    let t = Value::from(true);
    assert_eq!(t.to_bool(), Some(true));
    assert!(t.to_int().is_none());
    assert!(t.to_float().is_none());
}

#[test]
fn test_int_values() {
    let v = Value::from(42);
    assert_eq!(v.to_int(), Some(42));
    assert_eq!(v.to_float(), Some(42.0));
    assert_eq!(v.type_name(), "int");
}

#[test]
fn test_string_values() {
    let v = Value::from("I am simple");
    assert_eq!(v.as_str(), Some("I am simple"));
    assert_eq!(format!("{}", v), "\"I am simple\"");
    assert_eq!(v, Value::from(String::from("I am simple")));
}

#[test]
fn test_list_display() {
    let v = Value::from(vec![Value::Int(1), Value::Bool(false)]);
    assert_eq!(format!("{}", v), "[1, false]");
    assert_eq!(v.as_list().map(|items| items.len()), Some(2));
}

#[test]
fn test_non_method_not_callable() {
    let err = Value::Int(1).call(Args::new()).unwrap_err();
    assert_eq!(err, CallError::NotCallable { type_name: "int" });
}
