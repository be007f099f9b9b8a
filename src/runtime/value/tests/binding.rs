//! Argument binding tests

use crate::runtime::value::{Args, Signature, Value};
use crate::traits::errors::CallError;

fn foo_bar_baz() -> Signature {
    Signature::new()
        .param("foo")
        .param("bar")
        .param_with_default("baz", 0)
}

#[test]
fn test_positional_binding() {
    let bound = foo_bar_baz()
        .bind("method_with_args", Args::new().arg(1).arg(2).arg(3))
        .unwrap();
    assert_eq!(bound.int("foo").unwrap(), 1);
    assert_eq!(bound.int("bar").unwrap(), 2);
    assert_eq!(bound.int("baz").unwrap(), 3);
}

#[test]
fn test_mixed_binding_uses_default() {
    let bound = foo_bar_baz()
        .bind("method_with_args", Args::new().arg(1).kwarg("bar", 2))
        .unwrap();
    assert_eq!(bound.int("baz").unwrap(), 0);
    assert_eq!(bound.len(), 3);
}

#[test]
fn test_keyword_binding_any_order() {
    let bound = foo_bar_baz()
        .bind(
            "method_with_args",
            Args::new().kwarg("bar", 2).kwarg("foo", 1).kwarg("baz", 3),
        )
        .unwrap();
    assert_eq!(bound.get("foo"), Some(&Value::Int(1)));
    assert_eq!(bound.get("baz"), Some(&Value::Int(3)));
}

#[test]
fn test_too_many_positional() {
    let err = foo_bar_baz()
        .bind("m", Args::new().arg(1).arg(2).arg(3).arg(4))
        .unwrap_err();
    assert_eq!(
        err,
        CallError::TooManyPositional {
            function: "m".to_string(),
            expected: 3,
            given: 4,
        }
    );
}

#[test]
fn test_duplicate_argument() {
    let err = foo_bar_baz()
        .bind("m", Args::new().arg(1).kwarg("foo", 2).kwarg("bar", 3))
        .unwrap_err();
    assert!(matches!(err, CallError::DuplicateArgument { ref param, .. } if param == "foo"));
}

#[test]
fn test_unexpected_keyword() {
    let err = foo_bar_baz()
        .bind("m", Args::new().arg(1).arg(2).kwarg("qux", 3))
        .unwrap_err();
    assert!(matches!(err, CallError::UnexpectedKeyword { ref param, .. } if param == "qux"));
}

#[test]
fn test_missing_argument() {
    let err = foo_bar_baz().bind("m", Args::new().arg(1)).unwrap_err();
    assert!(matches!(err, CallError::MissingArgument { ref param, .. } if param == "bar"));
}

#[test]
fn test_type_mismatch() {
    let bound = foo_bar_baz()
        .bind("m", Args::new().arg("one").arg(2))
        .unwrap();
    let err = bound.int("foo").unwrap_err();
    assert_eq!(
        err,
        CallError::TypeMismatch {
            param: "foo".to_string(),
            expected: "int",
            found: "str",
        }
    );
    assert_eq!(bound.str("foo").unwrap(), "one");
}
