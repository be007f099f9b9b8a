//! End-to-end trait composition through the public API

use std::sync::Arc;
use std::thread;

use traitclass::runtime::value::{Args, Signature, Value};
use traitclass::traits::{
    issubclass, AttributeError, CallError, HostType, Namespace, Trait, TypeHandle,
};

fn counter_trait() -> Arc<Trait> {
    Trait::builder("Counter")
        .accessor(
            "count",
            |obj| Ok(obj.load("_count").unwrap_or(Value::Int(0))),
            |obj, value| {
                obj.store("_count", value);
                Ok(())
            },
        )
        .method(
            "increment",
            Signature::new().param_with_default("by", 1),
            |obj, args| {
                let current = obj.getattr("count")?.to_int().unwrap_or(0);
                let next = current + args.int("by")?;
                obj.setattr("count", next)?;
                Ok(Value::Int(next))
            },
        )
        .build()
        .unwrap()
}

#[test]
fn simple_trait_scenario() {
    let simple = Trait::builder("SimpleTrait")
        .data("__privateattr__", 1)
        .property("is_simple", |_| Ok(Value::Bool(true)))
        .method(
            "method_with_args",
            Signature::new()
                .param("foo")
                .param("bar")
                .param_with_default("baz", 0),
            |_, args| Ok(Value::Int(args.int("foo")? + args.int("bar")? + args.int("baz")?)),
        )
        .build()
        .unwrap();
    let host = HostType::builder("SimpleTraitedClass")
        .traits([&simple])
        .define()
        .unwrap();
    let obj = host.instantiate().unwrap();

    assert_eq!(obj.getattr("is_simple").unwrap(), Value::Bool(true));
    assert_eq!(
        obj.call_method("method_with_args", Args::new().arg(1).kwarg("bar", 2))
            .unwrap(),
        Value::Int(3)
    );
    assert_eq!(
        obj.call_method(
            "method_with_args",
            Args::new().kwarg("bar", 2).kwarg("foo", 1).kwarg("baz", 3)
        )
        .unwrap(),
        Value::Int(6)
    );
    assert!(matches!(
        obj.getattr("__privateattr__"),
        Err(CallError::Attribute(AttributeError::Private { .. }))
    ));
}

#[test]
fn trait_methods_drive_trait_accessors() {
    let counter = counter_trait();
    let host = HostType::builder("Clicks").traits([&counter]).define().unwrap();
    let obj = host.instantiate().unwrap();

    assert_eq!(obj.call_method("increment", Args::new()).unwrap(), Value::Int(1));
    assert_eq!(
        obj.call_method("increment", Args::new().kwarg("by", 5)).unwrap(),
        Value::Int(6)
    );
    assert_eq!(obj.getattr("count").unwrap(), Value::Int(6));
    assert_eq!(obj.vars().keys().collect::<Vec<_>>(), vec!["_count"]);
}

#[test]
fn low_level_define_matches_builder() {
    let counter = counter_trait();
    let host = HostType::define(
        "Raw",
        None,
        Namespace::new().with_traits(vec![counter.clone()]),
    )
    .unwrap();

    assert!(host.extends(&counter));
    assert_eq!(host.trait_class().name(), "RawTrait");
    assert!(!issubclass(
        &TypeHandle::Host(host.clone()),
        &TypeHandle::Trait(counter)
    ));
}

#[test]
fn hosts_and_instances_cross_threads() {
    let counter = counter_trait();
    let host = HostType::builder("Shared").traits([&counter]).define().unwrap();

    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let host = Arc::clone(&host);
            thread::spawn(move || {
                let obj = host.instantiate().unwrap();
                obj.call_method("increment", Args::new().arg(i)).unwrap()
            })
        })
        .collect();

    let mut results: Vec<i64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().to_int().unwrap())
        .collect();
    results.sort();
    assert_eq!(results, vec![0, 1, 2, 3]);
}
