//! Schema loading through the public entry point

use std::fs;

use traitclass::inspect::SchemaFormat;
use traitclass::load_model;

const SCHEMA: &str = r#"(
    traits: [
        (name: "A", data: { "from_a": "a" }),
        (name: "B", data: { "from_b": "b" }),
        (name: "C", data: { "from_c": "c" }),
        (name: "AB", bases: ["A", "B"]),
        (name: "BC", bases: ["B", "C"]),
        (name: "CompositeABC", bases: ["AB", "BC"]),
    ],
    hosts: [
        (name: "CompositeTraitedClass", traits: Some(["CompositeABC"])),
        (name: "CompositeTraitedChild", parent: Some("CompositeTraitedClass")),
    ],
)"#;

#[test]
fn load_model_from_ron_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.ron");
    fs::write(&path, SCHEMA).unwrap();

    let model = load_model(&path, SchemaFormat::Json).unwrap();
    let report = model.report(false);
    for host in &report.hosts {
        assert_eq!(
            host.extends,
            vec!["A", "B", "C", "AB", "BC", "CompositeABC"]
        );
        assert!(host.instantiable);
    }
    assert_eq!(
        report.hosts[1].mro,
        vec!["CompositeABC", "AB", "A", "BC", "B", "C"]
    );
}

#[test]
fn unknown_extension_uses_default_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.schema");
    fs::write(&path, SCHEMA).unwrap();

    assert!(load_model(&path, SchemaFormat::Ron).is_ok());
    assert!(load_model(&path, SchemaFormat::Json).is_err());
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_model(&dir.path().join("absent.ron"), SchemaFormat::Ron).unwrap_err();
    assert!(err.to_string().contains("Failed to read schema"));
}
