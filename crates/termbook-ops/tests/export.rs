use std::collections::BTreeMap;
use std::fs;

use pretty_assertions::assert_eq;
use termbook_ops::{ExportOptions, OperationError, Operations};
use termbook_test_support::Project;

#[test]
fn writes_flat_json_object() {
    let project = Project::with_sample_glossary();
    let ops = Operations::new(project.config());

    let outcome = ops.export(ExportOptions::default()).expect("export");

    assert_eq!(outcome.terms, 2);
    assert_eq!(outcome.output_path, project.export_path());
    let json = fs::read_to_string(&outcome.output_path).expect("read export");
    let parsed: BTreeMap<String, String> = serde_json::from_str(&json).expect("parse export");
    assert_eq!(
        parsed.get("api").map(String::as_str),
        Some("Application Programming Interface")
    );
    assert_eq!(parsed.len(), 2);
}

#[test]
fn export_replaces_previous_content_entirely() {
    let project = Project::with_sample_glossary();
    let output = project.root().join("out").join("terms.json");
    fs::create_dir_all(output.parent().unwrap()).expect("out dir");
    fs::write(&output, "{\"stale\": \"entry\", \"padding\": \"xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx\"}")
        .expect("seed stale export");

    project.write_glossary("terms:\n  - term: only\n    definition: \"Единственный\"\n");
    let ops = Operations::new(project.config());
    ops.export(ExportOptions {
        output: Some(output.clone()),
    })
    .expect("export");

    let json = fs::read_to_string(&output).expect("read export");
    assert_eq!(json, "{\n  \"only\": \"Единственный\"\n}\n");
}

#[test]
fn export_without_glossary_fails_with_missing_file() {
    let project = Project::empty();
    let ops = Operations::new(project.config());

    let err = ops.export(ExportOptions::default()).expect_err("missing glossary");
    assert!(matches!(err, OperationError::MissingGlossary { .. }));
    assert!(!project.export_path().exists());
}
