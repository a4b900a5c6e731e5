//! Integration tests for file-level normalization.

use std::fs;

use fab_cli::normalize::{load_registry, normalize_file, read_record, write_record};
use fab_model::{DerivedField, DiagnosticKind};

const PROCESS_JSON: &str = r#"{
  "record_type": "FabricationProcess",
  "fields": { "name": { "text": "oxide growth" } },
  "sections": {
    "steps": [
      {
        "record_type": "StartingMaterial",
        "fields": { "chemical_formula": { "text": "SiO2" } }
      },
      {
        "record_type": "SpinCoating",
        "fields": {
          "peb_required": { "boolean": true },
          "peb_temperature": { "real": { "value": 110.0 } }
        }
      },
      {
        "record_type": "StartingMaterial",
        "fields": { "chemical_formula": { "text": "Si(OH)4" } }
      }
    ]
  }
}"#;

#[test]
fn normalizes_a_json_file_end_to_end() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let input = dir.path().join("process.json");
    let output = dir.path().join("normalized.json");
    fs::write(&input, PROCESS_JSON).expect("write input");

    let registry = load_registry(&[]).expect("load registry");
    let outcome = normalize_file(&input, &registry).expect("normalize file");
    write_record(&outcome.record, Some(&output)).expect("write output");

    assert_eq!(outcome.report.records_visited, 4);
    assert_eq!(outcome.report.count(DiagnosticKind::MalformedFormula), 1);
    assert_eq!(outcome.report.diagnostics[0].path, "steps[2]");

    let written = read_record(&output).expect("read output");
    assert_eq!(written, outcome.record);

    let steps = written.section("steps");
    assert_eq!(steps[0].composition.len(), 2);
    assert_eq!(
        steps[1].derived("peb_temperature"),
        Some(&DerivedField::numeric(110.0, Some("celsius".to_string())))
    );
    assert_eq!(
        steps[1].derived("peb_duration"),
        Some(&DerivedField::empty_numeric(Some("minute".to_string())))
    );
    assert!(steps[1].derived("exposure_duration").is_none());
}

#[test]
fn normalizing_the_output_again_changes_nothing() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let input = dir.path().join("process.json");
    let first = dir.path().join("first.json");
    fs::write(&input, PROCESS_JSON).expect("write input");

    let registry = load_registry(&[]).expect("load registry");
    let outcome = normalize_file(&input, &registry).expect("normalize file");
    write_record(&outcome.record, Some(&first)).expect("write output");

    let again = normalize_file(&first, &registry).expect("normalize again");
    assert_eq!(again.record, outcome.record);
}

#[test]
fn extra_schema_files_are_loaded() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let schema = dir.path().join("extra.toml");
    fs::write(
        &schema,
        "[[record_type]]\nname = \"Cleaning\"\ncapabilities = [\"process_step\"]\n",
    )
    .expect("write schema");

    let registry = load_registry(&[schema]).expect("load registry");
    assert!(registry.contains("Cleaning"));
}

#[test]
fn invalid_json_reports_the_path() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let input = dir.path().join("broken.json");
    fs::write(&input, "{ not json").expect("write input");

    let registry = load_registry(&[]).expect("load registry");
    let error = normalize_file(&input, &registry).unwrap_err();
    assert!(format!("{error:#}").contains("broken.json"));
}
