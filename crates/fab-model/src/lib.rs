//! Record model for fabrication-facility schemas.
//!
//! Plain data types for the record tree ([`Record`]), the declarative schema
//! surface ([`RecordTypeDef`], [`Capability`], [`DerivationRule`]) and the
//! [`SchemaRegistry`] the normalizer is driven by.

pub mod diagnostics;
pub mod error;
pub mod record;
pub mod registry;
pub mod schema;

pub use diagnostics::{Diagnostic, DiagnosticKind, NormalizationReport};
pub use error::{ModelError, Result};
pub use record::{DerivedField, ElementEntry, FieldValue, Record};
pub use registry::{ResolvedRecordType, SchemaRegistry, SchemaRegistryBuilder};
pub use schema::{
    Capability, DerivationRule, FieldDef, FieldType, RecordTypeDef, RuleAction,
    SchemaDeclarations, SectionDef, TriggerPredicate, UnitSource,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_by_kind() {
        let report = NormalizationReport {
            records_visited: 3,
            diagnostics: vec![
                Diagnostic {
                    kind: DiagnosticKind::MalformedFormula,
                    path: "inputs[0]".to_string(),
                    record_type: "StartingMaterial".to_string(),
                    field: Some("chemical_formula".to_string()),
                    message: "malformed".to_string(),
                },
                Diagnostic {
                    kind: DiagnosticKind::NoElementsProvided,
                    path: "inputs[1]".to_string(),
                    record_type: "StartingMaterial".to_string(),
                    field: Some("chemical_formula".to_string()),
                    message: "no elements provided".to_string(),
                },
            ],
        };
        assert_eq!(report.count(DiagnosticKind::MalformedFormula), 1);
        assert_eq!(report.count(DiagnosticKind::UnknownRecordType), 0);
        assert!(report.has_diagnostics());
    }

    #[test]
    fn test_record_serializes() {
        let record = Record::new("Item")
            .with_field("id_wafer_parent", FieldValue::Integer(7))
            .with_derived("value", DerivedField::numeric(2.5, Some("um".to_string())));
        let json = serde_json::to_string(&record).expect("serialize record");
        let round: Record = serde_json::from_str(&json).expect("deserialize record");
        assert_eq!(round, record);
    }
}
