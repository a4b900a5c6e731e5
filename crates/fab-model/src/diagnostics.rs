use std::fmt;

use serde::{Deserialize, Serialize};

/// Recoverable conditions reported by a normalization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The formula text could not be tokenized.
    MalformedFormula,
    /// The formula tokenized but its counts sum to zero.
    NoElementsProvided,
    /// The record's type is not in the registry.
    UnknownRecordType,
    /// The record carries a section its type does not declare.
    UndeclaredSection,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedFormula => "malformed_formula",
            DiagnosticKind::NoElementsProvided => "no_elements_provided",
            DiagnosticKind::UnknownRecordType => "unknown_record_type",
            DiagnosticKind::UndeclaredSection => "undeclared_section",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic attached to one record of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Location of the record, e.g. `inputs[0].properties[1]`; empty for the root.
    pub path: String,
    pub record_type: String,
    /// Field or section the diagnostic refers to.
    pub field: Option<String>,
    /// Human-readable message.
    pub message: String,
}

/// Outcome of one normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub records_visited: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl NormalizationReport {
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.kind == kind)
            .count()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
