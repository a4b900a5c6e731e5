//! Pre-order normalization of a record tree.
//!
//! Every record is normalized before its children and exactly once per pass:
//! the chemistry rule first, then the record type's derivation rules. A
//! parent never reads its children's derived state.

use fab_model::{
    Diagnostic, DiagnosticKind, NormalizationReport, Record, ResolvedRecordType, SchemaRegistry,
};

use crate::composition::{FractionOutcome, composition_of};
use crate::materialize::apply_rules;

/// Normalizes record trees against a [`SchemaRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Normalizer<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Normalize `root` and every record below it in place.
    ///
    /// Recoverable problems are collected in the returned report; the walk
    /// never stops early.
    pub fn normalize(&self, root: &mut Record) -> NormalizationReport {
        let mut report = NormalizationReport::default();
        self.visit(root, "", &mut report);

        tracing::info!(
            record_type = %root.record_type,
            records = report.records_visited,
            diagnostics = report.diagnostics.len(),
            "Normalization pass complete"
        );
        report
    }

    fn visit(&self, record: &mut Record, path: &str, report: &mut NormalizationReport) {
        let span = tracing::debug_span!("record", path = %path, record_type = %record.record_type);
        let _guard = span.enter();
        report.records_visited += 1;

        let Some(record_type) = self.registry.get(&record.record_type) else {
            tracing::warn!("Record type is not registered, leaving record unchanged");
            report.diagnostics.push(diagnostic(
                DiagnosticKind::UnknownRecordType,
                path,
                record,
                None,
                format!("record type {:?} is not registered", record.record_type),
            ));
            for (name, children) in &mut record.sections {
                for (index, child) in children.iter_mut().enumerate() {
                    self.visit(child, &child_path(path, name, index), report);
                }
            }
            return;
        };

        apply_chemistry(record, record_type, path, report);

        let summary = apply_rules(record, record_type);
        tracing::debug!(
            rules = summary.rules_applied,
            created = summary.created,
            retyped = summary.retyped,
            removed = summary.removed,
            "Applied derivation rules"
        );

        for name in record.sections.keys() {
            if record_type.section(name).is_none() {
                tracing::warn!(section = %name, "Section is not declared, skipping it");
                report.diagnostics.push(diagnostic(
                    DiagnosticKind::UndeclaredSection,
                    path,
                    record,
                    Some(name),
                    format!(
                        "section {name:?} is not declared by record type {:?}",
                        record_type.name
                    ),
                ));
            }
        }

        for section in record_type.sections() {
            let Some(children) = record.sections.get_mut(&section.name) else {
                continue;
            };
            for (index, child) in children.iter_mut().enumerate() {
                if child.record_type.is_empty() {
                    child.record_type.clone_from(&section.record_type);
                } else if child.record_type != section.record_type {
                    tracing::debug!(
                        section = %section.name,
                        declared = %section.record_type,
                        actual = %child.record_type,
                        "Child type differs from the section declaration, using the child's type"
                    );
                }
                self.visit(child, &child_path(path, &section.name, index), report);
            }
        }
    }
}

/// Normalize `root` with a one-off [`Normalizer`].
pub fn normalize_record(registry: &SchemaRegistry, root: &mut Record) -> NormalizationReport {
    Normalizer::new(registry).normalize(root)
}

/// Rebuild `composition` from the formula field, replacing any previous entries.
fn apply_chemistry(
    record: &mut Record,
    record_type: &ResolvedRecordType,
    path: &str,
    report: &mut NormalizationReport,
) {
    let Some(formula_field) = record_type.formula_field() else {
        return;
    };
    let formula = record
        .text(formula_field)
        .map(str::trim)
        .filter(|formula| !formula.is_empty())
        .map(str::to_string);
    record.composition.clear();
    let Some(formula) = formula else {
        return;
    };

    match composition_of(&formula) {
        Ok(FractionOutcome::Fractions(entries)) => {
            tracing::debug!(elements = entries.len(), "Computed elemental composition");
            record.composition = entries;
        }
        Ok(FractionOutcome::NoElementsProvided) => {
            tracing::warn!(field = %formula_field, formula = %formula, "Formula has no elements");
            report.diagnostics.push(diagnostic(
                DiagnosticKind::NoElementsProvided,
                path,
                record,
                Some(formula_field),
                format!("no elements provided for formula {formula:?}"),
            ));
        }
        Err(error) => {
            tracing::warn!(field = %formula_field, error = %error, "Could not parse formula");
            report.diagnostics.push(diagnostic(
                DiagnosticKind::MalformedFormula,
                path,
                record,
                Some(formula_field),
                error.to_string(),
            ));
        }
    }
}

fn diagnostic(
    kind: DiagnosticKind,
    path: &str,
    record: &Record,
    field: Option<&str>,
    message: String,
) -> Diagnostic {
    Diagnostic {
        kind,
        path: path.to_string(),
        record_type: record.record_type.clone(),
        field: field.map(str::to_string),
        message,
    }
}

fn child_path(parent: &str, section: &str, index: usize) -> String {
    if parent.is_empty() {
        format!("{section}[{index}]")
    } else {
        format!("{parent}.{section}[{index}]")
    }
}
