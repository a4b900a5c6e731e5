//! Conditional field materialization.
//!
//! Evaluates a record type's [`DerivationRule`]s, in declaration order,
//! against one record's own fields and creates, retypes or removes the
//! derived target fields. Descending into sections is the orchestrator's job.
//!
//! Rules that target the same field are applied in order, so the last
//! declared rule decides the final state. Re-applying the rules to an
//! unchanged record leaves it unchanged.

use fab_model::{
    DerivationRule, DerivedField, FieldValue, Record, ResolvedRecordType, RuleAction, UnitSource,
};

/// Counts of what one [`apply_rules`] call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeSummary {
    pub rules_applied: usize,
    pub created: usize,
    pub retyped: usize,
    pub removed: usize,
    /// Values lost because they could not be carried into the new representation.
    pub discarded: usize,
}

impl MaterializeSummary {
    pub fn changed(&self) -> bool {
        self.created + self.retyped + self.removed > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Text,
    Numeric(Option<String>),
}

/// Apply every rule of `record_type` to `record`.
pub fn apply_rules(record: &mut Record, record_type: &ResolvedRecordType) -> MaterializeSummary {
    let mut summary = MaterializeSummary::default();
    adopt_plain_values(record, record_type, &mut summary);
    for rule in record_type.rules() {
        apply_rule(record, record_type, rule, &mut summary);
        summary.rules_applied += 1;
    }
    summary
}

fn apply_rule(
    record: &mut Record,
    record_type: &ResolvedRecordType,
    rule: &DerivationRule,
    summary: &mut MaterializeSummary,
) {
    let holds = rule.when.evaluate(record.field(&rule.trigger));
    match &rule.action {
        RuleAction::CreateNumeric { unit } => {
            let shape = match (holds, unit) {
                (false, _) => Shape::Text,
                (true, UnitSource::Fixed(unit)) => Shape::Numeric(Some(unit.clone())),
                // A trigger that holds but carries no unit text cannot label the value.
                (true, UnitSource::FromTrigger) => {
                    unit_text(record, &rule.trigger).map_or(Shape::Text, |unit| {
                        Shape::Numeric(Some(unit))
                    })
                }
            };
            materialize(record, &rule.target, shape, summary);
        }
        RuleAction::CreateText => {
            if holds {
                materialize(record, &rule.target, Shape::Text, summary);
            }
        }
        RuleAction::Remove => {
            if holds {
                if !record.derived.contains_key(&rule.target) {
                    let shape = record_type
                        .field(&rule.target)
                        .map_or_else(DerivedField::empty_text, |field| field.empty_shape());
                    record.derived.insert(rule.target.clone(), shape);
                    summary.created += 1;
                }
            } else if let Some(previous) = record.derived.remove(&rule.target) {
                summary.removed += 1;
                if !previous.is_empty() {
                    tracing::debug!(
                        field = %rule.target,
                        trigger = %rule.trigger,
                        "Trigger no longer holds, discarding derived value"
                    );
                }
            }
        }
    }
}

fn unit_text(record: &Record, trigger: &str) -> Option<String> {
    record
        .text(trigger)
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .map(str::to_string)
}

fn materialize(record: &mut Record, target: &str, shape: Shape, summary: &mut MaterializeSummary) {
    let next = match (record.derived.get(target), shape) {
        (None, Shape::Text) => {
            summary.created += 1;
            DerivedField::empty_text()
        }
        (None, Shape::Numeric(unit)) => {
            summary.created += 1;
            DerivedField::empty_numeric(unit)
        }
        (Some(DerivedField::Text { .. }), Shape::Text) => return,
        (Some(DerivedField::Numeric { value, unit: current }), Shape::Numeric(unit)) => {
            if *current == unit {
                return;
            }
            summary.retyped += 1;
            DerivedField::Numeric {
                value: *value,
                unit,
            }
        }
        (Some(DerivedField::Text { value }), Shape::Numeric(unit)) => {
            summary.retyped += 1;
            let parsed = value.as_deref().and_then(parse_number);
            if value.is_some() && parsed.is_none() {
                summary.discarded += 1;
                tracing::warn!(
                    field = %target,
                    "Text value is not numeric, re-materializing empty"
                );
            }
            DerivedField::Numeric {
                value: parsed,
                unit,
            }
        }
        (Some(DerivedField::Numeric { value, .. }), Shape::Text) => {
            summary.retyped += 1;
            DerivedField::Text {
                value: value.map(|number| number.to_string()),
            }
        }
    };
    record.derived.insert(target.to_string(), next);
}

/// Move plain values an importer put under a derived field's name into `derived`.
///
/// Numbers without a unit take the field's declared unit.
fn adopt_plain_values(
    record: &mut Record,
    record_type: &ResolvedRecordType,
    summary: &mut MaterializeSummary,
) {
    for target in record_type.derived_targets() {
        let Some(plain) = record.fields.remove(target) else {
            continue;
        };
        if record.derived.contains_key(target) {
            summary.discarded += 1;
            tracing::warn!(
                field = %target,
                value_type = plain.type_name(),
                "Plain value shadowed by an existing derived field, dropping it"
            );
            continue;
        }
        let declared_unit = || record_type.field(target).and_then(|field| field.unit.clone());
        let adopted = match plain {
            FieldValue::Null => DerivedField::empty_text(),
            FieldValue::Integer(value) => DerivedField::numeric(value as f64, declared_unit()),
            FieldValue::Real { value, unit } => {
                DerivedField::numeric(value, unit.or_else(declared_unit))
            }
            FieldValue::Text(value) | FieldValue::Enumeration(value) => {
                if value.trim().is_empty() {
                    DerivedField::empty_text()
                } else {
                    DerivedField::text(value)
                }
            }
            FieldValue::Boolean(value) => DerivedField::text(value.to_string()),
            other => {
                summary.discarded += 1;
                tracing::warn!(
                    field = %target,
                    value_type = other.type_name(),
                    "Value cannot back a derived field, dropping it"
                );
                continue;
            }
        };
        record.derived.insert(target.to_string(), adopted);
    }
}

/// Parses a trimmed string as a finite f64.
fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|number| number.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fab_model::{
        FieldDef, FieldType, RecordTypeDef, SchemaRegistry, TriggerPredicate,
    };

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .record_type(
                RecordTypeDef::new("ItemPropertyDefinition")
                    .with_field(FieldDef::new("unit", FieldType::Text))
                    .with_field(FieldDef::new("value", FieldType::Real))
                    .with_rule(DerivationRule::unit_of_measure("unit", "value")),
            )
            .record_type(
                RecordTypeDef::new("SpinCoating")
                    .with_field(FieldDef::new("exposure_required", FieldType::Boolean))
                    .with_field(
                        FieldDef::new("exposure_duration", FieldType::Real).with_unit("minute"),
                    )
                    .with_rule(DerivationRule::gated_by_flag(
                        "exposure_required",
                        "exposure_duration",
                    )),
            )
            .record_type(
                RecordTypeDef::new("DopingProperties")
                    .with_field(FieldDef::new("doping_type", FieldType::Enumeration))
                    .with_field(FieldDef::new("unit", FieldType::Text))
                    .with_field(FieldDef::new("value", FieldType::Real))
                    .with_field(FieldDef::new("notes", FieldType::Text))
                    .with_rule(DerivationRule::unit_of_measure("unit", "value"))
                    .with_rule(DerivationRule::new(
                        "doping_type",
                        TriggerPredicate::OneOf(vec!["p".to_string(), "n".to_string()]),
                        "value",
                        RuleAction::Remove,
                    ))
                    .with_rule(DerivationRule::new(
                        "doping_type",
                        TriggerPredicate::NonEmpty,
                        "notes",
                        RuleAction::CreateText,
                    )),
            )
            .build()
            .expect("build registry")
    }

    fn apply(record: &mut Record) -> MaterializeSummary {
        let registry = registry();
        let record_type = registry.get(&record.record_type).expect("registered type");
        apply_rules(record, record_type)
    }

    #[test]
    fn test_unit_turns_text_into_numeric() {
        let mut record = Record::new("ItemPropertyDefinition")
            .with_field("unit", FieldValue::text("minute"))
            .with_derived("value", DerivedField::text("12"));

        let summary = apply(&mut record);

        assert_eq!(summary.retyped, 1);
        assert_eq!(
            record.derived("value"),
            Some(&DerivedField::numeric(12.0, Some("minute".to_string())))
        );
    }

    #[test]
    fn test_blank_unit_gives_text() {
        let mut record = Record::new("ItemPropertyDefinition")
            .with_field("unit", FieldValue::text(" "))
            .with_derived("value", DerivedField::numeric(2.5, Some("um".to_string())));

        apply(&mut record);

        assert_eq!(record.derived("value"), Some(&DerivedField::text("2.5")));
    }

    #[test]
    fn test_non_text_unit_gives_text() {
        let mut record = Record::new("ItemPropertyDefinition")
            .with_field("unit", FieldValue::real(3.0))
            .with_derived("value", DerivedField::text("7"));

        let summary = apply(&mut record);

        assert!(!summary.changed());
        assert_eq!(record.derived("value"), Some(&DerivedField::text("7")));

        record.set_field("unit", FieldValue::text("nm"));
        apply(&mut record);
        assert_eq!(
            record.derived("value"),
            Some(&DerivedField::numeric(7.0, Some("nm".to_string())))
        );
    }

    #[test]
    fn test_absent_unit_creates_empty_text() {
        let mut record = Record::new("ItemPropertyDefinition");

        let summary = apply(&mut record);

        assert_eq!(summary.created, 1);
        assert_eq!(record.derived("value"), Some(&DerivedField::empty_text()));
    }

    #[test]
    fn test_unit_change_keeps_magnitude() {
        let mut record = Record::new("ItemPropertyDefinition")
            .with_field("unit", FieldValue::text("second"))
            .with_derived("value", DerivedField::numeric(30.0, Some("minute".to_string())));

        apply(&mut record);

        assert_eq!(
            record.derived("value"),
            Some(&DerivedField::numeric(30.0, Some("second".to_string())))
        );
    }

    #[test]
    fn test_non_numeric_text_is_discarded() {
        let mut record = Record::new("ItemPropertyDefinition")
            .with_field("unit", FieldValue::text("um"))
            .with_derived("value", DerivedField::text("thick"));

        let summary = apply(&mut record);

        assert_eq!(summary.discarded, 1);
        assert_eq!(
            record.derived("value"),
            Some(&DerivedField::empty_numeric(Some("um".to_string())))
        );
    }

    #[test]
    fn test_second_application_is_a_no_op() {
        let mut record = Record::new("ItemPropertyDefinition")
            .with_field("unit", FieldValue::text("minute"))
            .with_derived("value", DerivedField::text("12"));

        apply(&mut record);
        let first = record.clone();
        let summary = apply(&mut record);

        assert!(!summary.changed());
        assert_eq!(record, first);
    }

    #[test]
    fn test_flag_gates_presence() {
        let mut record = Record::new("SpinCoating")
            .with_field("exposure_required", FieldValue::Boolean(true))
            .with_derived(
                "exposure_duration",
                DerivedField::numeric(5.0, Some("minute".to_string())),
            );

        apply(&mut record);
        assert_eq!(
            record.derived("exposure_duration"),
            Some(&DerivedField::numeric(5.0, Some("minute".to_string())))
        );

        record.set_field("exposure_required", FieldValue::Boolean(false));
        let summary = apply(&mut record);
        assert_eq!(summary.removed, 1);
        assert!(record.derived("exposure_duration").is_none());

        record.set_field("exposure_required", FieldValue::Boolean(true));
        apply(&mut record);
        assert_eq!(
            record.derived("exposure_duration"),
            Some(&DerivedField::empty_numeric(Some("minute".to_string())))
        );
    }

    #[test]
    fn test_last_declared_rule_wins() {
        let mut record = Record::new("DopingProperties")
            .with_field("doping_type", FieldValue::Enumeration("no_doping".to_string()))
            .with_field("unit", FieldValue::text("1/cm^3"))
            .with_derived("value", DerivedField::numeric(1e15, Some("1/cm^3".to_string())));

        apply(&mut record);

        assert!(record.derived("value").is_none());
        assert_eq!(record.derived("notes"), Some(&DerivedField::empty_text()));
    }

    #[test]
    fn test_create_text_leaves_target_when_predicate_fails() {
        let mut record = Record::new("DopingProperties")
            .with_derived("notes", DerivedField::numeric(1.0, None));

        apply(&mut record);

        assert_eq!(
            record.derived("notes"),
            Some(&DerivedField::numeric(1.0, None))
        );
    }

    #[test]
    fn test_plain_values_are_adopted() {
        let mut record = Record::new("ItemPropertyDefinition")
            .with_field("unit", FieldValue::text("mm"))
            .with_field("value", FieldValue::text("100"));

        apply(&mut record);

        assert!(record.field("value").is_none());
        assert_eq!(
            record.derived("value"),
            Some(&DerivedField::numeric(100.0, Some("mm".to_string())))
        );
    }
}
