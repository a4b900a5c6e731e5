//! Record-type declarations.
//!
//! These are the only configuration the normalizer consumes: for each record
//! type, its fields, its sections, at most one chemistry trigger field and an
//! ordered list of [`DerivationRule`]s. Record types are composed from named
//! [`Capability`] groups instead of inheriting from each other.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{DerivedField, FieldValue};

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Integer,
    Real,
    Text,
    Boolean,
    Enumeration,
    Timestamp,
    Reference,
}

impl FieldType {
    /// Whether a field of this type may be the target of a derivation rule.
    pub fn is_derivable(self) -> bool {
        matches!(
            self,
            FieldType::Integer | FieldType::Real | FieldType::Text | FieldType::Enumeration
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Real => "real",
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
            FieldType::Enumeration => "enumeration",
            FieldType::Timestamp => "timestamp",
            FieldType::Reference => "reference",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Default unit for real-valued fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Permitted values of an enumeration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// The field holds a list of values.
    #[serde(default)]
    pub repeated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            unit: None,
            values: Vec::new(),
            repeated: false,
            description: None,
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Empty derived field in the shape implied by this declaration.
    pub fn empty_shape(&self) -> DerivedField {
        match self.field_type {
            FieldType::Integer | FieldType::Real => DerivedField::empty_numeric(self.unit.clone()),
            _ => DerivedField::empty_text(),
        }
    }
}

/// Declaration of a repeated sub-record collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDef {
    pub name: String,
    pub record_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SectionDef {
    pub fn new(name: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            description: None,
        }
    }
}

/// Condition evaluated against a rule's trigger field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPredicate {
    /// Trigger is a boolean `true`. Absent, null and `false` fail.
    IsTrue,
    /// Trigger holds a value; text must be non-blank after trimming.
    NonEmpty,
    /// Trigger text matches one of the listed values (ASCII case-insensitive).
    OneOf(Vec<String>),
}

impl TriggerPredicate {
    pub fn evaluate(&self, value: Option<&FieldValue>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            TriggerPredicate::IsTrue => value.as_bool() == Some(true),
            TriggerPredicate::NonEmpty => match value {
                FieldValue::Null => false,
                FieldValue::List(items) => !items.is_empty(),
                other => other.as_text().is_none_or(|text| !text.trim().is_empty()),
            },
            TriggerPredicate::OneOf(allowed) => value.as_text().is_some_and(|text| {
                let text = text.trim();
                allowed.iter().any(|candidate| candidate.eq_ignore_ascii_case(text))
            }),
        }
    }
}

/// Where a numeric target takes its unit from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSource {
    /// The trimmed text of the trigger field is the unit.
    FromTrigger,
    Fixed(String),
}

/// What a rule does to its target field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Numeric with a unit when the predicate holds, free text otherwise.
    CreateNumeric { unit: UnitSource },
    /// Free text when the predicate holds, untouched otherwise.
    CreateText,
    /// Removed when the predicate fails, discarding its value.
    Remove,
}

/// A (trigger -> derived field) rule declared on a record type or capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationRule {
    pub trigger: String,
    pub when: TriggerPredicate,
    pub target: String,
    pub action: RuleAction,
}

impl DerivationRule {
    pub fn new(
        trigger: impl Into<String>,
        when: TriggerPredicate,
        target: impl Into<String>,
        action: RuleAction,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            when,
            target: target.into(),
            action,
        }
    }

    /// `target` is numeric in the unit named by `trigger`, or text when `trigger` is blank.
    pub fn unit_of_measure(trigger: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            trigger,
            TriggerPredicate::NonEmpty,
            target,
            RuleAction::CreateNumeric {
                unit: UnitSource::FromTrigger,
            },
        )
    }

    /// `target` only exists while the boolean `trigger` is true.
    pub fn gated_by_flag(trigger: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(trigger, TriggerPredicate::IsTrue, target, RuleAction::Remove)
    }
}

/// A named group of fields, sections and rules shared by record types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub sections: Vec<SectionDef>,
    /// Text field holding a chemical formula.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula_field: Option<String>,
    #[serde(default)]
    pub rules: Vec<DerivationRule>,
}

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Declaration of a record type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordTypeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Capabilities included, in rule dispatch order.
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub sections: Vec<SectionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula_field: Option<String>,
    #[serde(default)]
    pub rules: Vec<DerivationRule>,
}

impl RecordTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_section(mut self, name: impl Into<String>, record_type: impl Into<String>) -> Self {
        self.sections.push(SectionDef::new(name, record_type));
        self
    }

    #[must_use]
    pub fn with_formula_field(mut self, field: impl Into<String>) -> Self {
        self.formula_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: DerivationRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// A set of declarations, as read from a declaration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDeclarations {
    #[serde(default, rename = "capability")]
    pub capabilities: Vec<Capability>,
    #[serde(default, rename = "record_type")]
    pub record_types: Vec<RecordTypeDef>,
}

impl SchemaDeclarations {
    pub fn extend(&mut self, other: SchemaDeclarations) {
        self.capabilities.extend(other.capabilities);
        self.record_types.extend(other.record_types);
    }
}
