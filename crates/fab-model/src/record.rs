//! Record tree and field values.
//!
//! A [`Record`] is a typed node holding plain field values, derived fields
//! managed by the normalizer, an elemental composition and named repeated
//! sub-record collections ("sections").
//!
//! Absence and null are distinct: a field whose key is missing from
//! [`Record::fields`] is *absent*, a key mapped to [`FieldValue::Null`] is
//! *present with a null value*.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A plain, user- or importer-supplied field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    Text(String),
    Boolean(bool),
    Enumeration(String),
    Timestamp(DateTime<Utc>),
    /// Opaque identifier of a record stored elsewhere.
    Reference(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn real(value: f64) -> Self {
        FieldValue::Real { value, unit: None }
    }

    pub fn quantity(value: f64, unit: impl Into<String>) -> Self {
        FieldValue::Real {
            value,
            unit: Some(unit.into()),
        }
    }

    /// Returns the string payload of text-like values (text, enumeration, reference).
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value)
            | FieldValue::Enumeration(value)
            | FieldValue::Reference(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Short lowercase name of the variant, used in log fields.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Integer(_) => "integer",
            FieldValue::Real { .. } => "real",
            FieldValue::Text(_) => "text",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Enumeration(_) => "enumeration",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Reference(_) => "reference",
            FieldValue::List(_) => "list",
        }
    }
}

/// The materialized state of a rule-derived field.
///
/// A missing key in [`Record::derived`] is the absent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedField {
    /// Free text without a unit.
    Text { value: Option<String> },
    /// Real number, optionally carrying a unit label.
    Numeric {
        value: Option<f64>,
        unit: Option<String>,
    },
}

impl DerivedField {
    pub fn empty_text() -> Self {
        DerivedField::Text { value: None }
    }

    pub fn text(value: impl Into<String>) -> Self {
        DerivedField::Text {
            value: Some(value.into()),
        }
    }

    pub fn empty_numeric(unit: Option<String>) -> Self {
        DerivedField::Numeric { value: None, unit }
    }

    pub fn numeric(value: f64, unit: Option<String>) -> Self {
        DerivedField::Numeric {
            value: Some(value),
            unit,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            DerivedField::Text { value } => value.is_none(),
            DerivedField::Numeric { value, .. } => value.is_none(),
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            DerivedField::Numeric { unit, .. } => unit.as_deref(),
            DerivedField::Text { .. } => None,
        }
    }

    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            DerivedField::Numeric { value, .. } => *value,
            DerivedField::Text { .. } => None,
        }
    }
}

/// One element of an elemental composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementEntry {
    /// Element symbol as written in the formula (e.g. "Si").
    pub element: String,
    /// Combined count of the symbol across the formula.
    pub count: u64,
    /// `count / total`, in `[0, 1]`.
    pub atomic_fraction: f64,
}

/// A typed node of the record tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Empty when the type is implied by the enclosing section.
    #[serde(default)]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub derived: BTreeMap<String, DerivedField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composition: Vec<ElementEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sections: BTreeMap<String, Vec<Record>>,
}

impl Record {
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            ..Self::default()
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Builder-style derived field setter.
    #[must_use]
    pub fn with_derived(mut self, name: impl Into<String>, value: DerivedField) -> Self {
        self.derived.insert(name.into(), value);
        self
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, section: impl Into<String>, child: Record) -> Self {
        self.push_child(section, child);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.into(), value)
    }

    /// Text-like value of a field, if present and non-null.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }

    pub fn derived(&self, name: &str) -> Option<&DerivedField> {
        self.derived.get(name)
    }

    pub fn section(&self, name: &str) -> &[Record] {
        self.sections.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push_child(&mut self, section: impl Into<String>, child: Record) {
        self.sections.entry(section.into()).or_default().push(child);
    }

    /// Number of records in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .sections
            .values()
            .flatten()
            .map(Record::subtree_len)
            .sum::<usize>()
    }
}
