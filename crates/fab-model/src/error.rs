use thiserror::Error;

/// Schema configuration errors, raised when a registry is built.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("record type {record_type}: invalid rule target {field}: {reason}")]
    InvalidRuleTarget {
        record_type: String,
        field: String,
        reason: String,
    },

    #[error("record type {record_type}: rule trigger {field} is not a declared field")]
    UnknownRuleTrigger { record_type: String, field: String },

    #[error("record type {record_type}: unknown capability {capability}")]
    UnknownCapability {
        record_type: String,
        capability: String,
    },

    #[error("record type {record_type}: section {section} references unknown record type {target}")]
    UnknownSectionType {
        record_type: String,
        section: String,
        target: String,
    },

    #[error("duplicate record type: {name}")]
    DuplicateRecordType { name: String },

    #[error("duplicate capability: {name}")]
    DuplicateCapability { name: String },

    #[error("record type {record_type}: field {field} declared as both {first} and {second}")]
    ConflictingField {
        record_type: String,
        field: String,
        first: String,
        second: String,
    },

    #[error("record type {record_type}: section {section} declared with record types {first} and {second}")]
    ConflictingSection {
        record_type: String,
        section: String,
        first: String,
        second: String,
    },

    #[error("record type {record_type}: more than one formula field ({first}, {second})")]
    ConflictingFormulaField {
        record_type: String,
        first: String,
        second: String,
    },

    #[error("record type {record_type}: invalid formula field {field}: {reason}")]
    InvalidFormulaField {
        record_type: String,
        field: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
