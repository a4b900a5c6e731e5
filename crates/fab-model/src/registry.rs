//! Schema registry.
//!
//! The registry is an explicit object built once by the caller and handed to
//! the normalizer. Building it resolves every record type's capabilities into
//! a flat [`ResolvedRecordType`] and validates all rule declarations, so that
//! configuration mistakes surface here instead of as per-record failures.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ModelError, Result};
use crate::schema::{
    Capability, DerivationRule, FieldDef, FieldType, RecordTypeDef, SchemaDeclarations,
    SectionDef,
};

/// A record type with its capabilities flattened in dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecordType {
    pub name: String,
    pub description: Option<String>,
    pub capabilities: Vec<String>,
    fields: Vec<FieldDef>,
    sections: Vec<SectionDef>,
    formula_field: Option<String>,
    rules: Vec<DerivationRule>,
    derived_targets: BTreeSet<String>,
}

impl ResolvedRecordType {
    fn empty(def: &RecordTypeDef) -> Self {
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            capabilities: def.capabilities.clone(),
            fields: Vec::new(),
            sections: Vec::new(),
            formula_field: None,
            rules: Vec::new(),
            derived_targets: BTreeSet::new(),
        }
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Sections in declared visiting order.
    pub fn sections(&self) -> &[SectionDef] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&SectionDef> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub fn formula_field(&self) -> Option<&str> {
        self.formula_field.as_deref()
    }

    /// Rules in evaluation order: capabilities first, then the type's own rules.
    pub fn rules(&self) -> &[DerivationRule] {
        &self.rules
    }

    /// Whether `name` is the target of at least one rule.
    pub fn is_derived(&self, name: &str) -> bool {
        self.derived_targets.contains(name)
    }

    pub fn derived_targets(&self) -> impl Iterator<Item = &str> {
        self.derived_targets.iter().map(String::as_str)
    }

    fn merge_group(
        &mut self,
        fields: &[FieldDef],
        sections: &[SectionDef],
        formula_field: Option<&str>,
        rules: &[DerivationRule],
    ) -> Result<()> {
        for field in fields {
            match self.field(&field.name) {
                Some(existing) if existing.field_type == field.field_type => {}
                Some(existing) => {
                    return Err(ModelError::ConflictingField {
                        record_type: self.name.clone(),
                        field: field.name.clone(),
                        first: existing.field_type.to_string(),
                        second: field.field_type.to_string(),
                    });
                }
                None => self.fields.push(field.clone()),
            }
        }
        for section in sections {
            match self.section(&section.name) {
                Some(existing) if existing.record_type == section.record_type => {}
                Some(existing) => {
                    return Err(ModelError::ConflictingSection {
                        record_type: self.name.clone(),
                        section: section.name.clone(),
                        first: existing.record_type.clone(),
                        second: section.record_type.clone(),
                    });
                }
                None => self.sections.push(section.clone()),
            }
        }
        if let Some(formula) = formula_field {
            match &self.formula_field {
                Some(existing) if existing != formula => {
                    return Err(ModelError::ConflictingFormulaField {
                        record_type: self.name.clone(),
                        first: existing.clone(),
                        second: formula.to_string(),
                    });
                }
                Some(_) => {}
                None => self.formula_field = Some(formula.to_string()),
            }
        }
        self.rules.extend(rules.iter().cloned());
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if let Some(formula) = &self.formula_field {
            match self.field(formula) {
                Some(field) if field.field_type == FieldType::Text => {}
                Some(field) => {
                    return Err(ModelError::InvalidFormulaField {
                        record_type: self.name.clone(),
                        field: formula.clone(),
                        reason: format!("declared as {}, expected text", field.field_type),
                    });
                }
                None => {
                    return Err(ModelError::InvalidFormulaField {
                        record_type: self.name.clone(),
                        field: formula.clone(),
                        reason: "not a declared field".to_string(),
                    });
                }
            }
        }

        let mut targets = BTreeSet::new();
        for rule in &self.rules {
            if self.field(&rule.trigger).is_none() {
                return Err(ModelError::UnknownRuleTrigger {
                    record_type: self.name.clone(),
                    field: rule.trigger.clone(),
                });
            }
            let invalid_target = |reason: String| ModelError::InvalidRuleTarget {
                record_type: self.name.clone(),
                field: rule.target.clone(),
                reason,
            };
            let Some(target) = self.field(&rule.target) else {
                return Err(invalid_target("not a declared field".to_string()));
            };
            if !target.field_type.is_derivable() {
                return Err(invalid_target(format!(
                    "fields of type {} cannot be derived",
                    target.field_type
                )));
            }
            if rule.target == rule.trigger {
                return Err(invalid_target("a rule cannot target its own trigger".to_string()));
            }
            if self.formula_field.as_deref() == Some(rule.target.as_str()) {
                return Err(invalid_target("the formula field cannot be derived".to_string()));
            }
            if !targets.insert(rule.target.clone()) {
                tracing::debug!(
                    record_type = %self.name,
                    target = %rule.target,
                    "Multiple rules target the same field; the last declared rule wins"
                );
            }
        }
        self.derived_targets = targets;
        Ok(())
    }
}

/// Resolved record types, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: BTreeMap<String, ResolvedRecordType>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    pub fn from_declarations(declarations: SchemaDeclarations) -> Result<Self> {
        Self::builder().declarations(declarations).build()
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedRecordType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Record types sorted by name.
    pub fn record_types(&self) -> impl Iterator<Item = &ResolvedRecordType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Collects declarations; [`SchemaRegistryBuilder::build`] validates them.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistryBuilder {
    capabilities: Vec<Capability>,
    record_types: Vec<RecordTypeDef>,
}

impl SchemaRegistryBuilder {
    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    #[must_use]
    pub fn record_type(mut self, record_type: RecordTypeDef) -> Self {
        self.record_types.push(record_type);
        self
    }

    #[must_use]
    pub fn declarations(mut self, declarations: SchemaDeclarations) -> Self {
        self.capabilities.extend(declarations.capabilities);
        self.record_types.extend(declarations.record_types);
        self
    }

    pub fn build(self) -> Result<SchemaRegistry> {
        let mut capabilities: BTreeMap<String, Capability> = BTreeMap::new();
        for capability in self.capabilities {
            if capabilities.contains_key(&capability.name) {
                return Err(ModelError::DuplicateCapability {
                    name: capability.name,
                });
            }
            capabilities.insert(capability.name.clone(), capability);
        }

        let mut types: BTreeMap<String, ResolvedRecordType> = BTreeMap::new();
        for def in &self.record_types {
            if types.contains_key(&def.name) {
                return Err(ModelError::DuplicateRecordType {
                    name: def.name.clone(),
                });
            }
            let resolved = resolve(def, &capabilities)?;
            types.insert(def.name.clone(), resolved);
        }

        for resolved in types.values() {
            for section in &resolved.sections {
                if !types.contains_key(&section.record_type) {
                    return Err(ModelError::UnknownSectionType {
                        record_type: resolved.name.clone(),
                        section: section.name.clone(),
                        target: section.record_type.clone(),
                    });
                }
            }
        }

        tracing::debug!(
            record_types = types.len(),
            capabilities = capabilities.len(),
            "Schema registry built"
        );
        Ok(SchemaRegistry { types })
    }
}

fn resolve(
    def: &RecordTypeDef,
    capabilities: &BTreeMap<String, Capability>,
) -> Result<ResolvedRecordType> {
    let mut resolved = ResolvedRecordType::empty(def);
    for name in &def.capabilities {
        let capability = capabilities
            .get(name)
            .ok_or_else(|| ModelError::UnknownCapability {
                record_type: def.name.clone(),
                capability: name.clone(),
            })?;
        resolved.merge_group(
            &capability.fields,
            &capability.sections,
            capability.formula_field.as_deref(),
            &capability.rules,
        )?;
    }
    resolved.merge_group(
        &def.fields,
        &def.sections,
        def.formula_field.as_deref(),
        &def.rules,
    )?;
    resolved.validate()?;
    Ok(resolved)
}
