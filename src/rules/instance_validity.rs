//! Rules validating instance entries against the resolved entity schema:
//! `unknown-entity`, `missing-required-field`, `unknown-field`,
//! `invalid-field-type`, `missing-required-section`.

use crate::diagnostics::{Diagnostic, Severity};
use crate::rules::helpers::diagnostic;
use crate::rules::{CheckIndex, Rule};

pub struct UnknownEntityRule;

impl Rule for UnknownEntityRule {
    fn id(&self) -> &'static str {
        "unknown-entity"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (entity, instances) in &index.instances_by_entity {
            if index.workspace.schema_registry().resolve(entity).is_some() {
                continue;
            }
            for (file, instance) in instances {
                out.push(diagnostic(
                    self.id(),
                    format!("unknown entity {entity:?}"),
                    severity,
                    file,
                    instance.header.location,
                ));
            }
        }
        out
    }
}

pub struct MissingRequiredFieldRule;

impl Rule for MissingRequiredFieldRule {
    fn id(&self) -> &'static str {
        "missing-required-field"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (entity, instances) in &index.instances_by_entity {
            let Some(schema) = index.workspace.schema_registry().resolve(entity) else {
                continue;
            };
            for (file, instance) in instances {
                for (field_name, field) in &schema.fields {
                    if field.optional || field.default_value.is_some() {
                        continue;
                    }
                    let present = instance.metadata.iter().any(|m| &m.key == field_name);
                    if !present {
                        out.push(diagnostic(
                            self.id(),
                            format!("missing required field {field_name:?} on entity {entity:?}"),
                            severity,
                            file,
                            instance.header.location,
                        ));
                    }
                }
            }
        }
        out
    }
}

pub struct UnknownFieldRule;

impl Rule for UnknownFieldRule {
    fn id(&self) -> &'static str {
        "unknown-field"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (entity, instances) in &index.instances_by_entity {
            let Some(schema) = index.workspace.schema_registry().resolve(entity) else {
                continue;
            };
            for (file, instance) in instances {
                for m in &instance.metadata {
                    if !schema.fields.contains_key(&m.key) {
                        out.push(diagnostic(
                            self.id(),
                            format!("unknown field {:?} on entity {entity:?}", m.key),
                            severity,
                            file,
                            m.location,
                        ));
                    }
                }
            }
        }
        out
    }
}

pub struct InvalidFieldTypeRule;

impl Rule for InvalidFieldTypeRule {
    fn id(&self) -> &'static str {
        "invalid-field-type"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (entity, instances) in &index.instances_by_entity {
            let Some(schema) = index.workspace.schema_registry().resolve(entity) else {
                continue;
            };
            for (file, instance) in instances {
                for m in &instance.metadata {
                    let Some(field) = schema.fields.get(&m.key) else {
                        continue;
                    };
                    if !field.ty.accepts(&m.value) {
                        out.push(diagnostic(
                            self.id(),
                            format!("field {:?} on entity {entity:?} does not match its declared type", m.key),
                            severity,
                            file,
                            m.location,
                        ));
                    }
                }
            }
        }
        out
    }
}

pub struct MissingRequiredSectionRule;

impl Rule for MissingRequiredSectionRule {
    fn id(&self) -> &'static str {
        "missing-required-section"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (entity, instances) in &index.instances_by_entity {
            let Some(schema) = index.workspace.schema_registry().resolve(entity) else {
                continue;
            };
            for (file, instance) in instances {
                let content = instance.content.as_deref().unwrap_or("");
                for (section_name, section) in &schema.sections {
                    if section.optional {
                        continue;
                    }
                    let header_present = content
                        .lines()
                        .any(|line| line.trim_start().trim_start_matches('#').trim() == section_name.as_str());
                    if !header_present {
                        out.push(diagnostic(
                            self.id(),
                            format!("missing required section {section_name:?} on entity {entity:?}"),
                            severity,
                            file,
                            instance.location,
                        ));
                    }
                }
            }
        }
        out
    }
}
