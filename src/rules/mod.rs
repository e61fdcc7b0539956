//! The checker: a configurable set of independent rules run against a
//! [`CheckIndex`] view of a workspace.
//!
//! Grounded on `cli/commands/check.rs`'s `check_*_issues(ctx)` dispatch
//! table, generalized per the design note in SPEC_FULL.md: rather than a
//! closed enum match (the teacher's `CheckRule` + `enum_dispatch`), rules
//! here are values behind `Box<dyn Rule>` in [`default_rules`], so new rules
//! can be registered without touching the dispatch site.

mod duplicate_entity_definition;
mod duplicate_link_id;
mod duplicate_timestamp;
mod helpers;
mod instance_validity;
mod query_rules;
mod unresolved_link;

use std::collections::HashMap;

use crate::core::ast::{ActualizeEntry, Entry, InstanceEntry, SchemaEntry, SynthesisEntry};
use crate::core::workspace::Workspace;
use crate::diagnostics::{Diagnostic, Report, Severity, SeverityConfig};

/// A read-only, pre-bucketed view over a workspace, built once per checker
/// run and shared by every rule. Bucketing up front (rather than each rule
/// re-scanning the workspace) keeps individual rules simple pure functions
/// over explicit inputs.
pub struct CheckIndex<'a> {
    pub workspace: &'a Workspace,
    pub instances_by_entity: HashMap<&'a str, Vec<(&'a str, &'a InstanceEntry)>>,
    pub instances_by_link_id: HashMap<&'a str, Vec<(&'a str, &'a InstanceEntry)>>,
    pub schema_define_by_name: HashMap<&'a str, Vec<(&'a str, &'a SchemaEntry)>>,
    pub schema_alter_by_name: HashMap<&'a str, Vec<(&'a str, &'a SchemaEntry)>>,
    pub synthesis_by_link_id: HashMap<&'a str, Vec<(&'a str, &'a SynthesisEntry)>>,
    pub actualize_by_target: HashMap<&'a str, Vec<(&'a str, &'a ActualizeEntry)>>,
}

impl<'a> CheckIndex<'a> {
    pub fn build(workspace: &'a Workspace) -> Self {
        let mut instances_by_entity: HashMap<&str, Vec<(&str, &InstanceEntry)>> = HashMap::new();
        let mut instances_by_link_id: HashMap<&str, Vec<(&str, &InstanceEntry)>> = HashMap::new();
        let mut schema_define_by_name: HashMap<&str, Vec<(&str, &SchemaEntry)>> = HashMap::new();
        let mut schema_alter_by_name: HashMap<&str, Vec<(&str, &SchemaEntry)>> = HashMap::new();
        let mut synthesis_by_link_id: HashMap<&str, Vec<(&str, &SynthesisEntry)>> = HashMap::new();
        let mut actualize_by_target: HashMap<&str, Vec<(&str, &ActualizeEntry)>> = HashMap::new();

        for (file, entry) in workspace.all_entries() {
            match entry {
                Entry::Instance(i) => {
                    instances_by_entity.entry(i.header.entity.as_str()).or_default().push((file, i));
                    if let Some(link) = &i.header.link {
                        instances_by_link_id.entry(link.as_str()).or_default().push((file, i));
                    }
                }
                Entry::Schema(s) => {
                    use crate::core::ast::SchemaDirective;
                    let bucket = match s.header.directive {
                        SchemaDirective::DefineEntity => &mut schema_define_by_name,
                        SchemaDirective::AlterEntity => &mut schema_alter_by_name,
                    };
                    bucket.entry(s.header.entity_name.as_str()).or_default().push((file, s));
                }
                Entry::Synthesis(s) => {
                    synthesis_by_link_id.entry(s.header.link_id.as_str()).or_default().push((file, s));
                }
                Entry::Actualize(a) => {
                    actualize_by_target.entry(a.header.target.as_str()).or_default().push((file, a));
                }
            }
        }

        Self {
            workspace,
            instances_by_entity,
            instances_by_link_id,
            schema_define_by_name,
            schema_alter_by_name,
            synthesis_by_link_id,
            actualize_by_target,
        }
    }
}

/// A single checker rule. Rules are independent, side-effect-free functions
/// over a [`CheckIndex`]; severity is resolved by the caller from
/// configuration, defaulting to `default_severity()`.
pub trait Rule {
    fn id(&self) -> &'static str;
    fn default_severity(&self) -> Severity;
    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic>;
}

/// The rules shipped by this crate, covering every rule family named in the
/// component design (instance validity, link resolution, timestamps, schema
/// rules, query rules).
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(instance_validity::UnknownEntityRule),
        Box::new(instance_validity::MissingRequiredFieldRule),
        Box::new(instance_validity::UnknownFieldRule),
        Box::new(instance_validity::InvalidFieldTypeRule),
        Box::new(instance_validity::MissingRequiredSectionRule),
        Box::new(unresolved_link::UnresolvedLinkRule),
        Box::new(duplicate_link_id::DuplicateLinkIdRule),
        Box::new(duplicate_timestamp::DuplicateTimestampRule),
        Box::new(duplicate_entity_definition::DuplicateEntityDefinitionRule),
        Box::new(query_rules::QueryUnknownEntityRule),
        Box::new(query_rules::QueryUnknownFieldRule),
    ]
}

/// Runs every rule in `rules` against `workspace`, applying `config`'s
/// severity overrides and dropping anything resolved to `Severity::Off`.
pub fn run_checks(workspace: &Workspace, rules: &[Box<dyn Rule>], config: &SeverityConfig) -> Report {
    let index = CheckIndex::build(workspace);
    let mut diagnostics = Vec::new();
    for rule in rules {
        let severity = config.get(rule.id()).copied().unwrap_or_else(|| rule.default_severity());
        if severity == Severity::Off {
            continue;
        }
        diagnostics.extend(rule.check(&index, severity));
    }
    Report::new(diagnostics)
}
