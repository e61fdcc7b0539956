//! Query rules: a `define-synthesis` entry's `source` metadata field holds a
//! query string (`MetadataValue::Query`); these rules statically resolve
//! that query's entity and field conditions against the schema registry,
//! reusing the `unknown-entity`/`unknown-field` codes from instance
//! validation since the failure mode is identical.

use crate::core::value::MetadataValue;
use crate::diagnostics::{Diagnostic, Severity};
use crate::query::fragment::{parse_query, Condition};
use crate::rules::helpers::diagnostic;
use crate::rules::{CheckIndex, Rule};

fn queries_in(index: &CheckIndex) -> Vec<(&str, crate::query::fragment::Query, crate::core::ast::Location)> {
    let mut out = Vec::new();
    for entries in index.synthesis_by_link_id.values() {
        for (file, entry) in entries {
            for m in &entry.metadata {
                if let MetadataValue::Query(q) = &m.value {
                    if let Ok(parsed) = parse_query(&q.query) {
                        out.push((*file, parsed, m.location));
                    }
                }
            }
        }
    }
    out
}

pub struct QueryUnknownEntityRule;

impl Rule for QueryUnknownEntityRule {
    fn id(&self) -> &'static str {
        "unknown-entity"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic> {
        queries_in(index)
            .into_iter()
            .filter(|(_, query, _)| index.workspace.schema_registry().resolve(&query.entity).is_none())
            .map(|(file, query, location)| {
                diagnostic(
                    self.id(),
                    format!("query references undeclared entity {:?}", query.entity),
                    severity,
                    file,
                    location,
                )
            })
            .collect()
    }
}

pub struct QueryUnknownFieldRule;

impl Rule for QueryUnknownFieldRule {
    fn id(&self) -> &'static str {
        "unknown-field"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (file, query, location) in queries_in(index) {
            let Some(schema) = index.workspace.schema_registry().resolve(&query.entity) else {
                continue;
            };
            for condition in &query.conditions {
                if let Condition::Field { field, .. } = condition {
                    if !schema.fields.contains_key(field) {
                        out.push(diagnostic(
                            self.id(),
                            format!("query references undeclared field {field:?} on entity {:?}", query.entity),
                            severity,
                            file,
                            location,
                        ));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::workspace::Workspace;

    #[test]
    fn flags_query_with_unknown_entity() {
        let mut ws = Workspace::new();
        ws.add_document(
            "a.thalo",
            "2026-01-05T18:00Z define-synthesis ^syn1 \"Weekly\"\n  source: query(bogus where #x)\n",
            None,
        );
        let index = CheckIndex::build(&ws);
        let diags = QueryUnknownEntityRule.check(&index, Severity::Error);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn flags_query_with_unknown_field() {
        let mut ws = Workspace::new();
        ws.add_document(
            "a.thalo",
            "2026-01-01T00:00Z define-entity opinion \"Opinion\"\n  # Metadata\n    confidence: string\n",
            None,
        );
        ws.add_document(
            "b.thalo",
            "2026-01-05T18:00Z define-synthesis ^syn1 \"Weekly\"\n  source: query(opinion where bogus = \"x\")\n",
            None,
        );
        let index = CheckIndex::build(&ws);
        let diags = QueryUnknownFieldRule.check(&index, Severity::Error);
        assert_eq!(diags.len(), 1);
    }
}
