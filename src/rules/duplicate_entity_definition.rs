//! `duplicate-entity-definition`: more than one `define-entity` for the
//! same entity name. The registry keeps the first (by timestamp, tie-broken
//! by file name then byte offset) and records the rest in
//! `SchemaRegistry::duplicate_definitions`; this rule just surfaces them.

use crate::diagnostics::{Diagnostic, Severity};
use crate::rules::helpers::diagnostic;
use crate::rules::{CheckIndex, Rule};

pub struct DuplicateEntityDefinitionRule;

impl Rule for DuplicateEntityDefinitionRule {
    fn id(&self) -> &'static str {
        "duplicate-entity-definition"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (entity, locations) in &index.workspace.schema_registry().duplicate_definitions {
            for location in locations {
                // The owning file isn't tracked on the registry's duplicate
                // list (it only needs the location for reporting); resolve
                // it by matching the location back against the bucketed
                // define-entity entries this run already built.
                let file = index
                    .schema_define_by_name
                    .get(entity.as_str())
                    .and_then(|entries| entries.iter().find(|(_, e)| e.location == *location))
                    .map(|(f, _)| *f)
                    .unwrap_or("");
                out.push(diagnostic(
                    self.id(),
                    format!("entity {entity:?} is defined more than once"),
                    severity,
                    file,
                    *location,
                ));
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
    fn flags_second_define_entity() {
        let mut ws = Workspace::new();
        ws.add_document("a.thalo", "2026-01-01T00:00Z define-entity lore \"Lore\"\n", None);
        ws.add_document("b.thalo", "2026-01-02T00:00Z define-entity lore \"Lore again\"\n", None);
        let index = CheckIndex::build(&ws);
        let diags = DuplicateEntityDefinitionRule.check(&index, Severity::Error);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].file, "b.thalo");
    }
}
