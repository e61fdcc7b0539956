//! `unresolved-link`: a reference to a link id with no definition anywhere
//! in the workspace.

use crate::diagnostics::{Diagnostic, Severity};
use crate::rules::helpers::diagnostic;
use crate::rules::{CheckIndex, Rule};

pub struct UnresolvedLinkRule;

impl Rule for UnresolvedLinkRule {
    fn id(&self) -> &'static str {
        "unresolved-link"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic> {
        let workspace = index.workspace;
        let mut out = Vec::new();
        for (file, entry) in workspace.all_entries() {
            let refs: Vec<(String, crate::core::ast::Location)> = match entry {
                crate::core::ast::Entry::Instance(i) => i
                    .metadata
                    .iter()
                    .flat_map(|m| m.value.link_ids().into_iter().map(|id| (id, m.location)))
                    .collect(),
                crate::core::ast::Entry::Synthesis(s) => s
                    .metadata
                    .iter()
                    .flat_map(|m| m.value.link_ids().into_iter().map(|id| (id, m.location)))
                    .collect(),
                crate::core::ast::Entry::Actualize(a) => {
                    vec![(a.header.target.clone(), a.header.location)]
                }
                crate::core::ast::Entry::Schema(_) => Vec::new(),
            };
            for (id, location) in refs {
                if workspace.link_definition(&id).is_none() {
                    out.push(diagnostic(
                        self.id(),
                        format!("unresolved link {id:?}"),
                        severity,
                        file,
                        location,
                    ));
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
    fn flags_reference_with_no_definition() {
        let mut ws = Workspace::new();
        ws.add_document(
            "a.thalo",
            "2026-01-05T18:00Z create journal \"Test\"\n  related: ^ghost\n",
            None,
        );
        let index = CheckIndex::build(&ws);
        let diags = UnresolvedLinkRule.check(&index, Severity::Error);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("ghost"));
    }

    #[test]
    fn resolved_link_produces_no_diagnostic() {
        let mut ws = Workspace::new();
        ws.add_document("a.thalo", "2026-01-05T18:00Z create journal ^x \"T\"\n", None);
        ws.add_document(
            "b.thalo",
            "2026-01-06T09:00Z create journal \"B\"\n  related: ^x\n",
            None,
        );
        let index = CheckIndex::build(&ws);
        let diags = UnresolvedLinkRule.check(&index, Severity::Error);
        assert!(diags.is_empty());
    }
}
