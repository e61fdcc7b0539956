//! `duplicate-link-id`: the same `^id` defined more than once across the
//! workspace (cross-file, per invariant I3: the global map is single-valued
//! and the last-added document wins, but every duplicate is still reported).

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, Severity};
use crate::rules::helpers::diagnostic;
use crate::rules::{CheckIndex, Rule};

pub struct DuplicateLinkIdRule;

impl Rule for DuplicateLinkIdRule {
    fn id(&self) -> &'static str {
        "duplicate-link-id"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic> {
        let mut by_id: HashMap<&str, Vec<(&str, crate::core::ast::Location)>> = HashMap::new();
        for (file, entry) in index.workspace.all_entries() {
            if let Some(id) = entry.explicit_link() {
                by_id.entry(id).or_default().push((file.as_str(), entry.location()));
            }
        }
        let mut out = Vec::new();
        for (id, occurrences) in by_id {
            if occurrences.len() < 2 {
                continue;
            }
            for (file, location) in occurrences {
                out.push(diagnostic(
                    self.id(),
                    format!("link id {id:?} is defined more than once"),
                    severity,
                    file,
                    location,
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
    fn flags_duplicate_link_id_across_files() {
        let mut ws = Workspace::new();
        ws.add_document("a.thalo", "2026-01-05T18:00Z create journal ^x \"A\"\n", None);
        ws.add_document("b.thalo", "2026-01-06T09:00Z create journal ^x \"B\"\n", None);
        let index = CheckIndex::build(&ws);
        let diags = DuplicateLinkIdRule.check(&index, Severity::Error);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn unique_link_ids_produce_no_diagnostic() {
        let mut ws = Workspace::new();
        ws.add_document("a.thalo", "2026-01-05T18:00Z create journal ^x \"A\"\n", None);
        let index = CheckIndex::build(&ws);
        assert!(DuplicateLinkIdRule.check(&index, Severity::Error).is_empty());
    }
}
