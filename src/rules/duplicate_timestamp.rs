//! `duplicate-timestamp`: fires only when two or more entries in the same
//! file share a timestamp, are of the same kind, and neither carries an
//! explicit `^linkId` (identity would otherwise collide). Entries with an
//! explicit link id are exempt, and synthesis/actualize entries always have
//! a link-based identity so they never trigger this rule.

use std::collections::HashMap;

use crate::core::ast::Entry;
use crate::diagnostics::{Diagnostic, Severity};
use crate::rules::helpers::diagnostic;
use crate::rules::{CheckIndex, Rule};

pub struct DuplicateTimestampRule;

impl Rule for DuplicateTimestampRule {
    fn id(&self) -> &'static str {
        "duplicate-timestamp"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, index: &CheckIndex, severity: Severity) -> Vec<Diagnostic> {
        let mut by_file_key: HashMap<(&str, &str, &'static str), Vec<&Entry>> = HashMap::new();

        for (file, entry) in index.workspace.all_entries() {
            if matches!(entry, Entry::Synthesis(_) | Entry::Actualize(_)) {
                continue;
            }
            if entry.explicit_link().is_some() {
                continue;
            }
            by_file_key
                .entry((file.as_str(), entry.timestamp(), entry.kind_name()))
                .or_default()
                .push(entry);
        }

        let mut out = Vec::new();
        for ((file, _ts, _kind), entries) in by_file_key {
            if entries.len() < 2 {
                continue;
            }
            for entry in entries {
                out.push(diagnostic(
                    self.id(),
                    format!(
                        "duplicate timestamp {:?} shared by multiple entries with no explicit link id",
                        entry.timestamp()
                    ),
                    severity,
                    file,
                    entry.location(),
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
    fn flags_duplicate_timestamps_without_link_ids() {
        let mut ws = Workspace::new();
        ws.add_document(
            "a.thalo",
            "2026-01-05T18:00Z create journal \"A\"\n2026-01-05T18:00Z create journal \"B\"\n",
            None,
        );
        let index = CheckIndex::build(&ws);
        let diags = DuplicateTimestampRule.check(&index, Severity::Error);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn explicit_link_ids_suppress_the_rule() {
        let mut ws = Workspace::new();
        ws.add_document(
            "a.thalo",
            "2026-01-05T18:00Z create journal ^a \"A\"\n2026-01-05T18:00Z create journal ^b \"B\"\n",
            None,
        );
        let index = CheckIndex::build(&ws);
        assert!(DuplicateTimestampRule.check(&index, Severity::Error).is_empty());
    }
}
