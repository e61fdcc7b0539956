//! Per-file semantic analysis: link index construction and schema entry
//! collection.
//!
//! Grounded on `core/key_usage.rs`'s `FullKey`/`ResolvedKeyUsage`/
//! `UnresolvedKeyUsage`/`FileKeyUsages` split, generalized here into
//! `LinkDefinition`/`LinkReference` and a per-file link index, and on
//! `core/context.rs`'s per-file-collect-then-merge shape.

use std::collections::HashMap;

use crate::core::ast::{Entry, Location, SchemaEntry, SourceFile};
use crate::core::source_map::SourceMap;

#[derive(Debug, Clone, PartialEq)]
pub struct LinkDefinition {
    pub id: String,
    pub file: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkReference {
    pub id: String,
    pub file: String,
    pub location: Location,
    /// The metadata key this reference came from, or the literal `"target"`
    /// for actualize entries.
    pub context: String,
}

#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    pub definitions: HashMap<String, LinkDefinition>,
    pub references: HashMap<String, Vec<LinkReference>>,
}

/// The derived per-file artifact: AST plus link index and schema entries.
/// Holds owned data (never a borrow into its `Document`) so it can be
/// replaced wholesale on every edit - see the module docs on
/// [`crate::core::ast`] for why.
#[derive(Debug, Clone)]
pub struct SemanticModel {
    pub file: String,
    pub ast: SourceFile,
    pub source_map: SourceMap,
    pub link_index: LinkIndex,
    pub schema_entries: Vec<SchemaEntry>,
}

/// Describes what changed between two semantic models of the same file,
/// driving the workspace's targeted invalidation (C8).
#[derive(Debug, Clone, Default)]
pub struct SemanticDiff {
    pub added_link_definitions: Vec<String>,
    pub removed_link_definitions: Vec<String>,
    pub changed_link_references: bool,
    pub schema_entries_changed: bool,
    pub changed_entity_names: Vec<String>,
}

pub fn analyze(file: &str, ast: SourceFile, source_map: SourceMap) -> SemanticModel {
    let mut link_index = LinkIndex::default();
    let mut schema_entries = Vec::new();

    for entry in &ast.entries {
        if let Some(id) = entry.explicit_link() {
            link_index.definitions.insert(
                id.to_string(),
                LinkDefinition {
                    id: id.to_string(),
                    file: file.to_string(),
                    location: entry.location(),
                },
            );
        }
        match entry {
            Entry::Instance(e) => {
                for m in &e.metadata {
                    for id in m.value.link_ids() {
                        push_reference(&mut link_index, id, file, m.location, m.key.clone());
                    }
                }
            }
            Entry::Synthesis(e) => {
                for m in &e.metadata {
                    for id in m.value.link_ids() {
                        push_reference(&mut link_index, id, file, m.location, m.key.clone());
                    }
                }
            }
            Entry::Actualize(e) => {
                push_reference(
                    &mut link_index,
                    e.header.target.clone(),
                    file,
                    e.header.location,
                    "target".to_string(),
                );
            }
            Entry::Schema(e) => {
                schema_entries.push(e.clone());
            }
        }
    }

    SemanticModel {
        file: file.to_string(),
        ast,
        source_map,
        link_index,
        schema_entries,
    }
}

fn push_reference(index: &mut LinkIndex, id: String, file: &str, location: Location, context: String) {
    index
        .references
        .entry(id.clone())
        .or_default()
        .push(LinkReference {
            id,
            file: file.to_string(),
            location,
            context,
        });
}

/// Computes what changed between `old` and `new` models of the same file,
/// used by the workspace to decide which other files need rechecking.
pub fn diff(old: Option<&SemanticModel>, new: &SemanticModel) -> SemanticDiff {
    let old_defs: std::collections::HashSet<&String> = old
        .map(|m| m.link_index.definitions.keys().collect())
        .unwrap_or_default();
    let new_defs: std::collections::HashSet<&String> = new.link_index.definitions.keys().collect();

    let added_link_definitions = new_defs.difference(&old_defs).map(|s| s.to_string()).collect();
    let removed_link_definitions = old_defs.difference(&new_defs).map(|s| s.to_string()).collect();

    let changed_link_references = match old {
        Some(old) => old.link_index.references != new.link_index.references,
        None => !new.link_index.references.is_empty(),
    };

    let old_entity_names: std::collections::HashSet<String> = old
        .map(|m| m.schema_entries.iter().map(|e| e.header.entity_name.clone()).collect())
        .unwrap_or_default();
    let new_entity_names: std::collections::HashSet<String> =
        new.schema_entries.iter().map(|e| e.header.entity_name.clone()).collect();
    let schema_entries_changed = match old {
        Some(old) => old.schema_entries != new.schema_entries,
        None => !new.schema_entries.is_empty(),
    };
    let changed_entity_names: Vec<String> = if schema_entries_changed {
        old_entity_names.union(&new_entity_names).cloned().collect()
    } else {
        Vec::new()
    };

    SemanticDiff {
        added_link_definitions,
        removed_link_definitions,
        changed_link_references,
        schema_entries_changed,
        changed_entity_names,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::extract;
    use crate::core::cst::parse;

    fn model_for(file: &str, source: &str) -> SemanticModel {
        let tree = parse(source);
        let ast = extract(&tree.root, source);
        analyze(file, ast, SourceMap::identity(tree.root.children.len().max(1)))
    }

    #[test]
    fn collects_definitions_and_references() {
        let model = model_for(
            "a.thalo",
            "2026-01-05T18:00Z create journal ^j1 \"Title\"\n  related: ^j2\n",
        );
        assert!(model.link_index.definitions.contains_key("j1"));
        assert!(model.link_index.references.contains_key("j2"));
        assert_eq!(model.link_index.references["j2"][0].context, "related");
    }

    #[test]
    fn actualize_reference_uses_target_context() {
        let model = model_for(
            "a.thalo",
            "2026-01-05T18:00Z actualize-synthesis ^syn1\n  result: \"done\"\n",
        );
        assert!(model.link_index.references.contains_key("syn1"));
        assert_eq!(model.link_index.references["syn1"][0].context, "target");
    }

    #[test]
    fn diff_detects_added_definition() {
        let old = model_for("a.thalo", "2026-01-05T18:00Z create journal \"T\"\n");
        let new = model_for("a.thalo", "2026-01-05T18:00Z create journal ^j1 \"T\"\n");
        let d = diff(Some(&old), &new);
        assert_eq!(d.added_link_definitions, vec!["j1".to_string()]);
    }
}
