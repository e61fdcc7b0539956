//! Schema registry: resolves an entity's effective schema by composing one
//! `define-entity` with zero or more chronologically ordered `alter-entity`
//! entries.
//!
//! Grounded on `core/context.rs`'s `build_schema_cache`/`expand_schema_keys`
//! lazy-rebuild-on-dirty-flag pattern. That pattern's cycle guard (`visited`
//! set, for recursive schema self-reference) is dropped here: Thalo schema
//! composition is a flat fold over `define`/`alter` entries for one entity
//! name, with no recursive self-reference concept to guard against.

use std::collections::HashMap;

use crate::core::ast::{FieldSchemaDecl, Location, SchemaDirective, SchemaEntry, SectionSchemaDecl};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub optional: bool,
    pub ty: crate::core::value::TypeExpression,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionSchema {
    pub optional: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    pub name: String,
    pub description: Option<String>,
    pub defined_at: Location,
    pub fields: HashMap<String, FieldSchema>,
    pub sections: HashMap<String, SectionSchema>,
}

/// One entry in a per-entity composition, tagged with its originating file
/// so ties can be broken deterministically (filename, then byte offset).
#[derive(Debug, Clone)]
struct Contribution<'a> {
    file: &'a str,
    entry: &'a SchemaEntry,
}

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    resolved: HashMap<String, EntitySchema>,
    /// Entity names whose `define-entity` appeared more than once; the
    /// registry keeps the first occurrence and records the rest so the
    /// checker can emit `duplicate-entity-definition`.
    pub duplicate_definitions: HashMap<String, Vec<Location>>,
    dirty: bool,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            dirty: true,
            ..Default::default()
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn resolve(&self, name: &str) -> Option<&EntitySchema> {
        self.resolved.get(name)
    }

    /// Rebuilds every entity schema from scratch given every schema entry in
    /// the workspace, keyed by owning file. Rebuilding is O(total schema
    /// entries); a targeted incremental update is a legal optimization not
    /// implemented here, matching the simplicity-over-cleverness choice made
    /// for `Workspace::remove_document`.
    pub fn rebuild<'a>(&mut self, entries_by_file: impl Iterator<Item = (&'a str, &'a SchemaEntry)>) {
        self.resolved.clear();
        self.duplicate_definitions.clear();
        self.dirty = false;

        let mut by_entity: HashMap<String, Vec<Contribution>> = HashMap::new();
        for (file, entry) in entries_by_file {
            by_entity
                .entry(entry.header.entity_name.clone())
                .or_default()
                .push(Contribution { file, entry });
        }

        for (name, mut contributions) in by_entity {
            contributions.sort_by(|a, b| {
                a.entry
                    .header
                    .timestamp
                    .cmp(&b.entry.header.timestamp)
                    .then_with(|| a.file.cmp(b.file))
                    .then_with(|| a.entry.location.start_index.cmp(&b.entry.location.start_index))
            });

            let mut schema: Option<EntitySchema> = None;
            for c in contributions {
                match c.entry.header.directive {
                    SchemaDirective::DefineEntity => {
                        if schema.is_some() {
                            self.duplicate_definitions
                                .entry(name.clone())
                                .or_default()
                                .push(c.entry.location);
                            continue;
                        }
                        schema = Some(EntitySchema {
                            name: name.clone(),
                            description: c.entry.header.title.clone(),
                            defined_at: c.entry.location,
                            fields: fields_from_decls(&c.entry.blocks.metadata_block),
                            sections: sections_from_decls(&c.entry.blocks.sections_block),
                        });
                    }
                    SchemaDirective::AlterEntity => {
                        let Some(schema) = schema.as_mut() else {
                            // An alter-entity with no preceding define-entity
                            // has nothing to alter; the checker's
                            // unknown-entity rule covers this case via the
                            // instance side, so silently skip here.
                            continue;
                        };
                        for decl in fields_from_decls(&c.entry.blocks.metadata_block) {
                            schema.fields.insert(decl.0, decl.1);
                        }
                        for decl in sections_from_decls(&c.entry.blocks.sections_block) {
                            schema.sections.insert(decl.0, decl.1);
                        }
                        for removed in &c.entry.blocks.remove_metadata_block {
                            schema.fields.remove(removed);
                        }
                        for removed in &c.entry.blocks.remove_sections_block {
                            schema.sections.remove(removed);
                        }
                    }
                }
            }
            if let Some(schema) = schema {
                self.resolved.insert(name, schema);
            }
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

fn fields_from_decls(decls: &[FieldSchemaDecl]) -> HashMap<String, FieldSchema> {
    decls
        .iter()
        .map(|d| {
            (
                d.name.clone(),
                FieldSchema {
                    optional: d.optional,
                    ty: d.ty.clone(),
                    default_value: d.default_value.clone(),
                    description: d.description.clone(),
                    location: d.location,
                },
            )
        })
        .collect()
}

fn sections_from_decls(decls: &[SectionSchemaDecl]) -> HashMap<String, SectionSchema> {
    decls
        .iter()
        .map(|d| {
            (
                d.name.clone(),
                SectionSchema {
                    optional: d.optional,
                    location: d.location,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::{extract, Entry};
    use crate::core::cst::parse;

    fn schema_entries(source: &str) -> Vec<SchemaEntry> {
        let tree = parse(source);
        let file = extract(&tree.root, source);
        file.entries
            .into_iter()
            .filter_map(|e| match e {
                Entry::Schema(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn composes_define_and_alter() {
        let define = schema_entries(
            "2026-01-01T00:00Z define-entity lore \"Lore\"\n  # Metadata\n    subject: string\n    extra: string\n",
        );
        let alter = schema_entries(
            "2026-01-02T00:00Z alter-entity lore \"Lore\"\n  # Metadata\n    weight: number\n  # Remove Metadata\n    extra\n",
        );
        let mut registry = SchemaRegistry::new();
        let all: Vec<(&str, &SchemaEntry)> = define
            .iter()
            .map(|e| ("a.thalo", e))
            .chain(alter.iter().map(|e| ("b.thalo", e)))
            .collect();
        registry.rebuild(all.into_iter());

        let resolved = registry.resolve("lore").unwrap();
        assert!(resolved.fields.contains_key("subject"));
        assert!(resolved.fields.contains_key("weight"));
        assert!(!resolved.fields.contains_key("extra"));
    }

    #[test]
    fn second_define_entity_is_duplicate() {
        let a = schema_entries("2026-01-01T00:00Z define-entity lore \"Lore\"\n");
        let b = schema_entries("2026-01-02T00:00Z define-entity lore \"Lore again\"\n");
        let mut registry = SchemaRegistry::new();
        let all: Vec<(&str, &SchemaEntry)> =
            a.iter().map(|e| ("a.thalo", e)).chain(b.iter().map(|e| ("b.thalo", e))).collect();
        registry.rebuild(all.into_iter());
        assert_eq!(registry.duplicate_definitions.get("lore").map(Vec::len), Some(1));
    }
}
