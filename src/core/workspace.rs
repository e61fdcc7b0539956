//! Multi-file aggregation: global link index, schema registry, dependency
//! tracking and incremental edit application.
//!
//! Single-threaded and cooperative: every mutation runs to completion before
//! another can start. See the module-level ordering guarantee in
//! `apply_edit`. Grounded on `core::context::CheckContext`'s lazy aggregation
//! pattern, generalized from a read-mostly batch context into a mutable,
//! incrementally-updated workspace.

use std::collections::{HashMap, HashSet};

use crate::core::ast::{extract, Entry, FieldSchemaDecl, Location, MetadataEntry, SchemaBlocks, SectionSchemaDecl};
use crate::core::document::{Document, EditResult, FileType};
use crate::core::schema::SchemaRegistry;
use crate::core::semantic::{self, LinkDefinition, LinkReference, SemanticModel};
use crate::core::source_map::SourceMap;
use crate::core::value::TypeExpression;

#[derive(Debug, Clone, Default)]
pub struct InvalidationResult {
    pub affected_files: HashSet<String>,
    pub schemas_changed: bool,
    pub links_changed: bool,
    pub changed_entity_names: Vec<String>,
    pub changed_link_ids: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Workspace {
    documents: HashMap<String, Document>,
    models: HashMap<String, SemanticModel>,
    schema_registry: SchemaRegistry,
    link_index: LinkIndexGlobal,
    link_dependencies: HashMap<String, HashSet<String>>,
    entity_dependencies: HashMap<String, HashSet<String>>,
    /// Filenames in add order - `HashMap` iteration order is arbitrary, and
    /// invariant I3 ("last-added document wins per id") needs the real one.
    /// Re-adding an existing filename moves it to the end, same as a fresh
    /// insertion would.
    document_order: Vec<String>,
}

#[derive(Debug, Default)]
struct LinkIndexGlobal {
    definitions: HashMap<String, LinkDefinition>,
    references: HashMap<String, Vec<LinkReference>>,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            schema_registry: SchemaRegistry::new(),
            ..Default::default()
        }
    }

    pub fn has_document(&self, filename: &str) -> bool {
        self.documents.contains_key(filename)
    }

    pub fn files(&self) -> impl Iterator<Item = &String> {
        self.documents.keys()
    }

    pub fn document(&self, filename: &str) -> Option<&Document> {
        self.documents.get(filename)
    }

    pub fn model(&self, filename: &str) -> Option<&SemanticModel> {
        self.models.get(filename)
    }

    pub fn schema_registry(&self) -> &SchemaRegistry {
        &self.schema_registry
    }

    pub fn all_entries(&self) -> impl Iterator<Item = (&String, &Entry)> {
        self.models
            .iter()
            .flat_map(|(file, model)| model.ast.entries.iter().map(move |e| (file, e)))
    }

    pub fn all_instance_entries(&self) -> Vec<(&String, &crate::core::ast::InstanceEntry)> {
        self.all_entries()
            .filter_map(|(f, e)| match e {
                Entry::Instance(i) => Some((f, i)),
                _ => None,
            })
            .collect()
    }

    pub fn all_schema_entries(&self) -> Vec<(&String, &crate::core::ast::SchemaEntry)> {
        self.all_entries()
            .filter_map(|(f, e)| match e {
                Entry::Schema(s) => Some((f, s)),
                _ => None,
            })
            .collect()
    }

    pub fn all_synthesis_entries(&self) -> Vec<(&String, &crate::core::ast::SynthesisEntry)> {
        self.all_entries()
            .filter_map(|(f, e)| match e {
                Entry::Synthesis(s) => Some((f, s)),
                _ => None,
            })
            .collect()
    }

    pub fn all_actualize_entries(&self) -> Vec<(&String, &crate::core::ast::ActualizeEntry)> {
        self.all_entries()
            .filter_map(|(f, e)| match e {
                Entry::Actualize(a) => Some((f, a)),
                _ => None,
            })
            .collect()
    }

    pub fn link_definition(&self, id: &str) -> Option<&LinkDefinition> {
        self.link_index.definitions.get(id)
    }

    pub fn link_references(&self, id: &str) -> &[LinkReference] {
        self.link_index
            .references
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn affected_files_of(&self, filename: &str) -> HashSet<String> {
        let mut affected = HashSet::new();
        affected.insert(filename.to_string());
        for files in self.link_dependencies.values() {
            if files.contains(filename) {
                affected.extend(files.iter().cloned());
            }
        }
        affected
    }

    /// Removes any prior document with the same name, parses, analyzes, and
    /// merges the new model's links and schema entries into the global
    /// indices.
    pub fn add_document(&mut self, filename: &str, source: &str, file_type: Option<FileType>) -> &SemanticModel {
        let file_type = FileType::determine(file_type, Some(filename), source);
        let document = Document::new(source.to_string(), file_type);
        let model = build_model(filename, &document);

        self.documents.insert(filename.to_string(), document);
        self.models.insert(filename.to_string(), model);
        self.document_order.retain(|f| f != filename);
        self.document_order.push(filename.to_string());
        self.rebuild_global_indices();

        self.models.get(filename).expect("just inserted")
    }

    pub fn remove_document(&mut self, filename: &str) {
        self.documents.remove(filename);
        self.models.remove(filename);
        self.document_order.retain(|f| f != filename);
        self.rebuild_global_indices();
    }

    pub fn update_document(&mut self, filename: &str, new_source: &str) -> InvalidationResult {
        let Some(document) = self.documents.get_mut(filename) else {
            return InvalidationResult::default();
        };
        document.replace_content(new_source.to_string());
        let new_model = build_model(filename, document);
        self.commit_model(filename, new_model)
    }

    /// Applies an edit to one document's source and returns the set of files
    /// (and global structures) it invalidated.
    ///
    /// Ordering within this call matches the spec's concurrency contract:
    /// (a) mutate the Document, (b) re-extract the AST, (c) update the
    /// SemanticModel and diff it, (d) apply the diff to the global link
    /// index and dependency maps, (e) update the schema registry if
    /// affected, (f) return the InvalidationResult.
    pub fn apply_edit(
        &mut self,
        filename: &str,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
        new_text: &str,
    ) -> InvalidationResult {
        let Some(document) = self.documents.get_mut(filename) else {
            return InvalidationResult::default();
        };
        let _edit: EditResult = document.apply_edit(start_line, start_col, end_line, end_col, new_text);
        let new_model = build_model(filename, document);
        self.commit_model(filename, new_model)
    }

    fn commit_model(&mut self, filename: &str, new_model: SemanticModel) -> InvalidationResult {
        let old_model = self.models.get(filename);
        let diff = semantic::diff(old_model, &new_model);

        let mut affected_files: HashSet<String> = HashSet::new();
        affected_files.insert(filename.to_string());

        for id in diff
            .added_link_definitions
            .iter()
            .chain(diff.removed_link_definitions.iter())
        {
            if let Some(files) = self.link_dependencies.get(id) {
                affected_files.extend(files.iter().cloned());
            }
        }
        for name in &diff.changed_entity_names {
            if let Some(files) = self.entity_dependencies.get(name) {
                affected_files.extend(files.iter().cloned());
            }
        }

        self.models.insert(filename.to_string(), new_model);
        self.rebuild_global_indices();

        InvalidationResult {
            affected_files,
            schemas_changed: diff.schema_entries_changed,
            links_changed: diff.changed_link_references
                || !diff.added_link_definitions.is_empty()
                || !diff.removed_link_definitions.is_empty(),
            changed_entity_names: diff.changed_entity_names,
            changed_link_ids: diff
                .added_link_definitions
                .into_iter()
                .chain(diff.removed_link_definitions)
                .collect(),
        }
    }

    /// Rebuilds the global link index, schema registry, and dependency maps
    /// from every current SemanticModel. Simpler and provably correct; a
    /// targeted incremental path is a legal optimization not implemented
    /// here (matching the same choice made for `remove_document`).
    fn rebuild_global_indices(&mut self) {
        let mut definitions = HashMap::new();
        let mut references: HashMap<String, Vec<LinkReference>> = HashMap::new();
        let mut link_dependencies: HashMap<String, HashSet<String>> = HashMap::new();
        let mut entity_dependencies: HashMap<String, HashSet<String>> = HashMap::new();

        // Iterate in add order (not alphabetical) so a later `insert` of the
        // same id from a different file wins, per invariant I3. A file that
        // only exists in `self.models` because of a stale `document_order`
        // entry can't happen: both are always updated together.
        let files_in_order: Vec<&String> = self
            .document_order
            .iter()
            .filter(|f| self.models.contains_key(f.as_str()))
            .collect();

        for file in &files_in_order {
            let model = &self.models[*file];
            for (id, def) in &model.link_index.definitions {
                definitions.insert(id.clone(), def.clone());
                link_dependencies.entry(id.clone()).or_default().insert((*file).clone());
            }
            for (id, refs) in &model.link_index.references {
                references.entry(id.clone()).or_default().extend(refs.iter().cloned());
                link_dependencies.entry(id.clone()).or_default().insert((*file).clone());
            }
            for entry in &model.ast.entries {
                if let Entry::Instance(i) = entry {
                    entity_dependencies
                        .entry(i.header.entity.clone())
                        .or_default()
                        .insert((*file).clone());
                }
            }
        }

        self.link_index = LinkIndexGlobal { definitions, references };
        self.link_dependencies = link_dependencies;
        self.entity_dependencies = entity_dependencies;

        let schema_entries: Vec<(&str, &crate::core::ast::SchemaEntry)> = files_in_order
            .iter()
            .flat_map(|file| {
                self.models[*file]
                    .schema_entries
                    .iter()
                    .map(move |e| (file.as_str(), e))
            })
            .collect();
        self.schema_registry.rebuild(schema_entries.into_iter());
    }
}

fn build_model(filename: &str, document: &Document) -> SemanticModel {
    // A Document may contain multiple blocks (Markdown-embedded fences); the
    // workspace's per-file SemanticModel merges every block's entries under
    // one file identity. Each block's locations are block-relative on
    // extraction, so every entry and syntax error is translated through its
    // own block's SourceMap to file-absolute coordinates *before* merging -
    // otherwise every entry from the second block onward would keep a
    // location relative to its own fence rather than the file.
    let mut merged_entries = Vec::new();
    let mut merged_errors = Vec::new();
    for block in &document.blocks {
        let ast = extract(&block.tree.root, &block.source);
        merged_entries.extend(ast.entries.into_iter().map(|e| translate_entry(e, &block.source_map)));
        merged_errors.extend(
            ast.syntax_errors
                .into_iter()
                .map(|err| translate_syntax_error(err, &block.source_map)),
        );
    }
    let merged_ast = crate::core::ast::SourceFile {
        entries: merged_entries,
        syntax_errors: merged_errors,
    };
    // Locations are already file-absolute at this point, so the model as a
    // whole carries the identity map rather than any one block's offsets.
    let source_map = SourceMap::identity(document.line_index.line_count());
    semantic::analyze(filename, merged_ast, source_map)
}

fn translate_location(location: Location, map: &SourceMap) -> Location {
    Location {
        start_index: map.to_file_offset(location.start_index),
        end_index: map.to_file_offset(location.end_index),
        start_position: map.to_file_position(location.start_position),
        end_position: map.to_file_position(location.end_position),
    }
}

fn translate_syntax_error(
    mut err: crate::core::ast::SyntaxErrorNode,
    map: &SourceMap,
) -> crate::core::ast::SyntaxErrorNode {
    err.location = translate_location(err.location, map);
    err
}

fn translate_metadata(metadata: Vec<MetadataEntry>, map: &SourceMap) -> Vec<MetadataEntry> {
    metadata
        .into_iter()
        .map(|mut m| {
            m.location = translate_location(m.location, map);
            m
        })
        .collect()
}

fn translate_type_expression(ty: TypeExpression, map: &SourceMap) -> TypeExpression {
    match ty {
        TypeExpression::Array(inner) => TypeExpression::Array(Box::new(translate_type_expression(*inner, map))),
        TypeExpression::Union(members) => {
            TypeExpression::Union(members.into_iter().map(|m| translate_type_expression(m, map)).collect())
        }
        TypeExpression::Error { unknown_identifier, location } => {
            TypeExpression::Error { unknown_identifier, location: translate_location(location, map) }
        }
        other @ (TypeExpression::Primitive(_) | TypeExpression::Literal(_)) => other,
    }
}

fn translate_schema_blocks(blocks: SchemaBlocks, map: &SourceMap) -> SchemaBlocks {
    SchemaBlocks {
        metadata_block: blocks
            .metadata_block
            .into_iter()
            .map(|mut decl: FieldSchemaDecl| {
                decl.location = translate_location(decl.location, map);
                decl.ty = translate_type_expression(decl.ty, map);
                decl
            })
            .collect(),
        sections_block: blocks
            .sections_block
            .into_iter()
            .map(|mut decl: SectionSchemaDecl| {
                decl.location = translate_location(decl.location, map);
                decl
            })
            .collect(),
        remove_metadata_block: blocks.remove_metadata_block,
        remove_sections_block: blocks.remove_sections_block,
    }
}

/// Translates every [`Location`] reachable from an entry (header, metadata,
/// schema blocks) from block-relative to file-absolute coordinates.
fn translate_entry(entry: Entry, map: &SourceMap) -> Entry {
    match entry {
        Entry::Instance(mut e) => {
            e.header.location = translate_location(e.header.location, map);
            e.metadata = translate_metadata(e.metadata, map);
            e.location = translate_location(e.location, map);
            Entry::Instance(e)
        }
        Entry::Schema(mut e) => {
            e.header.location = translate_location(e.header.location, map);
            e.blocks = translate_schema_blocks(e.blocks, map);
            e.location = translate_location(e.location, map);
            Entry::Schema(e)
        }
        Entry::Synthesis(mut e) => {
            e.header.location = translate_location(e.header.location, map);
            e.metadata = translate_metadata(e.metadata, map);
            e.location = translate_location(e.location, map);
            Entry::Synthesis(e)
        }
        Entry::Actualize(mut e) => {
            e.header.location = translate_location(e.header.location, map);
            e.metadata = translate_metadata(e.metadata, map);
            e.location = translate_location(e.location, map);
            Entry::Actualize(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_document_populates_link_index() {
        let mut ws = Workspace::new();
        ws.add_document(
            "a.thalo",
            "2026-01-05T18:00Z create journal ^j1 \"Title\"\n",
            None,
        );
        assert!(ws.link_definition("j1").is_some());
    }

    #[test]
    fn cross_file_reference_tracked_in_dependencies() {
        let mut ws = Workspace::new();
        ws.add_document("a.thalo", "2026-01-05T18:00Z create journal ^shared \"A\"\n", None);
        ws.add_document(
            "b.thalo",
            "2026-01-06T09:00Z create journal \"B\"\n  related: ^shared\n",
            None,
        );
        let affected = ws.affected_files_of("a.thalo");
        assert!(affected.contains("b.thalo"));
    }

    #[test]
    fn update_document_reports_affected_files() {
        let mut ws = Workspace::new();
        ws.add_document("a.thalo", "2026-01-05T18:00Z create journal ^shared \"A\"\n", None);
        ws.add_document(
            "b.thalo",
            "2026-01-06T09:00Z create journal \"B\"\n  related: ^shared\n",
            None,
        );
        let result = ws.update_document("a.thalo", "2026-01-05T18:00Z create journal \"A\"\n");
        assert!(result.affected_files.contains("b.thalo"));
        assert!(ws.link_definition("shared").is_none());
    }

    #[test]
    fn remove_document_clears_its_definitions() {
        let mut ws = Workspace::new();
        ws.add_document("a.thalo", "2026-01-05T18:00Z create journal ^j1 \"A\"\n", None);
        ws.remove_document("a.thalo");
        assert!(ws.link_definition("j1").is_none());
        assert!(!ws.has_document("a.thalo"));
    }

    #[test]
    fn duplicate_link_id_across_files_resolves_to_last_added() {
        let mut ws = Workspace::new();
        ws.add_document("b.thalo", "2026-01-05T18:00Z create journal ^x \"From b\"\n", None);
        ws.add_document("a.thalo", "2026-01-06T18:00Z create journal ^x \"From a\"\n", None);

        let def = ws.link_definition("x").expect("definition present");
        assert_eq!(def.file, "a.thalo");
    }

    #[test]
    fn re_adding_a_document_refreshes_its_add_order() {
        let mut ws = Workspace::new();
        ws.add_document("a.thalo", "2026-01-05T18:00Z create journal ^x \"From a\"\n", None);
        ws.add_document("b.thalo", "2026-01-06T18:00Z create journal ^x \"From b\"\n", None);
        // Re-adding a.thalo makes it the most recently added again.
        ws.add_document("a.thalo", "2026-01-07T18:00Z create journal ^x \"From a, again\"\n", None);

        let def = ws.link_definition("x").expect("definition present");
        assert_eq!(def.file, "a.thalo");
    }

    #[test]
    fn second_markdown_block_gets_file_absolute_locations() {
        let source = "# Notes\n\n```thalo\n2026-01-01T00:00Z create journal ^a \"First\"\n```\n\nmore text\n\n```thalo\n2026-01-02T00:00Z create journal ^b \"Second\"\n```\n";
        let mut ws = Workspace::new();
        ws.add_document("notes.md", source, Some(FileType::Markdown));

        let def = ws.link_definition("b").expect("second block's link registered");
        let expected_row = source.lines().position(|l| l.contains("Second")).unwrap();
        assert_eq!(def.location.start_position.row, expected_row);
        assert_eq!(&source[def.location.start_index..def.location.end_index], "2026-01-02T00:00Z create journal ^b \"Second\"");
    }

    #[test]
    fn schema_registry_composes_across_files() {
        let mut ws = Workspace::new();
        ws.add_document(
            "schema.thalo",
            "2026-01-01T00:00Z define-entity lore \"Lore\"\n  # Metadata\n    subject: string\n",
            None,
        );
        assert!(ws.schema_registry().resolve("lore").is_some());
    }
}
