//! Three-way merge driver (C12): parses base/ours/theirs, matches entries by
//! identity, classifies each match, and emits merged content with conflict
//! markers around unresolved regions.

use std::collections::HashMap;

use crate::core::ast::{extract, Entry, InstanceDirective, SchemaDirective, SourceFile};
use crate::core::cst::parse;
use crate::core::value::{MetadataValue, Primitive, TypeExpression};
use crate::error::{Result, ThaloError};
use crate::merge::identity::build_identity_map;
use crate::merge::markers::render_conflict;
use crate::merge::{Conflict, MarkerStyle, MergeResult, MergeStats};

/// Runs a three-way merge. Returns `Ok` even when conflicts remain -
/// `MergeResult::success` tells the caller that. `Err` is reserved for
/// genuine contract violations (duplicate identity within a single side).
pub fn merge(base: &str, ours: &str, theirs: &str, marker_style: MarkerStyle) -> Result<MergeResult> {
    let base_file = parse_side(base);
    let ours_file = parse_side(ours);
    let theirs_file = parse_side(theirs);

    if !base_file.syntax_errors.is_empty() || !ours_file.syntax_errors.is_empty() || !theirs_file.syntax_errors.is_empty() {
        let conflict = Conflict {
            kind: "parse-error".to_string(),
            identity: String::new(),
            metadata_key: None,
            message: "one or more sides failed to parse; falling back to textual conflict output".to_string(),
        };
        let content = render_conflict(marker_style, Some(base), ours, theirs);
        return Ok(MergeResult {
            success: false,
            content,
            conflicts: vec![conflict],
            stats: MergeStats::default(),
        });
    }

    let base_map = build_identity_map("base", &base_file.entries)?;
    let ours_map = build_identity_map("ours", &ours_file.entries)?;
    let theirs_map = build_identity_map("theirs", &theirs_file.entries)?;

    let mut identities: Vec<&String> = base_map.keys().chain(ours_map.keys()).chain(theirs_map.keys()).collect();
    identities.sort();
    identities.dedup();

    let mut stats = MergeStats::default();
    let mut conflicts = Vec::new();
    let mut resolved: Vec<(&str, &Entry)> = Vec::new();
    let mut conflict_blocks: Vec<String> = Vec::new();

    for identity in identities {
        stats.total_entries += 1;
        let b = base_map.get(identity).copied();
        let o = ours_map.get(identity).copied();
        let t = theirs_map.get(identity).copied();

        match (b, o, t) {
            (None, Some(o), None) => {
                stats.ours_only += 1;
                resolved.push((identity, o));
            }
            (None, None, Some(t)) => {
                stats.theirs_only += 1;
                resolved.push((identity, t));
            }
            (Some(_), None, None) => {
                // Deleted in both: gone.
            }
            (Some(b), None, Some(t)) => {
                if entries_equal(b, t) {
                    // Deleted in ours, unchanged in theirs: deletion wins.
                } else {
                    stats.auto_merged += 1;
                    resolved.push((identity, t));
                }
            }
            (Some(b), Some(o), None) => {
                if entries_equal(b, o) {
                    // Deleted in theirs, unchanged in ours: deletion wins.
                } else {
                    stats.auto_merged += 1;
                    resolved.push((identity, o));
                }
            }
            (None, Some(o), Some(t)) => {
                if entries_equal(o, t) {
                    stats.common += 1;
                    resolved.push((identity, o));
                } else {
                    conflicts.push(Conflict {
                        kind: "duplicate-link-id".to_string(),
                        identity: identity.clone(),
                        metadata_key: None,
                        message: format!("{identity:?} was introduced independently by both sides with no common ancestor"),
                    });
                    stats.conflicts += 1;
                    conflict_blocks.push(render_conflict(marker_style, None, &render_entry(o), &render_entry(t)));
                }
            }
            (Some(b), Some(o), Some(t)) => {
                if entries_equal(o, t) {
                    stats.common += 1;
                    resolved.push((identity, o));
                } else if entries_equal(b, o) {
                    stats.auto_merged += 1;
                    resolved.push((identity, t));
                } else if entries_equal(b, t) {
                    stats.auto_merged += 1;
                    resolved.push((identity, o));
                } else {
                    let field_conflicts = detect_field_conflicts(identity, b, o, t);
                    stats.conflicts += 1;
                    conflicts.extend(field_conflicts);
                    conflict_blocks.push(render_conflict(
                        marker_style,
                        Some(&render_entry(b)),
                        &render_entry(o),
                        &render_entry(t),
                    ));
                }
            }
            (None, None, None) => unreachable!("identity came from one of the three maps"),
        }
    }

    resolved.sort_by(|(_, a), (_, b)| a.timestamp().cmp(b.timestamp()));

    let mut content = String::new();
    for (_, entry) in &resolved {
        content.push_str(&render_entry(entry));
        content.push('\n');
    }
    for block in &conflict_blocks {
        content.push_str(block);
        content.push('\n');
    }

    Ok(MergeResult {
        success: conflicts.is_empty(),
        content,
        conflicts,
        stats,
    })
}

fn parse_side(source: &str) -> SourceFile {
    let tree = parse(source);
    extract(&tree.root, source)
}

fn entries_equal(a: &Entry, b: &Entry) -> bool {
    a == b
}

/// Field-level conflict detection for a match present on all three sides,
/// per the four named conflict kinds (schema-change conflicts are detected
/// separately since they apply only to `Entry::Schema`).
fn detect_field_conflicts(identity: &str, base: &Entry, ours: &Entry, theirs: &Entry) -> Vec<Conflict> {
    let mut out = Vec::new();

    let (base_title, ours_title, theirs_title) = (title_of(base), title_of(ours), title_of(theirs));
    if ours_title != base_title && theirs_title != base_title && ours_title != theirs_title {
        out.push(Conflict {
            kind: "concurrent-title-change".to_string(),
            identity: identity.to_string(),
            metadata_key: None,
            message: "title changed differently on both sides".to_string(),
        });
    }

    let (base_meta, ours_meta, theirs_meta) = (metadata_of(base), metadata_of(ours), metadata_of(theirs));
    let mut keys: Vec<&String> = ours_meta.keys().chain(theirs_meta.keys()).collect();
    keys.sort();
    keys.dedup();
    for key in keys {
        let b = base_meta.get(key);
        let o = ours_meta.get(key);
        let t = theirs_meta.get(key);
        if o != b && t != b && o != t {
            out.push(Conflict {
                kind: "concurrent-metadata-update".to_string(),
                identity: identity.to_string(),
                metadata_key: Some(key.clone()),
                message: format!("metadata key {key:?} was modified differently on both sides"),
            });
        }
    }

    let (base_content, ours_content, theirs_content) = (content_of(base), content_of(ours), content_of(theirs));
    if ours_content != base_content && theirs_content != base_content && ours_content != theirs_content {
        out.push(Conflict {
            kind: "concurrent-content-edit".to_string(),
            identity: identity.to_string(),
            metadata_key: None,
            message: "content was edited differently on both sides".to_string(),
        });
    }

    if let (Entry::Schema(b), Entry::Schema(o), Entry::Schema(t)) = (base, ours, theirs) {
        let base_fields: Vec<&String> = b.blocks.metadata_block.iter().map(|d| &d.name).collect();
        let ours_added: Vec<&String> = o
            .blocks
            .metadata_block
            .iter()
            .map(|d| &d.name)
            .filter(|n| !base_fields.contains(n))
            .collect();
        let theirs_removed: Vec<&String> = base_fields
            .iter()
            .copied()
            .filter(|n| t.blocks.remove_metadata_block.contains(n))
            .collect();
        for added in &ours_added {
            if theirs_removed.contains(added) {
                out.push(Conflict {
                    kind: "incompatible-schema-change".to_string(),
                    identity: identity.to_string(),
                    metadata_key: Some((*added).clone()),
                    message: format!("field {added:?} was added by ours and removed by theirs"),
                });
            }
        }
    }

    out
}

fn title_of(entry: &Entry) -> Option<&str> {
    match entry {
        Entry::Instance(e) => e.header.title.as_deref(),
        Entry::Schema(e) => e.header.title.as_deref(),
        Entry::Synthesis(e) => e.header.title.as_deref(),
        Entry::Actualize(_) => None,
    }
}

fn metadata_of(entry: &Entry) -> HashMap<String, String> {
    let metadata = match entry {
        Entry::Instance(e) => &e.metadata,
        Entry::Synthesis(e) => &e.metadata,
        Entry::Actualize(e) => &e.metadata,
        Entry::Schema(_) => return HashMap::new(),
    };
    metadata.iter().map(|m| (m.key.clone(), m.value.raw().to_string())).collect()
}

fn content_of(entry: &Entry) -> Option<&str> {
    match entry {
        Entry::Instance(e) => e.content.as_deref(),
        Entry::Synthesis(e) => e.content.as_deref(),
        Entry::Schema(_) | Entry::Actualize(_) => None,
    }
}

/// Reconstructs an entry's thalo-syntax source text. Used to render the
/// `ours`/`theirs`/`base` blocks inside a conflict marker; not a byte-exact
/// round trip of the original source, since the merge driver operates on
/// parsed entries rather than raw text.
fn render_entry(entry: &Entry) -> String {
    match entry {
        Entry::Instance(e) => {
            let directive = match e.header.directive {
                InstanceDirective::Create => "create",
                InstanceDirective::Update => "update",
            };
            let mut out = format!("{} {} {}", e.header.timestamp, directive, e.header.entity);
            push_link_title_tags(&mut out, e.header.link.as_deref(), e.header.title.as_deref(), &e.header.tags);
            out.push('\n');
            render_metadata(&mut out, &e.metadata);
            render_content(&mut out, e.content.as_deref());
            out
        }
        Entry::Schema(e) => {
            let directive = match e.header.directive {
                SchemaDirective::DefineEntity => "define-entity",
                SchemaDirective::AlterEntity => "alter-entity",
            };
            let mut out = format!("{} {} {}", e.header.timestamp, directive, e.header.entity_name);
            push_link_title_tags(&mut out, e.header.link.as_deref(), e.header.title.as_deref(), &e.header.tags);
            out.push('\n');
            if !e.blocks.metadata_block.is_empty() {
                out.push_str("  # Metadata\n");
                for decl in &e.blocks.metadata_block {
                    out.push_str(&format!(
                        "    {}{}: {}\n",
                        decl.name,
                        if decl.optional { "?" } else { "" },
                        render_type_expression(&decl.ty)
                    ));
                }
            }
            if !e.blocks.sections_block.is_empty() {
                out.push_str("  # Sections\n");
                for decl in &e.blocks.sections_block {
                    out.push_str(&format!("    {}{}\n", decl.name, if decl.optional { "?" } else { "" }));
                }
            }
            if !e.blocks.remove_metadata_block.is_empty() {
                out.push_str("  # Remove Metadata\n");
                for name in &e.blocks.remove_metadata_block {
                    out.push_str(&format!("    {name}\n"));
                }
            }
            if !e.blocks.remove_sections_block.is_empty() {
                out.push_str("  # Remove Sections\n");
                for name in &e.blocks.remove_sections_block {
                    out.push_str(&format!("    {name}\n"));
                }
            }
            out
        }
        Entry::Synthesis(e) => {
            let mut out = format!("{} define-synthesis ^{}", e.header.timestamp, e.header.link_id);
            push_link_title_tags(&mut out, None, e.header.title.as_deref(), &e.header.tags);
            out.push('\n');
            render_metadata(&mut out, &e.metadata);
            render_content(&mut out, e.content.as_deref());
            out
        }
        Entry::Actualize(e) => {
            let mut out = format!("{} actualize-synthesis ^{}\n", e.header.timestamp, e.header.target);
            render_metadata(&mut out, &e.metadata);
            out
        }
    }
}

fn push_link_title_tags(out: &mut String, link: Option<&str>, title: Option<&str>, tags: &[String]) {
    if let Some(link) = link {
        out.push_str(&format!(" ^{link}"));
    }
    if let Some(title) = title {
        out.push_str(&format!(" \"{title}\""));
    }
    for tag in tags {
        out.push_str(&format!(" #{tag}"));
    }
}

fn render_metadata(out: &mut String, metadata: &[crate::core::ast::MetadataEntry]) {
    for entry in metadata {
        out.push_str(&format!("  {}: {}\n", entry.key, entry.value.raw()));
    }
}

fn render_content(out: &mut String, content: Option<&str>) {
    if let Some(content) = content {
        for line in content.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
}

fn render_type_expression(ty: &TypeExpression) -> String {
    match ty {
        TypeExpression::Primitive(p) => primitive_name(*p).to_string(),
        TypeExpression::Literal(s) => format!("{s:?}"),
        TypeExpression::Array(inner) => format!("[{}]", render_type_expression(inner)),
        TypeExpression::Union(members) => members.iter().map(render_type_expression).collect::<Vec<_>>().join(" | "),
        TypeExpression::Error { unknown_identifier, .. } => unknown_identifier.clone(),
    }
}

fn primitive_name(p: Primitive) -> &'static str {
    match p {
        Primitive::String => "string",
        Primitive::Datetime => "datetime",
        Primitive::DateRange => "date-range",
        Primitive::Link => "link",
        Primitive::Number => "number",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_merge_takes_additions_from_both_sides() {
        let base = "2026-01-01T00:00Z create journal ^j0 \"Base\"\n";
        let ours = "2026-01-01T00:00Z create journal ^j0 \"Base\"\n2026-01-02T00:00Z create journal ^j1 \"Ours\"\n";
        let theirs = "2026-01-01T00:00Z create journal ^j0 \"Base\"\n2026-01-03T00:00Z create journal ^j2 \"Theirs\"\n";
        let result = merge(base, ours, theirs, MarkerStyle::Git).unwrap();
        assert!(result.success);
        assert_eq!(result.stats.ours_only, 1);
        assert_eq!(result.stats.theirs_only, 1);
        assert!(result.content.contains("\"Ours\""));
        assert!(result.content.contains("\"Theirs\""));
    }

    #[test]
    fn concurrent_title_change_is_a_conflict() {
        let base = "2026-01-01T00:00Z create journal ^j0 \"Base\"\n";
        let ours = "2026-01-01T00:00Z create journal ^j0 \"Ours title\"\n";
        let theirs = "2026-01-01T00:00Z create journal ^j0 \"Theirs title\"\n";
        let result = merge(base, ours, theirs, MarkerStyle::Git).unwrap();
        assert!(!result.success);
        assert!(result.conflicts.iter().any(|c| c.kind == "concurrent-title-change"));
        assert!(result.content.contains("<<<<<<< ours"));
    }

    #[test]
    fn deletion_unchanged_on_other_side_wins() {
        let base = "2026-01-01T00:00Z create journal ^j0 \"Base\"\n";
        let ours = "";
        let theirs = "2026-01-01T00:00Z create journal ^j0 \"Base\"\n";
        let result = merge(base, ours, theirs, MarkerStyle::Git).unwrap();
        assert!(result.success);
        assert!(!result.content.contains("\"Base\""));
    }

    #[test]
    fn duplicate_identity_within_one_side_is_a_contract_violation() {
        let ours = "2026-01-05T18:00Z create journal ^j1 \"A\"\n2026-01-06T18:00Z update journal ^j1 \"B\"\n";
        let err = merge("", ours, "", MarkerStyle::Git).unwrap_err();
        assert!(matches!(err, ThaloError::DuplicateIdentity { .. }));
    }
}
