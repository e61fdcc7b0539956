//! Typed AST, built by walking the concrete syntax tree.
//!
//! Every AST node carries its block-relative [`Location`]. Rather than
//! holding a borrowed reference to its concrete-syntax node - infeasible to
//! express safely once a `Document` is owned behind a `HashMap` without
//! unsafe code or an arena - each node owns a clone of the minimal concrete
//! data it needs for downstream highlighting (kind, span, raw text). This is
//! a deliberate ownership-model substitution for the spec's borrow-based
//! design: `SemanticModel` is replaced wholesale on every edit, which
//! preserves the "invalidates all outstanding references" contract through
//! Rust's ownership model instead of explicit borrow invalidation.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::cst::{kind, CstNode};
use crate::core::line_index::Position;
use crate::core::value::{
    DateRangeValue, DatetimeValue, LinkValue, MetadataValue, NumberValue, Primitive, QueryValue,
    QuotedValue, TypeExpression, ValueArray,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub start_index: usize,
    pub end_index: usize,
    pub start_position: Position,
    pub end_position: Position,
}

impl Location {
    fn from_node(node: &CstNode) -> Self {
        Self {
            start_index: node.start_byte,
            end_index: node.end_byte,
            start_position: node.start_position,
            end_position: node.end_position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceDirective {
    Create,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDirective {
    DefineEntity,
    AlterEntity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceHeader {
    pub timestamp: String,
    pub directive: InstanceDirective,
    pub entity: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub tags: Vec<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: MetadataValue,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceEntry {
    pub header: InstanceHeader,
    pub metadata: Vec<MetadataEntry>,
    pub content: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchemaDecl {
    pub name: String,
    pub optional: bool,
    pub ty: TypeExpression,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionSchemaDecl {
    pub name: String,
    pub optional: bool,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaHeader {
    pub timestamp: String,
    pub directive: SchemaDirective,
    pub entity_name: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub tags: Vec<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaBlocks {
    pub metadata_block: Vec<FieldSchemaDecl>,
    pub sections_block: Vec<SectionSchemaDecl>,
    pub remove_metadata_block: Vec<String>,
    pub remove_sections_block: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry {
    pub header: SchemaHeader,
    pub blocks: SchemaBlocks,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisHeader {
    pub timestamp: String,
    pub link_id: String,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisEntry {
    pub header: SynthesisHeader,
    pub metadata: Vec<MetadataEntry>,
    pub content: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActualizeHeader {
    pub timestamp: String,
    pub target: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActualizeEntry {
    pub header: ActualizeHeader,
    pub metadata: Vec<MetadataEntry>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Instance(InstanceEntry),
    Schema(SchemaEntry),
    Synthesis(SynthesisEntry),
    Actualize(ActualizeEntry),
}

impl Entry {
    pub fn location(&self) -> Location {
        match self {
            Entry::Instance(e) => e.location,
            Entry::Schema(e) => e.location,
            Entry::Synthesis(e) => e.location,
            Entry::Actualize(e) => e.location,
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            Entry::Instance(e) => &e.header.timestamp,
            Entry::Schema(e) => &e.header.timestamp,
            Entry::Synthesis(e) => &e.header.timestamp,
            Entry::Actualize(e) => &e.header.timestamp,
        }
    }

    /// Explicit `^linkId` if the header carries one.
    pub fn explicit_link(&self) -> Option<&str> {
        match self {
            Entry::Instance(e) => e.header.link.as_deref(),
            Entry::Schema(e) => e.header.link.as_deref(),
            Entry::Synthesis(e) => Some(&e.header.link_id),
            // An actualize entry's `target` references another entry's link
            // id; it does not itself define one, so it contributes no
            // `LinkDefinition` (see `core::semantic::analyze`). `identity()`
            // below special-cases actualize entries separately, since the
            // merge driver's identity model does use `target` for matching.
            Entry::Actualize(_) => None,
        }
    }

    /// Identity per the data model: explicit link id, else `(timestamp, kind)`.
    /// An actualize entry's identity is its `target` - it has no link of its
    /// own, but it is still the field the merge driver matches on, since two
    /// actualize entries for the same target are the same logical fact.
    pub fn identity(&self) -> String {
        if let Entry::Actualize(e) = self {
            return format!("^{}", e.header.target);
        }
        if let Some(link) = self.explicit_link() {
            return format!("^{link}");
        }
        format!("{}:{}", self.timestamp(), self.kind_name())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Entry::Instance(_) => "instance",
            Entry::Schema(_) => "schema",
            Entry::Synthesis(_) => "synthesis",
            Entry::Actualize(_) => "actualize",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxErrorNode {
    pub code: &'static str,
    pub message: String,
    pub text: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceFile {
    pub entries: Vec<Entry>,
    pub syntax_errors: Vec<SyntaxErrorNode>,
}

/// Walks a concrete syntax tree and produces a typed [`SourceFile`].
pub fn extract(tree_root: &CstNode, source: &str) -> SourceFile {
    let mut file = SourceFile::default();
    for node in &tree_root.children {
        if node.kind == kind::ENTRY {
            extract_entry(node, source, &mut file);
        }
    }
    // ERROR nodes are not confined to the top level - a malformed header
    // attribute (e.g. a title the grammar can't place) produces an ERROR
    // nested inside HEADER, not a sibling of ENTRY - so every ERROR node
    // anywhere in the tree becomes a SyntaxErrorNode, not just stray
    // top-level lines.
    collect_errors(tree_root, source, &mut file.syntax_errors);
    file
}

fn collect_errors(node: &CstNode, source: &str, out: &mut Vec<SyntaxErrorNode>) {
    if node.kind == kind::ERROR {
        out.push(SyntaxErrorNode {
            code: "parse_error",
            message: format!("unparsable: {}", node.text(source)),
            text: node.text(source).to_string(),
            location: Location::from_node(node),
        });
    }
    for child in &node.children {
        collect_errors(child, source, out);
    }
}

fn extract_entry(node: &CstNode, source: &str, file: &mut SourceFile) {
    let Some(header) = node.child_of_kind(kind::HEADER) else {
        return;
    };
    let Some(directive_node) = header.child_of_kind(kind::DIRECTIVE) else {
        file.syntax_errors.push(SyntaxErrorNode {
            code: "parse_error",
            message: "entry header missing directive".to_string(),
            text: node.text(source).to_string(),
            location: Location::from_node(node),
        });
        return;
    };
    let directive = directive_node.text(source);
    let timestamp = header
        .child_of_kind(kind::TIMESTAMP)
        .map(|n| n.text(source).to_string())
        .unwrap_or_default();
    let argument = header.child_of_kind(kind::ARGUMENT).map(|n| n.text(source).to_string());
    let title = header
        .child_of_kind(kind::TITLE)
        .map(|n| unquote(n.text(source)));
    let link = header
        .child_of_kind(kind::LINK)
        .map(|n| n.text(source).trim_start_matches('^').to_string());
    let tags = header
        .children_of_kind(kind::TAG)
        .map(|n| n.text(source).trim_start_matches('#').to_string())
        .collect::<Vec<_>>();
    let location = Location::from_node(node);
    let header_location = Location::from_node(header);

    match directive {
        "create" | "update" => {
            let entity = argument.unwrap_or_default();
            let metadata = extract_metadata(node, source);
            let content = extract_content(node, source);
            file.entries.push(Entry::Instance(InstanceEntry {
                header: InstanceHeader {
                    timestamp,
                    directive: if directive == "create" {
                        InstanceDirective::Create
                    } else {
                        InstanceDirective::Update
                    },
                    entity,
                    title,
                    link,
                    tags,
                    location: header_location,
                },
                metadata,
                content,
                location,
            }));
        }
        "define-entity" | "alter-entity" => {
            let entity_name = argument.unwrap_or_default();
            let blocks = extract_schema_blocks(node, source);
            file.entries.push(Entry::Schema(SchemaEntry {
                header: SchemaHeader {
                    timestamp,
                    directive: if directive == "define-entity" {
                        SchemaDirective::DefineEntity
                    } else {
                        SchemaDirective::AlterEntity
                    },
                    entity_name,
                    title,
                    link,
                    tags,
                    location: header_location,
                },
                blocks,
                location,
            }));
        }
        "define-synthesis" => {
            // The unified `argument` slot is reinterpreted as the mandatory
            // link id for synthesis entries, per the AST extractor contract.
            let link_id = argument
                .or_else(|| link.clone())
                .unwrap_or_default()
                .trim_start_matches('^')
                .to_string();
            let metadata = extract_metadata(node, source);
            let content = extract_content(node, source);
            file.entries.push(Entry::Synthesis(SynthesisEntry {
                header: SynthesisHeader {
                    timestamp,
                    link_id,
                    title,
                    tags,
                    location: header_location,
                },
                metadata,
                content,
                location,
            }));
        }
        "actualize-synthesis" => {
            let target = argument
                .unwrap_or_default()
                .trim_start_matches('^')
                .to_string();
            let metadata = extract_metadata(node, source);
            file.entries.push(Entry::Actualize(ActualizeEntry {
                header: ActualizeHeader {
                    timestamp,
                    target,
                    location: header_location,
                },
                metadata,
                location,
            }));
        }
        _ => {
            file.syntax_errors.push(SyntaxErrorNode {
                code: "parse_error",
                message: format!("unknown directive {directive:?}"),
                text: node.text(source).to_string(),
                location,
            });
        }
    }
}

fn extract_metadata(entry_node: &CstNode, source: &str) -> Vec<MetadataEntry> {
    entry_node
        .children_of_kind(kind::METADATA_LINE)
        .filter_map(|line| {
            let key = line.child_of_kind(kind::METADATA_KEY)?.text(source).to_string();
            let value_node = line.child_of_kind(kind::METADATA_VALUE)?;
            let value = parse_value_text(value_node.text(source));
            Some(MetadataEntry {
                key,
                value,
                location: Location::from_node(line),
            })
        })
        .collect()
}

fn extract_content(entry_node: &CstNode, source: &str) -> Option<String> {
    let content = entry_node.child_of_kind(kind::CONTENT)?;
    let lines: Vec<&str> = content
        .children_of_kind(kind::CONTENT_LINE)
        .map(|l| l.text(source))
        .collect();
    Some(lines.join("\n"))
}

fn extract_schema_blocks(entry_node: &CstNode, source: &str) -> SchemaBlocks {
    let mut blocks = SchemaBlocks::default();
    for block in entry_node.children_of_kind(kind::BLOCK) {
        let Some(header) = block.child_of_kind(kind::BLOCK_HEADER) else {
            continue;
        };
        let header_text = header.text(source);
        if header_text.contains("Remove") {
            let name_kind = if header_text.contains("Sections") {
                kind::SECTION_LINE
            } else {
                kind::FIELD_LINE
            };
            let names: Vec<String> = block
                .children_of_kind(name_kind)
                .map(|n| n.text(source).trim().trim_end_matches(':').to_string())
                .collect();
            if header_text.contains("Sections") {
                blocks.remove_sections_block.extend(names);
            } else {
                blocks.remove_metadata_block.extend(names);
            }
        } else if header_text.contains("Sections") {
            for line in block.children_of_kind(kind::SECTION_LINE) {
                blocks
                    .sections_block
                    .push(parse_section_decl(line, source));
            }
        } else {
            for line in block.children_of_kind(kind::FIELD_LINE) {
                blocks.metadata_block.push(parse_field_decl(line, source));
            }
        }
    }
    blocks
}

static FIELD_DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(\w[\w-]*)(\?)?:\s*(.+?)(\s*=\s*(.+))?$"#).unwrap());

fn parse_field_decl(node: &CstNode, source: &str) -> FieldSchemaDecl {
    let text = node.text(source).trim();
    let location = Location::from_node(node);
    if let Some(caps) = FIELD_DECL_RE.captures(text) {
        let name = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
        let optional = caps.get(2).is_some();
        let type_text = caps.get(3).map(|m| m.as_str().trim()).unwrap_or("");
        let default_value = caps.get(5).map(|m| m.as_str().trim().to_string());
        let ty = parse_type_expression(type_text, location);
        FieldSchemaDecl {
            name,
            optional,
            ty,
            default_value,
            description: None,
            location,
        }
    } else {
        FieldSchemaDecl {
            name: text.to_string(),
            optional: false,
            ty: TypeExpression::Error {
                unknown_identifier: text.to_string(),
                location,
            },
            default_value: None,
            description: None,
            location,
        }
    }
}

fn parse_section_decl(node: &CstNode, source: &str) -> SectionSchemaDecl {
    let text = node.text(source).trim();
    let (name, optional) = match text.strip_suffix('?') {
        Some(stripped) => (stripped.trim_end_matches(':').to_string(), true),
        None => (text.trim_end_matches(':').to_string(), false),
    };
    SectionSchemaDecl {
        name,
        optional,
        location: Location::from_node(node),
    }
}

/// Parses a field's declared type expression. Array (`[T]`) and union
/// (`A | B`) compose recursively; an unrecognized identifier becomes
/// [`TypeExpression::Error`], which propagates through any enclosing
/// array/union per the C4 contract.
/// Parses a type expression outside the context of a schema field
/// declaration, for the fragment parser. Uses a zero-width location since
/// there is no enclosing field line to anchor it to.
pub fn parse_type_expression_fragment(text: &str) -> TypeExpression {
    let zero = Location {
        start_index: 0,
        end_index: 0,
        start_position: Position::new(0, 0),
        end_position: Position::new(0, 0),
    };
    parse_type_expression(text, zero)
}

fn parse_type_expression(text: &str, location: Location) -> TypeExpression {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return TypeExpression::Array(Box::new(parse_type_expression(inner, location)));
    }
    if text.contains('|') {
        let members = text
            .split('|')
            .map(|m| parse_type_expression(m.trim(), location))
            .collect();
        return TypeExpression::Union(members);
    }
    if text.starts_with('"') && text.ends_with('"') && text.len() >= 2 {
        return TypeExpression::Literal(text[1..text.len() - 1].to_string());
    }
    match Primitive::from_name(text) {
        Some(p) => TypeExpression::Primitive(p),
        None => TypeExpression::Error {
            unknown_identifier: text.to_string(),
            location,
        },
    }
}

fn unquote(text: &str) -> String {
    text.trim_start_matches('"').trim_end_matches('"').to_string()
}

static LINK_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\^[A-Za-z0-9_-]+$").unwrap());
static DATETIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})(T(\d{2}:\d{2}(:\d{2})?))?(Z|[+-]\d{2}:\d{2})?$").unwrap());
static DATE_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}\.\.\d{4}-\d{2}-\d{2}$").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());
static QUERY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^query\((.*)\)$").unwrap());

/// Parses a raw metadata value's text into its typed representation.
/// Unrecognized content falls back to [`MetadataValue::Quoted`] carrying the
/// raw text, matching C4's lenient-fallback contract.
pub fn parse_value_text(raw: &str) -> MetadataValue {
    let trimmed = raw.trim();

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let inner = &trimmed[1..trimmed.len() - 1];
        let elements = split_array_elements(inner)
            .into_iter()
            .map(|e| parse_value_text(e.trim()))
            .collect();
        return MetadataValue::Array(ValueArray {
            raw: raw.to_string(),
            elements,
        });
    }

    if let Some(caps) = QUERY_RE.captures(trimmed) {
        return MetadataValue::Query(QueryValue {
            raw: raw.to_string(),
            query: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
        });
    }

    if LINK_VALUE_RE.is_match(trimmed) {
        return MetadataValue::Link(LinkValue {
            raw: raw.to_string(),
            id: trimmed.trim_start_matches('^').to_string(),
        });
    }

    if DATE_RANGE_RE.is_match(trimmed) {
        return MetadataValue::DateRange(DateRangeValue { raw: raw.to_string() });
    }

    if let Some(caps) = DATETIME_RE.captures(trimmed) {
        return MetadataValue::Datetime(DatetimeValue {
            raw: raw.to_string(),
            date: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
            time: caps.get(3).map(|m| m.as_str().to_string()),
            tz: caps.get(5).map(|m| m.as_str().to_string()),
        });
    }

    if NUMBER_RE.is_match(trimmed) {
        if let Ok(value) = trimmed.parse::<f64>() {
            return MetadataValue::Number(NumberValue {
                raw: raw.to_string(),
                value,
            });
        }
    }

    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        return MetadataValue::Quoted(QuotedValue {
            raw: raw.to_string(),
            content: unquote(trimmed),
        });
    }

    // Lenient fallback: unrecognized content is still a QuotedValue carrying
    // the raw text, rather than a parse failure.
    MetadataValue::Quoted(QuotedValue {
        raw: raw.to_string(),
        content: trimmed.to_string(),
    })
}

fn split_array_elements(inner: &str) -> Vec<&str> {
    if inner.trim().is_empty() {
        return Vec::new();
    }
    let mut elements = Vec::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => depth += 1,
            ']' if !in_quotes => depth -= 1,
            ',' if !in_quotes && depth == 0 => {
                elements.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    elements.push(&inner[start..]);
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cst::parse;

    #[test]
    fn extracts_instance_entry() {
        let source = "2026-01-05T18:00Z create journal \"Test\" #test\n  field: value\n";
        let tree = parse(source);
        let file = extract(&tree.root, source);
        assert_eq!(file.entries.len(), 1);
        match &file.entries[0] {
            Entry::Instance(e) => {
                assert_eq!(e.header.entity, "journal");
                assert_eq!(e.header.title.as_deref(), Some("Test"));
                assert_eq!(e.header.tags, vec!["test".to_string()]);
                assert_eq!(e.metadata.len(), 1);
                assert_eq!(e.metadata[0].key, "field");
            }
            other => panic!("expected instance entry, got {other:?}"),
        }
    }

    #[test]
    fn extracts_schema_entry_fields_and_sections() {
        let source = "2026-01-05T18:00Z define-entity lore \"Lore\"\n  # Metadata\n    subject: string\n    tags?: [string]\n";
        let tree = parse(source);
        let file = extract(&tree.root, source);
        match &file.entries[0] {
            Entry::Schema(e) => {
                assert_eq!(e.blocks.metadata_block.len(), 2);
                assert_eq!(e.blocks.metadata_block[0].name, "subject");
                assert!(!e.blocks.metadata_block[0].optional);
                assert!(e.blocks.metadata_block[1].optional);
                assert!(matches!(e.blocks.metadata_block[1].ty, TypeExpression::Array(_)));
            }
            other => panic!("expected schema entry, got {other:?}"),
        }
    }

    #[test]
    fn unknown_type_propagates_through_array() {
        let source = "2026-01-05T18:00Z define-entity lore \"Lore\"\n  # Metadata\n    subject: [bogus]\n";
        let tree = parse(source);
        let file = extract(&tree.root, source);
        match &file.entries[0] {
            Entry::Schema(e) => match &e.blocks.metadata_block[0].ty {
                TypeExpression::Array(inner) => assert!(matches!(**inner, TypeExpression::Error { .. })),
                other => panic!("expected array, got {other:?}"),
            },
            other => panic!("expected schema entry, got {other:?}"),
        }
    }

    #[test]
    fn parses_link_and_quoted_metadata_values() {
        assert!(matches!(parse_value_text("^abc"), MetadataValue::Link(_)));
        assert!(matches!(parse_value_text("\"hi\""), MetadataValue::Quoted(_)));
        assert!(matches!(parse_value_text("42"), MetadataValue::Number(_)));
        assert!(matches!(parse_value_text("[^a, ^b]"), MetadataValue::Array(_)));
    }

    #[test]
    fn identity_prefers_explicit_link() {
        let source = "2026-01-05T18:00Z create journal ^j1 \"Title\"\n";
        let tree = parse(source);
        let file = extract(&tree.root, source);
        assert_eq!(file.entries[0].identity(), "^j1");
    }

    #[test]
    fn title_survives_after_explicit_link() {
        let source = "2026-01-05T18:00Z create journal ^j0 \"Base\"\n";
        let tree = parse(source);
        let file = extract(&tree.root, source);
        match &file.entries[0] {
            Entry::Instance(e) => {
                assert_eq!(e.header.title.as_deref(), Some("Base"));
                assert_eq!(e.header.link.as_deref(), Some("j0"));
            }
            other => panic!("expected instance entry, got {other:?}"),
        }
        assert!(file.syntax_errors.is_empty());
    }

    #[test]
    fn nested_header_error_surfaces_as_syntax_error() {
        // A bare word following the recognized attributes isn't a valid
        // title/link/tag, so the header parser leaves an ERROR nested
        // inside HEADER rather than as a sibling of ENTRY.
        let source = "2026-01-05T18:00Z create journal ^j0 garbage\n";
        let tree = parse(source);
        let file = extract(&tree.root, source);
        assert_eq!(file.syntax_errors.len(), 1);
        assert!(file.syntax_errors[0].text.contains("garbage"));
    }

    #[test]
    fn synthesis_entry_reinterprets_argument_as_link_id() {
        let source = "2026-01-05T18:00Z define-synthesis ^syn1 \"Weekly\"\n";
        let tree = parse(source);
        let file = extract(&tree.root, source);
        match &file.entries[0] {
            Entry::Synthesis(e) => assert_eq!(e.header.link_id, "syn1"),
            other => panic!("expected synthesis entry, got {other:?}"),
        }
    }
}
