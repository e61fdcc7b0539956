//! Concrete-syntax tree and the lexer/parser that build it.
//!
//! The core spec names Tree-Sitter as the parsing technology and treats its
//! grammar as a fixed external dependency outside this crate's scope. No
//! buildable Thalo Tree-Sitter grammar exists anywhere in this workspace, and
//! hand-authoring one to satisfy a `tree-sitter-thalo` dependency line would
//! be fabricating a dependency. Instead this module implements its own lexer
//! and recursive-descent parser, producing a [`CstNode`] tree with the exact
//! span/position contract Tree-Sitter would have provided: `start_byte`,
//! `end_byte`, `start_position`, `end_position`, `kind`, `children`,
//! `is_error`. This mirrors how the parser this crate was generalized from
//! handles its own source language: a hand-written recursive-descent parser,
//! not Tree-Sitter.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::line_index::Position;

/// Node kinds produced by the parser. Stored as `&'static str` (matching
/// Tree-Sitter's `kind()` contract) rather than an enum so that `ERROR`
/// nodes and recovery nodes can share the same representation as real ones.
pub mod kind {
    pub const SOURCE_FILE: &str = "source_file";
    pub const ENTRY: &str = "entry";
    pub const HEADER: &str = "header";
    pub const TIMESTAMP: &str = "timestamp";
    pub const DIRECTIVE: &str = "directive";
    pub const ARGUMENT: &str = "argument";
    pub const TITLE: &str = "title";
    pub const LINK: &str = "link";
    pub const TAG: &str = "tag";
    pub const METADATA_LINE: &str = "metadata_line";
    pub const METADATA_KEY: &str = "metadata_key";
    pub const METADATA_VALUE: &str = "metadata_value";
    pub const CONTENT: &str = "content";
    pub const CONTENT_LINE: &str = "content_line";
    pub const BLOCK: &str = "block";
    pub const BLOCK_HEADER: &str = "block_header";
    pub const FIELD_LINE: &str = "field_line";
    pub const SECTION_LINE: &str = "section_line";
    pub const ERROR: &str = "ERROR";
}

/// One node of the concrete syntax tree. Spans are byte offsets relative to
/// the block (not the file) that was parsed; [`crate::core::source_map::SourceMap`]
/// translates them to file-absolute coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstNode {
    pub kind: &'static str,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_position: Position,
    pub end_position: Position,
    pub children: Vec<CstNode>,
    pub is_error: bool,
    /// Present on leaf nodes (tokens); `None` on nodes that exist purely to
    /// group children.
    pub text: Option<String>,
}

impl CstNode {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start_byte..self.end_byte]
    }

    pub fn children_of_kind<'a>(&'a self, kind: &'static str) -> impl Iterator<Item = &'a CstNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    pub fn child_of_kind(&self, kind: &'static str) -> Option<&CstNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// True if this node or any descendant is an `ERROR` node.
    pub fn has_errors(&self) -> bool {
        self.is_error || self.children.iter().any(CstNode::has_errors)
    }
}

/// A parsed source (one block's worth). Tracks each top-level entry's byte
/// span so [`parse_incremental`] can locate which entries an edit touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstTree {
    pub root: CstNode,
}

impl CstTree {
    pub fn entry_spans(&self) -> Vec<(usize, usize)> {
        self.root
            .children_of_kind(kind::ENTRY)
            .map(|e| (e.start_byte, e.end_byte))
            .collect()
    }
}

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2})?(Z|[+-]\d{2}:\d{2})?").unwrap()
});
static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(create|update|define-synthesis|actualize-synthesis|define-entity|alter-entity)")
        .unwrap()
});
static IDENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\^[A-Za-z0-9_-]+").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#[A-Za-z0-9_-]+").unwrap());
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^"[^"\n]*""#).unwrap());

const SCHEMA_DIRECTIVES: [&str; 2] = ["define-entity", "alter-entity"];

/// Parses a full block's source from scratch.
pub fn parse(source: &str) -> CstTree {
    let mut parser = Parser::new(source);
    CstTree {
        root: parser.parse_source_file(),
    }
}

/// Reparses `source` reusing `old_tree` where possible. Locates the minimal
/// span of top-level children (entries, or stray error lines) overlapping
/// the supplied edit range, reparses only that span, and splices the result
/// between the untouched leading children (left as-is) and the untouched
/// trailing children (kept, with their byte offsets and positions shifted
/// by the edit's length delta). This is not true incremental lexing, but it
/// satisfies the incremental-parity property: the resulting tree is
/// structurally equal to a full reparse of `source`.
///
/// Falls back to a full reparse whenever the supplied edit range doesn't
/// line up with `old_tree` (e.g. `old_tree` wasn't actually parsed from the
/// pre-edit source) rather than risk splicing a tree that disagrees with
/// `source`.
pub fn parse_incremental(
    source: &str,
    old_tree: Option<&CstTree>,
    edit_start: usize,
    edit_old_end: usize,
    edit_new_end: usize,
) -> CstTree {
    let Some(old_tree) = old_tree else {
        return parse(source);
    };
    if edit_old_end > old_tree.root.end_byte || edit_start > edit_old_end || edit_new_end < edit_start {
        return parse(source);
    }
    let shift = edit_new_end as isize - edit_old_end as isize;
    let children = &old_tree.root.children;
    let spans: Vec<(usize, usize)> = children.iter().map(|c| (c.start_byte, c.end_byte)).collect();

    // First child whose span extends past the edit's start, and last child
    // whose span begins before the edit's old end. If the first index comes
    // after the last, no existing child overlaps the edit (it landed in a
    // gap, e.g. a brand new entry inserted between two others); otherwise
    // every child in `[first, last]` is touched and gets reparsed.
    let first_idx = spans.iter().position(|&(_, e)| e > edit_start).unwrap_or(spans.len());
    let last_idx = spans.iter().rposition(|&(s, _)| s < edit_old_end);
    let touched = last_idx.filter(|&last| first_idx <= last).map(|last| (first_idx, last));

    let (region_start, region_end_old, lead_count, trail_start_idx) = match touched {
        Some((first, last)) => (spans[first].0, spans[last].1.max(edit_old_end), first, last + 1),
        None => {
            let region_start = last_idx.map(|i| spans[i].1).unwrap_or(0);
            let region_end_old = if first_idx < spans.len() { spans[first_idx].0 } else { old_tree.root.end_byte };
            (region_start, region_end_old, first_idx, first_idx)
        }
    };

    if region_start > edit_start || region_end_old < edit_old_end {
        // The computed region doesn't actually cover the edit; the offsets
        // we were given don't match `old_tree`. Reparse from scratch.
        return parse(source);
    }
    let region_end_new = region_end_old as isize + shift;
    if region_end_new < region_start as isize || region_end_new as usize > source.len() {
        return parse(source);
    }
    let region_end_new = region_end_new as usize;

    let leading: Vec<CstNode> = children[..lead_count].to_vec();
    let trailing: Vec<CstNode> = children[trail_start_idx..].iter().map(|n| shift_node(n, shift, source)).collect();

    let mut sub_parser = Parser::new(&source[region_start..region_end_new]);
    let spliced_root = sub_parser.parse_source_file();
    let spliced: Vec<CstNode> =
        spliced_root.children.into_iter().map(|n| offset_node(n, region_start, source)).collect();

    let mut entries = leading;
    entries.extend(spliced);
    entries.extend(trailing);

    CstTree {
        root: CstNode {
            kind: kind::SOURCE_FILE,
            start_byte: 0,
            end_byte: source.len(),
            start_position: Position::new(0, 0),
            end_position: position_at(source, source.len()),
            children: entries,
            is_error: false,
            text: None,
        },
    }
}

fn position_at(source: &str, offset: usize) -> Position {
    let mut row = 0;
    let mut last_newline = None;
    for (i, b) in source.as_bytes()[..offset].iter().enumerate() {
        if *b == b'\n' {
            row += 1;
            last_newline = Some(i);
        }
    }
    let column = match last_newline {
        Some(i) => offset - i - 1,
        None => offset,
    };
    Position::new(row, column)
}

/// Relocates an untouched trailing node (and its descendants) by `shift`
/// bytes, recomputing line/column positions against the new source (the
/// edit may have added or removed newlines, so row numbers can't just be
/// copied from the old tree).
fn shift_node(node: &CstNode, shift: isize, new_source: &str) -> CstNode {
    let start = (node.start_byte as isize + shift) as usize;
    let end = (node.end_byte as isize + shift) as usize;
    CstNode {
        kind: node.kind,
        start_byte: start,
        end_byte: end,
        start_position: position_at(new_source, start),
        end_position: position_at(new_source, end),
        children: node.children.iter().map(|c| shift_node(c, shift, new_source)).collect(),
        is_error: node.is_error,
        text: node.text.clone(),
    }
}

/// Translates a node produced by reparsing a sub-slice of `new_source`
/// (offsets relative to the slice start) into full-source-relative offsets.
fn offset_node(node: CstNode, delta: usize, new_source: &str) -> CstNode {
    let start = node.start_byte + delta;
    let end = node.end_byte + delta;
    CstNode {
        kind: node.kind,
        start_byte: start,
        end_byte: end,
        start_position: position_at(new_source, start),
        end_position: position_at(new_source, end),
        children: node.children.into_iter().map(|c| offset_node(c, delta, new_source)).collect(),
        is_error: node.is_error,
        text: node.text,
    }
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn position_at(&self, offset: usize) -> Position {
        // Recomputed from scratch rather than threading a LineIndex through;
        // parsing happens once per block and this keeps the parser decoupled
        // from LineIndex's lifetime.
        position_at(self.source, offset)
    }

    fn remaining(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn line_end(&self) -> usize {
        self.source[self.pos..]
            .find('\n')
            .map(|i| self.pos + i)
            .unwrap_or(self.source.len())
    }

    fn current_line(&self) -> &'a str {
        &self.source[self.pos..self.line_end()]
    }

    fn advance_to(&mut self, offset: usize) {
        self.pos = offset;
    }

    fn skip_line(&mut self) {
        let end = self.line_end();
        self.pos = (end + 1).min(self.source.len());
    }

    fn leaf(&self, kind: &'static str, start: usize, end: usize) -> CstNode {
        CstNode {
            kind,
            start_byte: start,
            end_byte: end,
            start_position: self.position_at(start),
            end_position: self.position_at(end),
            children: Vec::new(),
            is_error: false,
            text: Some(self.source[start..end].to_string()),
        }
    }

    fn node(&self, kind: &'static str, start: usize, end: usize, children: Vec<CstNode>) -> CstNode {
        CstNode {
            kind,
            start_byte: start,
            end_byte: end,
            start_position: self.position_at(start),
            end_position: self.position_at(end),
            children,
            is_error: false,
            text: None,
        }
    }

    fn error(&self, start: usize, end: usize) -> CstNode {
        CstNode {
            kind: kind::ERROR,
            start_byte: start,
            end_byte: end,
            start_position: self.position_at(start),
            end_position: self.position_at(end),
            children: Vec::new(),
            is_error: true,
            text: Some(self.source[start..end].to_string()),
        }
    }

    fn parse_source_file(&mut self) -> CstNode {
        let start = 0;
        let mut entries = Vec::new();
        while !self.at_end() {
            let line = self.current_line();
            if line.trim().is_empty() {
                self.skip_line();
                continue;
            }
            if TIMESTAMP_RE.is_match(line) {
                entries.push(self.parse_entry());
            } else {
                // A non-blank, non-indented line that isn't a timestamp is
                // unparsable at the top level.
                let line_end = self.line_end();
                entries.push(self.error(self.pos, line_end));
                self.skip_line();
            }
        }
        self.node(kind::SOURCE_FILE, start, self.source.len(), entries)
    }

    fn parse_entry(&mut self) -> CstNode {
        let entry_start = self.pos;
        let header = self.parse_header();
        let is_schema = header
            .child_of_kind(kind::DIRECTIVE)
            .map(|d| SCHEMA_DIRECTIVES.contains(&d.text(self.source)))
            .unwrap_or(false);

        let mut children = vec![header];
        if is_schema {
            children.extend(self.parse_blocks());
        } else {
            children.extend(self.parse_metadata_lines());
            if let Some(content) = self.parse_content() {
                children.push(content);
            }
        }
        let entry_end = children.last().map(|c| c.end_byte).unwrap_or(self.pos);
        self.node(kind::ENTRY, entry_start, entry_end, children)
    }

    fn parse_header(&mut self) -> CstNode {
        let header_start = self.pos;
        let line_end = self.line_end();
        let line = &self.source[self.pos..line_end];
        let mut children = Vec::new();
        let mut cursor = self.pos;

        if let Some(m) = TIMESTAMP_RE.find(line) {
            let end = cursor + m.end();
            children.push(self.leaf(kind::TIMESTAMP, cursor, end));
            cursor = end;
        } else {
            children.push(self.error(cursor, line_end));
            self.skip_line();
            return self.node(kind::HEADER, header_start, line_end, children);
        }

        cursor = skip_ws(self.source, cursor, line_end);
        let rest = &self.source[cursor..line_end];
        if let Some(m) = DIRECTIVE_RE.find(rest) {
            let end = cursor + m.end();
            children.push(self.leaf(kind::DIRECTIVE, cursor, end));
            cursor = end;
        } else {
            children.push(self.error(cursor, line_end));
        }

        cursor = skip_ws(self.source, cursor, line_end);
        let rest = &self.source[cursor..line_end];
        if let Some(m) = LINK_RE.find(rest) {
            let end = cursor + m.end();
            children.push(self.leaf(kind::ARGUMENT, cursor, end));
            cursor = end;
        } else if let Some(m) = IDENT_RE.find(rest) {
            let end = cursor + m.end();
            children.push(self.leaf(kind::ARGUMENT, cursor, end));
            cursor = end;
        }

        // Title, link and tag can appear in any order after the entity name
        // (`create journal ^j0 "Title" #tag` and `create journal "Title" ^j0`
        // are both well-formed), so all three are tried on every iteration
        // rather than reserving one fixed slot for the title.
        loop {
            cursor = skip_ws(self.source, cursor, line_end);
            if cursor >= line_end {
                break;
            }
            let rest = &self.source[cursor..line_end];
            if let Some(m) = TITLE_RE.find(rest) {
                let end = cursor + m.end();
                children.push(self.leaf(kind::TITLE, cursor, end));
                cursor = end;
            } else if let Some(m) = LINK_RE.find(rest) {
                let end = cursor + m.end();
                children.push(self.leaf(kind::LINK, cursor, end));
                cursor = end;
            } else if let Some(m) = TAG_RE.find(rest) {
                let end = cursor + m.end();
                children.push(self.leaf(kind::TAG, cursor, end));
                cursor = end;
            } else {
                children.push(self.error(cursor, line_end));
                break;
            }
        }

        self.advance_to((line_end + 1).min(self.source.len()));
        self.node(kind::HEADER, header_start, line_end, children)
    }

    /// Lines indented exactly two spaces that are not `  # ...` block
    /// headers, in the form `key: value`.
    fn parse_metadata_lines(&mut self) -> Vec<CstNode> {
        let mut out = Vec::new();
        while !self.at_end() {
            let line = self.current_line();
            if !is_indented(line, 2) || line.trim_start().starts_with('#') {
                break;
            }
            out.push(self.parse_metadata_line());
        }
        out
    }

    fn parse_metadata_line(&mut self) -> CstNode {
        let start = self.pos;
        let line_end = self.line_end();
        let line = &self.source[start..line_end];
        let indent = line.len() - line.trim_start().len();
        let key_start = start + indent;
        if let Some(colon) = line[indent..].find(':') {
            let key_end = key_start + colon;
            let value_start = (key_end + 1).min(line_end);
            let value_start = skip_ws(self.source, value_start, line_end);
            let key = self.leaf(kind::METADATA_KEY, key_start, key_end);
            let value = self.leaf(kind::METADATA_VALUE, value_start, line_end);
            self.skip_line();
            self.node(kind::METADATA_LINE, start, line_end, vec![key, value])
        } else {
            let err = self.error(start, line_end);
            self.skip_line();
            err
        }
    }

    /// Remaining indented lines (content), until the next unindented line or
    /// a block header marker, whichever is not applicable here since content
    /// entries never carry blocks.
    fn parse_content(&mut self) -> Option<CstNode> {
        let start = self.pos;
        let mut lines = Vec::new();
        while !self.at_end() {
            let line = self.current_line();
            if !is_indented(line, 2) {
                break;
            }
            let line_end = self.line_end();
            lines.push(self.leaf(kind::CONTENT_LINE, self.pos, line_end));
            self.skip_line();
        }
        if lines.is_empty() {
            return None;
        }
        let end = lines.last().unwrap().end_byte;
        Some(self.node(kind::CONTENT, start, end, lines))
    }

    /// `  # Metadata` / `  # Sections` / `  # Remove Metadata` /
    /// `  # Remove Sections` blocks, each followed by four-space-indented
    /// field or section lines.
    fn parse_blocks(&mut self) -> Vec<CstNode> {
        let mut blocks = Vec::new();
        while !self.at_end() {
            let line = self.current_line();
            if !(is_indented(line, 2) && line.trim_start().starts_with('#')) {
                break;
            }
            blocks.push(self.parse_block());
        }
        blocks
    }

    fn parse_block(&mut self) -> CstNode {
        let block_start = self.pos;
        let header_end = self.line_end();
        let header = self.leaf(kind::BLOCK_HEADER, self.pos, header_end);
        self.skip_line();

        let is_remove = header.text(self.source).contains("Remove");
        let is_sections = header.text(self.source).contains("Sections");
        let item_kind = if is_sections {
            kind::SECTION_LINE
        } else {
            kind::FIELD_LINE
        };
        let _ = is_remove;

        let mut items = vec![header];
        while !self.at_end() {
            let line = self.current_line();
            if !is_indented(line, 4) {
                break;
            }
            let item_end = self.line_end();
            items.push(self.leaf(item_kind, self.pos, item_end));
            self.skip_line();
        }
        let end = items.last().unwrap().end_byte;
        self.node(kind::BLOCK, block_start, end, items)
    }
}

fn is_indented(line: &str, min_spaces: usize) -> bool {
    let spaces = line.bytes().take_while(|&b| b == b' ').count();
    spaces >= min_spaces && line.trim().len() > 0
}

fn skip_ws(source: &str, mut pos: usize, limit: usize) -> usize {
    while pos < limit && source.as_bytes()[pos] == b' ' {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_instance_entry() {
        let source = "2026-01-05T18:00Z create journal \"Test\" #test\n  field: value\n";
        let tree = parse(source);
        assert_eq!(tree.root.kind, kind::SOURCE_FILE);
        assert_eq!(tree.root.children.len(), 1);
        let entry = &tree.root.children[0];
        assert_eq!(entry.kind, kind::ENTRY);
        assert!(!entry.has_errors());
        let header = entry.child_of_kind(kind::HEADER).unwrap();
        assert_eq!(header.child_of_kind(kind::DIRECTIVE).unwrap().text(source), "create");
        assert_eq!(header.child_of_kind(kind::ARGUMENT).unwrap().text(source), "journal");
        assert_eq!(header.child_of_kind(kind::TITLE).unwrap().text(source), "\"Test\"");
        assert!(header.child_of_kind(kind::TAG).is_some());
        let metadata = entry.child_of_kind(kind::METADATA_LINE).unwrap();
        assert_eq!(
            metadata.child_of_kind(kind::METADATA_KEY).unwrap().text(source),
            "field"
        );
    }

    #[test]
    fn parses_schema_entry_with_blocks() {
        let source = "2026-01-05T18:00Z define-entity lore \"Lore\"\n  # Metadata\n    subject: string\n";
        let tree = parse(source);
        let entry = &tree.root.children[0];
        let block = entry.child_of_kind(kind::BLOCK).unwrap();
        assert_eq!(block.child_of_kind(kind::BLOCK_HEADER).unwrap().text(source), "  # Metadata");
        assert!(block.child_of_kind(kind::FIELD_LINE).is_some());
    }

    #[test]
    fn unparsable_top_level_line_is_error() {
        let source = "not a timestamp at all\n";
        let tree = parse(source);
        assert!(tree.root.has_errors());
    }

    #[test]
    fn multiple_entries() {
        let source = "2026-01-05T18:00Z create a \"A\"\n2026-01-06T09:00Z create b \"B\"\n";
        let tree = parse(source);
        assert_eq!(tree.root.children.len(), 2);
    }

    #[test]
    fn explicit_link_on_header() {
        let source = "2026-01-05T18:00Z create journal ^j1 \"Title\"\n";
        let tree = parse(source);
        let header = tree.root.children[0].child_of_kind(kind::HEADER).unwrap();
        assert_eq!(header.child_of_kind(kind::ARGUMENT).unwrap().text(source), "journal");
        assert_eq!(header.child_of_kind(kind::LINK).unwrap().text(source), "^j1");
    }

    #[test]
    fn title_after_link_is_still_a_title() {
        let source = "2026-01-05T18:00Z create journal ^j1 \"Title\"\n";
        let tree = parse(source);
        let entry = &tree.root.children[0];
        assert!(!entry.has_errors());
        let header = entry.child_of_kind(kind::HEADER).unwrap();
        assert_eq!(header.child_of_kind(kind::TITLE).unwrap().text(source), "\"Title\"");
        assert_eq!(header.child_of_kind(kind::LINK).unwrap().text(source), "^j1");
    }

    #[test]
    fn incremental_reparse_of_appended_entry_matches_full_reparse() {
        let old_source = "2026-01-05T18:00Z create journal ^a \"A\"\n";
        let old_tree = parse(old_source);

        let new_source = "2026-01-05T18:00Z create journal ^a \"A\"\n2026-01-06T09:00Z create journal ^b \"B\"\n";
        let edit_start = old_source.len();
        let inserted = "2026-01-06T09:00Z create journal ^b \"B\"\n";

        let spliced = parse_incremental(new_source, Some(&old_tree), edit_start, edit_start, edit_start + inserted.len());
        let full = parse(new_source);

        assert_eq!(spliced, full);
    }

    #[test]
    fn incremental_reparse_of_inserted_entry_in_gap_matches_full_reparse() {
        let old_source = "2026-01-01T00:00Z create journal ^a \"A\"\n2026-01-03T00:00Z create journal ^c \"C\"\n";
        let old_tree = parse(old_source);

        let inserted = "2026-01-02T00:00Z create journal ^b \"B\"\n";
        let split_at = "2026-01-01T00:00Z create journal ^a \"A\"\n".len();
        let new_source = format!("{}{}{}", &old_source[..split_at], inserted, &old_source[split_at..]);

        let spliced = parse_incremental(&new_source, Some(&old_tree), split_at, split_at, split_at + inserted.len());
        let full = parse(&new_source);

        assert_eq!(spliced, full);
    }

    #[test]
    fn incremental_reparse_of_edited_title_matches_full_reparse() {
        let old_source = "2026-01-05T18:00Z create journal ^a \"Old\"\n2026-01-06T00:00Z create journal ^b \"Other\"\n";
        let old_tree = parse(old_source);

        let title_start = old_source.find("\"Old\"").unwrap() + 1;
        let new_source = format!("{}New{}", &old_source[..title_start], &old_source[title_start + 3..]);

        let spliced = parse_incremental(&new_source, Some(&old_tree), title_start, title_start + 3, title_start + 3);
        let full = parse(&new_source);

        assert_eq!(spliced, full);
    }
}
