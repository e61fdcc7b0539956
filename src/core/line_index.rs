//! O(log n) offset <-> (line, column) mapping and edit-range computation.
//!
//! Grounded on the line-start-offset binary search in
//! `core/parsers/json.rs::build_line_index` / `offset_to_line`, generalized
//! here from line-only lookup to a full `(line, column)` round trip plus
//! `Edit` computation for the incremental parser.

/// A zero-based `(row, column)` position. Columns are byte offsets from the
/// start of the line, not grapheme-aware - this matches the byte-oriented
/// contract the concrete-syntax tree uses throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// The byte ranges an incremental parse needs: the touched span in both the
/// old and new source, plus the `(row, column)` of each endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start_index: usize,
    pub old_end_index: usize,
    pub new_end_index: usize,
    pub start_position: Position,
    pub old_end_position: Position,
    pub new_end_position: Position,
}

/// Precomputed line-start offsets for a source string, enabling O(log n)
/// offset <-> position conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the first character of each line. Always starts at 0.
    line_starts: Vec<usize>,
    source_len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        Self {
            line_starts: build_line_starts(source),
            source_len: source.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where `line` starts. Clamps to the last line if out of range.
    pub fn line_start(&self, line: usize) -> usize {
        let line = line.min(self.line_starts.len().saturating_sub(1));
        self.line_starts[line]
    }

    /// Byte offset one past the end of `line`'s content, not including its
    /// trailing newline. Clamps to `source_len` on the final line.
    pub fn line_end(&self, line: usize) -> usize {
        if line + 1 < self.line_starts.len() {
            let next_start = self.line_starts[line + 1];
            // Strip the newline character(s) that separate this line from the next.
            next_start.saturating_sub(1)
        } else {
            self.source_len
        }
    }

    /// Converts a byte offset into a `(row, column)` position. Out-of-range
    /// offsets clamp to the nearest valid position.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source_len);
        let row = offset_to_line(&self.line_starts, offset);
        let column = offset - self.line_starts[row];
        Position::new(row, column)
    }

    /// Converts a `(row, column)` position back into a byte offset. Clamps
    /// rows past the last line and columns past line length.
    pub fn position_to_offset(&self, position: Position) -> usize {
        let row = position.row.min(self.line_starts.len().saturating_sub(1));
        let line_start = self.line_starts[row];
        let line_end = self.line_end(row);
        (line_start + position.column).min(line_end)
    }

    /// Builds an [`Edit`] from a `(start, end)` row/column range and the
    /// replacement text, for feeding to the incremental parser.
    pub fn compute_edit(
        &self,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
        new_text: &str,
    ) -> Edit {
        let start_position = Position::new(start_line, start_col);
        let old_end_position = Position::new(end_line, end_col);
        let start_index = self.position_to_offset(start_position);
        let old_end_index = self.position_to_offset(old_end_position);

        let new_end_index = start_index + new_text.len();
        let mut row = start_line;
        let mut last_newline = None;
        for (i, b) in new_text.bytes().enumerate() {
            if b == b'\n' {
                row += 1;
                last_newline = Some(i);
            }
        }
        let col = match last_newline {
            Some(i) => new_text.len() - i - 1,
            None => start_col + new_text.len(),
        };
        let new_end_position = Position::new(row, col);

        Edit {
            start_index,
            old_end_index,
            new_end_index,
            start_position,
            old_end_position,
            new_end_position,
        }
    }
}

fn build_line_starts(source: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in source.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

fn offset_to_line(line_starts: &[usize], offset: usize) -> usize {
    match line_starts.binary_search(&offset) {
        Ok(line) => line,
        Err(insertion_point) => insertion_point.saturating_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let idx = LineIndex::new("hello world");
        assert_eq!(idx.line_count(), 1);
        assert_eq!(idx.offset_to_position(0), Position::new(0, 0));
        assert_eq!(idx.offset_to_position(5), Position::new(0, 5));
    }

    #[test]
    fn multi_line() {
        let idx = LineIndex::new("abc\ndef\nghi");
        assert_eq!(idx.line_count(), 3);
        assert_eq!(idx.offset_to_position(4), Position::new(1, 0));
        assert_eq!(idx.offset_to_position(8), Position::new(2, 0));
        assert_eq!(idx.offset_to_position(10), Position::new(2, 2));
    }

    #[test]
    fn roundtrip_all_offsets() {
        let source = "2026-01-05T18:00Z create journal \"Test\"\n  field: value\n";
        let idx = LineIndex::new(source);
        for offset in 0..=source.len() {
            let pos = idx.offset_to_position(offset);
            assert_eq!(idx.position_to_offset(pos), offset, "offset {offset}");
        }
    }

    #[test]
    fn clamp_out_of_range() {
        let idx = LineIndex::new("abc\ndef");
        assert_eq!(idx.offset_to_position(1000), idx.offset_to_position(7));
        assert_eq!(idx.position_to_offset(Position::new(50, 0)), 7);
    }

    #[test]
    fn compute_edit_single_line_insert() {
        let idx = LineIndex::new("abc\ndef\nghi");
        let edit = idx.compute_edit(1, 1, 1, 1, "XY");
        assert_eq!(edit.start_index, 5);
        assert_eq!(edit.old_end_index, 5);
        assert_eq!(edit.new_end_index, 7);
        assert_eq!(edit.new_end_position, Position::new(1, 3));
    }

    #[test]
    fn compute_edit_multiline_insert() {
        let idx = LineIndex::new("abc\ndef\nghi");
        let edit = idx.compute_edit(0, 1, 0, 1, "X\nY");
        assert_eq!(edit.new_end_position, Position::new(1, 1));
    }

    #[test]
    fn line_end_strips_newline() {
        let idx = LineIndex::new("abc\ndef");
        assert_eq!(idx.line_end(0), 3);
        assert_eq!(idx.line_end(1), 7);
    }
}
