//! Report formatting and printing utilities.
//!
//! Cargo-style diagnostic rendering, kept separate from core logic so the
//! library can be used headlessly. Adapted from the teacher's `report.rs`
//! (`print_issue`/`print_summary`/caret alignment via `unicode-width`) for
//! this crate's flat [`Diagnostic`] shape instead of a per-rule `Issue` enum.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::workspace::Workspace;
use crate::diagnostics::{Diagnostic, Report, Severity};
use crate::merge::{Conflict, MergeResult};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print a report's diagnostics in cargo-style format to stdout, with source
/// context pulled from `workspace`.
pub fn report(workspace: &Workspace, report: &Report) {
    report_to(workspace, report, &mut io::stdout().lock());
}

pub fn report_to<W: Write>(workspace: &Workspace, report: &Report, writer: &mut W) {
    if report.diagnostics.is_empty() {
        return;
    }

    let max_line_width = calculate_max_line_width(&report.diagnostics);
    for diagnostic in &report.diagnostics {
        print_diagnostic(workspace, diagnostic, writer, max_line_width);
    }
    print_summary(report, writer);
}

/// Print a success message when a check finds nothing.
pub fn print_success(files_checked: usize) {
    print_success_to(files_checked, &mut io::stdout().lock());
}

pub fn print_success_to<W: Write>(files_checked: usize, writer: &mut W) {
    let msg = format!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} {} - no issues found",
            files_checked,
            if files_checked == 1 { "file" } else { "files" }
        )
        .green()
    );
    let _ = writeln!(writer, "{}", msg);
}

/// Print a three-way merge result: conflicts in cargo style, then a summary
/// line, to stdout.
pub fn report_merge(result: &MergeResult) {
    report_merge_to(result, &mut io::stdout().lock());
}

pub fn report_merge_to<W: Write>(result: &MergeResult, writer: &mut W) {
    for conflict in &result.conflicts {
        print_conflict(conflict, writer);
    }

    if result.success {
        let _ = writeln!(writer, "{} merge completed with no conflicts", SUCCESS_MARK.green());
    } else {
        let _ = writeln!(
            writer,
            "{} {} {} unresolved",
            FAILURE_MARK.red(),
            result.conflicts.len(),
            if result.conflicts.len() == 1 { "conflict" } else { "conflicts" }.red()
        );
    }
    let _ = writeln!(
        writer,
        "  {} total, {} ours-only, {} theirs-only, {} common, {} auto-merged, {} conflicting",
        result.stats.total_entries,
        result.stats.ours_only,
        result.stats.theirs_only,
        result.stats.common,
        result.stats.auto_merged,
        result.stats.conflicts
    );
}

fn print_conflict<W: Write>(conflict: &Conflict, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{}: {}  {}",
        "conflict".bold().red(),
        conflict.message,
        conflict.kind.dimmed().cyan()
    );
    if !conflict.identity.is_empty() {
        let _ = writeln!(writer, "  {} {}", "-->".blue(), conflict.identity);
    }
    if let Some(key) = &conflict.metadata_key {
        let _ = writeln!(writer, "  {} {} {}", "=".blue(), "field:".bold(), key);
    }
    let _ = writeln!(writer);
}

fn print_diagnostic<W: Write>(workspace: &Workspace, diagnostic: &Diagnostic, writer: &mut W, max_line_width: usize) {
    let severity_str = match diagnostic.severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
        Severity::Off => "off".dimmed(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        diagnostic.message,
        diagnostic.code.dimmed().cyan()
    );

    let line = diagnostic.location.start_position.row + 1;
    let col = diagnostic.location.start_position.column + 1;
    let _ = writeln!(writer, "  {} {}:{}:{}", "-->".blue(), diagnostic.file, line, col);

    if let Some(source_line) = source_line_of(workspace, &diagnostic.file, diagnostic.location.start_position.row) {
        let caret_char = match diagnostic.severity {
            Severity::Error => "^".red(),
            _ => "^".yellow(),
        };

        let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = max_line_width);
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );

        let prefix = if col > 1 {
            source_line.chars().take(col - 1).collect::<String>()
        } else {
            String::new()
        };
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret_char,
            width = max_line_width,
            padding = caret_padding
        );
    }

    if let Some(data) = &diagnostic.data {
        let mut keys: Vec<&String> = data.keys().collect();
        keys.sort();
        for key in keys {
            let _ = writeln!(
                writer,
                "{:>width$} {} {} {}",
                "",
                "=".blue(),
                format!("{key}:").bold(),
                data[key],
                width = max_line_width
            );
        }
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(report: &Report, writer: &mut W) {
    let total_errors = report.error_count();
    let total_warnings = report.warning_count();
    let total_problems = total_errors + total_warnings;

    if total_problems > 0 {
        let _ = writeln!(
            writer,
            "\n{} {} problems ({} {}, {} {})",
            FAILURE_MARK.red(),
            total_problems,
            total_errors,
            if total_errors == 1 { "error" } else { "errors" }.red(),
            total_warnings,
            if total_warnings == 1 { "warning" } else { "warnings" }.yellow()
        );
    }
}

fn source_line_of<'a>(workspace: &'a Workspace, file: &str, row: usize) -> Option<&'a str> {
    workspace.document(file)?.source.lines().nth(row)
}

fn calculate_max_line_width(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .map(|d| d.location.start_position.row + 1)
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::Location;
    use crate::core::line_index::Position;

    fn loc(row: usize, column: usize) -> Location {
        Location {
            start_index: 0,
            end_index: 1,
            start_position: Position::new(row, column),
            end_position: Position::new(row, column + 1),
        }
    }

    fn workspace_with(file: &str, source: &str) -> Workspace {
        let mut ws = Workspace::new();
        ws.add_document(file, source, None);
        ws
    }

    #[test]
    fn report_to_empty_prints_nothing() {
        let ws = Workspace::new();
        let report = Report::new(vec![]);
        let mut output = Vec::new();
        report_to(&ws, &report, &mut output);
        assert!(output.is_empty());
    }

    #[test]
    fn report_to_prints_diagnostic_with_source_context() {
        let source = "2026-01-05T18:00Z create bogus \"Test\"\n";
        let ws = workspace_with("a.thalo", source);
        let diagnostic = Diagnostic::new("unknown-entity", "undeclared entity \"bogus\"", Severity::Error, "a.thalo", loc(0, 0));
        let report = Report::new(vec![diagnostic]);
        let mut output = Vec::new();
        report_to(&ws, &report, &mut output);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("error:"));
        assert!(text.contains("a.thalo:1:1"));
        assert!(text.contains("undeclared entity"));
        assert!(text.contains("1 problems"));
    }

    #[test]
    fn report_merge_to_prints_conflict_and_stats() {
        let result = MergeResult {
            success: false,
            content: String::new(),
            conflicts: vec![Conflict {
                kind: "concurrent-title-change".to_string(),
                identity: "^j1".to_string(),
                metadata_key: None,
                message: "title changed differently on both sides".to_string(),
            }],
            stats: Default::default(),
        };
        let mut output = Vec::new();
        report_merge_to(&result, &mut output);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("conflict:"));
        assert!(text.contains("^j1"));
        assert!(text.contains("1 conflict"));
    }
}
