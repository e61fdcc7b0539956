//! End-to-end scenarios and cross-module properties from the spec's
//! Testable Properties / End-to-End Scenarios sections. Unit tests closer
//! to individual modules (line index round trip, schema composition, link
//! index completeness) live alongside those modules; this file covers
//! behavior that spans the checker, workspace, query and merge layers.

use pretty_assertions::assert_eq;

use thalo_core::core::workspace::Workspace;
use thalo_core::diagnostics::SeverityConfig;
use thalo_core::merge::{merge, MarkerStyle};
use thalo_core::query::run_query;
use thalo_core::rules::{default_rules, run_checks};

fn check(workspace: &Workspace) -> thalo_core::diagnostics::Report {
    run_checks(workspace, &default_rules(), &SeverityConfig::new())
}

/// S1 — Unknown entity.
#[test]
fn s1_unknown_entity() {
    let mut ws = Workspace::new();
    ws.add_document("a.thalo", "2026-01-05T18:00Z create journal \"Test\" #test\n  field: value\n", None);
    let report = check(&ws);
    let diag = report.diagnostics.iter().find(|d| d.code == "unknown-entity").expect("unknown-entity diagnostic");
    assert!(diag.message.contains("journal"));
}

/// S2 — Missing required field.
#[test]
fn s2_missing_required_field() {
    let mut ws = Workspace::new();
    ws.add_document(
        "schema.thalo",
        "2026-01-01T00:00Z define-entity lore \"Lore\"\n  # Metadata\n    subject: string\n",
        None,
    );
    ws.add_document("a.thalo", "2026-01-05T18:00Z create lore \"X\"\n  type: \"fact\"\n", None);
    let report = check(&ws);
    let diag = report
        .diagnostics
        .iter()
        .find(|d| d.code == "missing-required-field")
        .expect("missing-required-field diagnostic");
    assert!(diag.message.contains("subject"));
}

/// S3 — Unresolved link.
#[test]
fn s3_unresolved_link() {
    let mut ws = Workspace::new();
    ws.add_document("a.thalo", "2026-01-05T18:00Z create journal \"Test\"\n  related: ^ghost\n", None);
    let report = check(&ws);
    let diag = report.diagnostics.iter().find(|d| d.code == "unresolved-link").expect("unresolved-link diagnostic");
    assert!(diag.message.contains("ghost"));
}

/// S4 — Cross-file reference update invalidates the referencing file.
#[test]
fn s4_cross_file_reference_update() {
    let mut ws = Workspace::new();
    ws.add_document("a.thalo", "2026-01-01T00:00Z create journal ^shared \"Shared\"\n", None);
    ws.add_document("b.thalo", "2026-01-02T00:00Z create journal \"Other\"\n  related: ^shared\n", None);

    let invalidation = ws.update_document("a.thalo", "2026-01-01T00:00Z create journal \"Renamed, no link\"\n");
    assert!(invalidation.affected_files.contains("b.thalo"));

    let report = check(&ws);
    let diag = report.diagnostics.iter().find(|d| d.code == "unresolved-link").expect("unresolved-link diagnostic");
    assert!(diag.file == "b.thalo");
}

/// S5 — Merge duplicate link id.
#[test]
fn s5_merge_duplicate_link_id() {
    let base = "";
    let ours = "2026-01-05T18:00Z create journal ^x \"Ours\"\n";
    let theirs = "2026-01-05T19:00Z create journal ^x \"Theirs\"\n";

    let result = merge(base, ours, theirs, MarkerStyle::Git).unwrap();

    assert!(!result.success);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].kind, "duplicate-link-id");
    assert!(result.content.contains("<<<<<<< ours"));
    assert!(result.content.contains("======="));
    assert!(result.content.contains(">>>>>>> theirs"));
}

/// S6 — Query with AND.
#[test]
fn s6_query_with_and() {
    let mut ws = Workspace::new();
    ws.add_document(
        "a.thalo",
        "2026-01-01T00:00Z create opinion \"First\" #coding\n  confidence: \"high\"\n",
        None,
    );
    ws.add_document(
        "b.thalo",
        "2026-01-02T00:00Z create opinion \"Second\" #coding\n  confidence: \"low\"\n",
        None,
    );

    let results = run_query(&ws, "opinion where #coding and confidence = \"high\"").unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].entry.header.title.as_deref(), Some("First"));
}

/// Property 7: duplicate timestamp without `^id` is flagged; adding `^id`
/// to both suppresses it.
#[test]
fn property_duplicate_timestamp_suppressed_by_link_id() {
    let mut ws = Workspace::new();
    ws.add_document(
        "a.thalo",
        "2026-01-05T18:00Z create journal \"A\"\n2026-01-05T18:00Z create journal \"B\"\n",
        None,
    );
    let report = check(&ws);
    assert!(report.diagnostics.iter().any(|d| d.code == "duplicate-timestamp"));

    let mut ws2 = Workspace::new();
    ws2.add_document(
        "a.thalo",
        "2026-01-05T18:00Z create journal ^a \"A\"\n2026-01-05T18:00Z create journal ^b \"B\"\n",
        None,
    );
    let report2 = check(&ws2);
    assert!(!report2.diagnostics.iter().any(|d| d.code == "duplicate-timestamp"));
}

/// Property 8: merge(X, X, X) is a clean success equal to X's entries.
#[test]
fn property_merge_idempotence() {
    let x = "2026-01-01T00:00Z create journal ^a \"A\"\n2026-01-02T00:00Z create journal ^b \"B\"\n";
    let result = merge(x, x, x, MarkerStyle::Git).unwrap();
    assert!(result.success);
    assert!(result.conflicts.is_empty());
    assert!(result.content.contains("\"A\""));
    assert!(result.content.contains("\"B\""));
}

/// Property 9: clean, non-overlapping adds from both sides merge cleanly and
/// are ordered by timestamp regardless of which side is "ours".
#[test]
fn property_merge_symmetry_on_clean_adds() {
    let base = "";
    let ours = "2026-01-05T18:00Z create journal ^a \"A\"\n";
    let theirs = "2026-01-06T18:00Z create journal ^b \"B\"\n";

    let forward = merge(base, ours, theirs, MarkerStyle::Git).unwrap();
    let reversed = merge(base, theirs, ours, MarkerStyle::Git).unwrap();

    assert!(forward.success && reversed.success);
    let a_pos = forward.content.find("\"A\"").unwrap();
    let b_pos = forward.content.find("\"B\"").unwrap();
    assert!(a_pos < b_pos, "entries must be ordered by timestamp");
    assert!(reversed.content.contains("\"A\"") && reversed.content.contains("\"B\""));
}
