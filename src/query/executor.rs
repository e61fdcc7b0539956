//! Executes a parsed [`Query`] against a workspace: filters instance entries
//! by entity and ANDs every condition, sorts results by timestamp, and
//! excludes cross-file duplicates by `(filename, timestamp)` fingerprint.

use std::collections::HashSet;

use crate::core::ast::InstanceEntry;
use crate::core::value::MetadataValue;
use crate::core::workspace::Workspace;
use crate::query::fragment::{parse_query, Condition, Query};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<'a> {
    pub file: &'a str,
    pub entry: &'a InstanceEntry,
}

/// Runs every query in `query_strings` (OR'd at the source-list level) and
/// returns matching instance entries, sorted by timestamp and deduplicated
/// by `(file, timestamp)`.
pub fn run_query<'a>(workspace: &'a Workspace, query_string: &str) -> Result<Vec<QueryResult<'a>>, String> {
    let query = parse_query(query_string)?;
    Ok(run_parsed_query(workspace, &query))
}

pub fn run_parsed_query<'a>(workspace: &'a Workspace, query: &Query) -> Vec<QueryResult<'a>> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut results: Vec<QueryResult<'a>> = workspace
        .all_instance_entries()
        .into_iter()
        .filter(|(_, entry)| entry.header.entity == query.entity)
        .filter(|(_, entry)| query.conditions.iter().all(|c| condition_matches(entry, c)))
        .filter_map(|(file, entry)| {
            let key = (file.as_str(), entry.header.timestamp.as_str());
            if seen.insert(key) {
                Some(QueryResult { file, entry })
            } else {
                None
            }
        })
        .collect();
    results.sort_by(|a, b| a.entry.header.timestamp.cmp(&b.entry.header.timestamp));
    results
}

fn condition_matches(entry: &InstanceEntry, condition: &Condition) -> bool {
    match condition {
        Condition::Tag(tag) => entry.header.tags.iter().any(|t| t == tag),
        Condition::Link(link) => {
            entry.header.link.as_deref() == Some(link.as_str())
                || entry
                    .metadata
                    .iter()
                    .any(|m| m.value.link_ids().iter().any(|id| id == link))
        }
        Condition::Field { field, value } => entry.metadata.iter().any(|m| {
            &m.key == field
                && match &m.value {
                    MetadataValue::Quoted(q) => &q.content == value,
                    MetadataValue::Link(l) => &l.id == value,
                    other => other.raw() == value,
                }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::workspace::Workspace;

    #[test]
    fn query_filters_by_entity_tag_and_field() {
        let mut ws = Workspace::new();
        ws.add_document(
            "a.thalo",
            "2026-01-05T18:00Z create opinion \"A\" #coding\n  confidence: \"high\"\n",
            None,
        );
        ws.add_document(
            "b.thalo",
            "2026-01-06T09:00Z create opinion \"B\" #coding\n  confidence: \"low\"\n",
            None,
        );
        let results = run_query(&ws, "opinion where #coding and confidence = \"high\"").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.header.title.as_deref(), Some("A"));
    }

    #[test]
    fn query_results_sorted_by_timestamp() {
        let mut ws = Workspace::new();
        ws.add_document("b.thalo", "2026-01-06T09:00Z create journal \"Second\"\n", None);
        ws.add_document("a.thalo", "2026-01-05T18:00Z create journal \"First\"\n", None);
        let results = run_query(&ws, "journal").unwrap();
        assert_eq!(results[0].entry.header.title.as_deref(), Some("First"));
    }
}
