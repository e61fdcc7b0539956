//! Parses an isolated expression - a query, a type expression, or a
//! metadata value - outside the context of a full entry. Used by the
//! LSP-shaped completion-context detection and by the query executor to
//! reparse synthesis source clauses at runtime.

use crate::core::value::{MetadataValue, TypeExpression};
use crate::error::ThaloError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentStart {
    Query,
    TypeExpression,
    MetadataValue,
}

impl FragmentStart {
    pub fn from_name(name: &str) -> Result<Self, ThaloError> {
        match name {
            "Query" => Ok(FragmentStart::Query),
            "TypeExpression" => Ok(FragmentStart::TypeExpression),
            "MetadataValue" => Ok(FragmentStart::MetadataValue),
            other => Err(ThaloError::UnknownFragmentStart(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Field { field: String, value: String },
    Tag(String),
    Link(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub entity: String,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FragmentNode {
    Query(Query),
    Type(TypeExpression),
    Value(MetadataValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentResult {
    pub valid: bool,
    pub node: Option<FragmentNode>,
    pub errors: Vec<String>,
}

/// Parses `text` starting from the named rule. An unrecognized `start` is a
/// contract violation, not a silent failure - it returns `Err`, not a
/// `FragmentResult` with `valid: false`.
pub fn parse_fragment(start: &str, text: &str) -> Result<FragmentResult, ThaloError> {
    let start = FragmentStart::from_name(start)?;
    Ok(match start {
        FragmentStart::Query => match parse_query(text) {
            Ok(q) => FragmentResult {
                valid: true,
                node: Some(FragmentNode::Query(q)),
                errors: Vec::new(),
            },
            Err(e) => FragmentResult {
                valid: false,
                node: None,
                errors: vec![e],
            },
        },
        FragmentStart::TypeExpression => {
            let ty = crate::core::ast::parse_type_expression_fragment(text);
            let is_error = matches!(ty, TypeExpression::Error { .. });
            FragmentResult {
                valid: !is_error,
                errors: if is_error {
                    vec![format!("unknown type in {text:?}")]
                } else {
                    Vec::new()
                },
                node: Some(FragmentNode::Type(ty)),
            }
        }
        FragmentStart::MetadataValue => FragmentResult {
            valid: true,
            node: Some(FragmentNode::Value(crate::core::ast::parse_value_text(text))),
            errors: Vec::new(),
        },
    })
}

/// Parses `entity where cond (and cond)*`. The `where` clause is optional.
pub fn parse_query(text: &str) -> Result<Query, String> {
    let text = text.trim();
    let (entity_part, conditions_part) = match text.split_once("where") {
        Some((e, c)) => (e.trim(), Some(c.trim())),
        None => (text, None),
    };
    if entity_part.is_empty() {
        return Err("query is missing an entity name".to_string());
    }
    let mut conditions = Vec::new();
    if let Some(conditions_part) = conditions_part {
        for clause in conditions_part.split("and") {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            conditions.push(parse_condition(clause)?);
        }
    }
    Ok(Query {
        entity: entity_part.to_string(),
        conditions,
    })
}

fn parse_condition(clause: &str) -> Result<Condition, String> {
    if let Some(tag) = clause.strip_prefix('#') {
        return Ok(Condition::Tag(tag.trim().to_string()));
    }
    if let Some(link) = clause.strip_prefix('^') {
        return Ok(Condition::Link(link.trim().to_string()));
    }
    if let Some((field, value)) = clause.split_once('=') {
        let value = value.trim().trim_matches('"').to_string();
        return Ok(Condition::Field {
            field: field.trim().to_string(),
            value,
        });
    }
    Err(format!("unrecognized query condition {clause:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_with_tag_and_field_conditions() {
        let query = parse_query("opinion where #coding and confidence = \"high\"").unwrap();
        assert_eq!(query.entity, "opinion");
        assert_eq!(query.conditions.len(), 2);
        assert_eq!(query.conditions[0], Condition::Tag("coding".to_string()));
        assert_eq!(
            query.conditions[1],
            Condition::Field {
                field: "confidence".to_string(),
                value: "high".to_string()
            }
        );
    }

    #[test]
    fn parses_query_without_where_clause() {
        let query = parse_query("journal").unwrap();
        assert_eq!(query.entity, "journal");
        assert!(query.conditions.is_empty());
    }

    #[test]
    fn unknown_start_is_a_contract_violation() {
        assert!(parse_fragment("Bogus", "x").is_err());
    }

    #[test]
    fn metadata_value_fragment_never_fails() {
        let result = parse_fragment("MetadataValue", "\"hi\"").unwrap();
        assert!(result.valid);
    }
}
