//! Typed metadata values and schema field type expressions.
//!
//! Grounded on `core/data/message.rs`'s `ValueType`/`MessageEntry` pattern of
//! keeping the raw source text alongside a typed interpretation of it.

use crate::core::ast::Location;

/// A parsed metadata value. The raw text is always retained alongside the
/// typed content, matching the retain-raw-plus-typed pattern used throughout
/// the corpus for values that both drive logic and need to round-trip to
/// source.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Quoted(QuotedValue),
    Link(LinkValue),
    Datetime(DatetimeValue),
    DateRange(DateRangeValue),
    Number(NumberValue),
    Array(ValueArray),
    Query(QueryValue),
}

impl MetadataValue {
    pub fn raw(&self) -> &str {
        match self {
            MetadataValue::Quoted(v) => &v.raw,
            MetadataValue::Link(v) => &v.raw,
            MetadataValue::Datetime(v) => &v.raw,
            MetadataValue::DateRange(v) => &v.raw,
            MetadataValue::Number(v) => &v.raw,
            MetadataValue::Array(v) => &v.raw,
            MetadataValue::Query(v) => &v.raw,
        }
    }

    /// Every link id directly referenced by this value (recursing into
    /// array elements), used to build [`crate::core::semantic`]'s reference
    /// list.
    pub fn link_ids(&self) -> Vec<String> {
        match self {
            MetadataValue::Link(v) => vec![v.id.clone()],
            MetadataValue::Array(arr) => arr.elements.iter().flat_map(MetadataValue::link_ids).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuotedValue {
    pub raw: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkValue {
    pub raw: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatetimeValue {
    pub raw: String,
    pub date: String,
    pub time: Option<String>,
    pub tz: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateRangeValue {
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberValue {
    pub raw: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueArray {
    pub raw: String,
    pub elements: Vec<MetadataValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryValue {
    pub raw: String,
    pub query: String,
}

/// A schema field's declared type. Unknown type identifiers are represented
/// by [`TypeExpression::Error`] rather than rejected outright, so the
/// surrounding array/union can still propagate the failure per C4's
/// propagation contract.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpression {
    Primitive(Primitive),
    Literal(String),
    Array(Box<TypeExpression>),
    Union(Vec<TypeExpression>),
    /// An unknown type identifier; carries the offending text for the
    /// `unknown_type` syntax error.
    Error { unknown_identifier: String, location: Location },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Datetime,
    DateRange,
    Link,
    Number,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Primitive::String),
            "datetime" => Some(Primitive::Datetime),
            "date-range" => Some(Primitive::DateRange),
            "link" => Some(Primitive::Link),
            "number" => Some(Primitive::Number),
            _ => None,
        }
    }
}

impl TypeExpression {
    /// Structural acceptance check used by the `invalid-field-type` rule.
    /// `Array` also accepts a single value of its element type, matching the
    /// grammar-level leniency the checker design calls for.
    pub fn accepts(&self, value: &MetadataValue) -> bool {
        match self {
            TypeExpression::Primitive(p) => match (p, value) {
                (Primitive::String, MetadataValue::Quoted(_)) => true,
                (Primitive::Datetime, MetadataValue::Datetime(_)) => true,
                (Primitive::DateRange, MetadataValue::DateRange(_)) => true,
                (Primitive::Link, MetadataValue::Link(_)) => true,
                (Primitive::Number, MetadataValue::Number(_)) => true,
                _ => false,
            },
            TypeExpression::Literal(expected) => matches!(
                value,
                MetadataValue::Quoted(q) if &q.content == expected
            ),
            TypeExpression::Union(members) => members.iter().any(|m| m.accepts(value)),
            TypeExpression::Array(element) => match value {
                MetadataValue::Array(arr) => arr.elements.iter().all(|v| element.accepts(v)),
                other => element.accepts(other),
            },
            TypeExpression::Error { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted(s: &str) -> MetadataValue {
        MetadataValue::Quoted(QuotedValue {
            raw: format!("\"{s}\""),
            content: s.to_string(),
        })
    }

    #[test]
    fn primitive_accepts_matching_value() {
        let ty = TypeExpression::Primitive(Primitive::String);
        assert!(ty.accepts(&quoted("hello")));
    }

    #[test]
    fn union_accepts_any_member() {
        let ty = TypeExpression::Union(vec![
            TypeExpression::Primitive(Primitive::String),
            TypeExpression::Primitive(Primitive::Number),
        ]);
        assert!(ty.accepts(&quoted("x")));
    }

    #[test]
    fn array_rejects_mixed_element_types() {
        let ty = TypeExpression::Array(Box::new(TypeExpression::Primitive(Primitive::Link)));
        let mixed = MetadataValue::Array(ValueArray {
            raw: "[^a, \"b\"]".to_string(),
            elements: vec![
                MetadataValue::Link(LinkValue {
                    raw: "^a".to_string(),
                    id: "a".to_string(),
                }),
                quoted("b"),
            ],
        });
        assert!(!ty.accepts(&mixed));
    }

    #[test]
    fn array_accepts_single_element_of_type() {
        let ty = TypeExpression::Array(Box::new(TypeExpression::Primitive(Primitive::Link)));
        let single = MetadataValue::Link(LinkValue {
            raw: "^a".to_string(),
            id: "a".to_string(),
        });
        assert!(ty.accepts(&single));
    }

    #[test]
    fn link_ids_recurse_into_arrays() {
        let value = MetadataValue::Array(ValueArray {
            raw: "[^a, ^b]".to_string(),
            elements: vec![
                MetadataValue::Link(LinkValue {
                    raw: "^a".to_string(),
                    id: "a".to_string(),
                }),
                MetadataValue::Link(LinkValue {
                    raw: "^b".to_string(),
                    id: "b".to_string(),
                }),
            ],
        });
        assert_eq!(value.link_ids(), vec!["a".to_string(), "b".to_string()]);
    }
}
