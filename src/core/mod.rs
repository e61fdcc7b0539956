//! Core analysis engine: parsing, AST extraction, semantic analysis, schema
//! composition, documents and the workspace.
//!
//! ## Pipeline
//!
//! raw text -> [`cst`] (concrete syntax tree) -> [`ast`] (typed AST) ->
//! [`semantic`] (per-file link index and schema entries) -> [`workspace`]
//! (multi-file aggregation: global link index, schema registry, dependency
//! tracking, incremental edit application).
//!
//! [`document`] owns one file's source, line index, Markdown-extracted blocks
//! and concrete trees, and knows how to apply an edit incrementally.

pub mod ast;
pub mod cst;
pub mod document;
pub mod line_index;
pub mod schema;
pub mod semantic;
pub mod source_map;
pub mod value;
pub mod workspace;

pub use ast::*;
pub use line_index::{LineIndex, Position};
pub use source_map::SourceMap;
