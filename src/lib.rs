//! thalo-core - incremental language analysis engine for the Thalo knowledge-note format.
//!
//! Thalo is a small structured plain-text language for personal knowledge notes:
//! timestamped entries with entities, links, tags, metadata and content, a schema
//! layer (`define-entity` / `alter-entity`) and a synthesis layer
//! (`define-synthesis` / `actualize-synthesis`). This crate turns a changing set
//! of source files into a consistent, incrementally maintained semantic model
//! suitable for diagnostics, go-to-definition, find-references, completions and
//! three-way merging.
//!
//! ## Module Structure
//!
//! - `core`: parsing (lexer/CST/parser), AST extraction, semantic analysis,
//!   schema composition, documents and the workspace
//! - `diagnostics`: diagnostic/report/severity types
//! - `rules`: checker rule implementations
//! - `query`: fragment parser and query executor
//! - `merge`: three-way structural merge driver
//! - `config`: `.thalorc.json` loading
//! - `cli`: command-line interface layer
//! - `error`: typed contract-violation errors

pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod merge;
pub mod query;
pub mod rules;
pub mod utils;
