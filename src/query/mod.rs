//! Fragment parsing (isolated expressions: queries, type expressions,
//! metadata values) and query execution against a workspace.

pub mod executor;
pub mod fragment;

pub use executor::{run_query, QueryResult};
pub use fragment::{Condition, Query};
