//! Typed errors for contract violations at API boundaries.
//!
//! Parsing and analysis never panic or return `Err` on malformed *input* -
//! malformed input becomes a syntax error node or a diagnostic. `ThaloError`
//! is reserved for violations of a caller's contract with this crate (feeding
//! the merge driver input that breaks an invariant it requires, asking the
//! fragment parser for a start rule that does not exist). Ad hoc I/O and
//! config-loading failures use `anyhow::Result` instead, matching the rest of
//! this crate's error-propagation style.

use thiserror::Error;

/// A contract violation raised by the merge driver or the fragment parser.
#[derive(Debug, Error)]
pub enum ThaloError {
    #[error("entry identity {identity:?} is not unique within {side}'s version (duplicate definitions are a checker concern, not a merge input)")]
    DuplicateIdentity { side: &'static str, identity: String },

    #[error("unknown fragment start rule {0:?}")]
    UnknownFragmentStart(String),

    #[error("invalid glob pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

pub type Result<T> = std::result::Result<T, ThaloError>;
