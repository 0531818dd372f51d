use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that can occur while building an index from a corpus directory.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("missing required input: {flag}")]
    MissingInput { flag: &'static str },

    #[error("could not read corpus document {path}: {source}")]
    CorpusIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("internal invariant violated during merge: {detail}")]
    InternalInvariant { detail: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures that can occur while parsing or evaluating a single query.
///
/// An unknown term is deliberately not represented here — it resolves to an
/// empty posting list at the `Dictionary` layer, never an `Err`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unmatched parenthesis in query")]
    UnmatchedParenthesis,

    #[error("empty query")]
    EmptyQuery,

    #[error("unexpected token: {token}")]
    UnexpectedToken { token: String },

    #[error("operator with no operand")]
    DanglingOperator,
}
