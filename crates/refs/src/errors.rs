//! Error types for reference parsing and comparison

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    /// The input string was empty. Kept distinct from `Malformed` so callers
    /// can special-case an unqualified request carrying no reference at all.
    #[error("empty dataset reference")]
    Empty,

    #[error("malformed reference string: {0}")]
    Malformed(String),

    #[error("{field} mismatch. {left} != {right}")]
    FieldMismatch {
        field: &'static str,
        left: String,
        right: String,
    },
}

pub type Result<T> = std::result::Result<T, RefError>;
