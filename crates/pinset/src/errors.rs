//! Error types for pinning services

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PinsetError {
    /// No status is held for the requested path.
    #[error("not found")]
    NotFound,

    /// Canonical error for a registry that does not support pinning.
    #[error("pinset is not supported")]
    NotSupported,
}

pub type Result<T> = std::result::Result<T, PinsetError>;
