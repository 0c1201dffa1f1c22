//! Error types for registry records and stores

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A structural validation failure: a required field is missing.
    #[error("{0} is required")]
    FieldRequired(&'static str),

    /// The requested handle is already owned by a different identity.
    #[error("handle '{handle}' is taken")]
    HandleTaken { handle: String },

    #[error("publickey base64 encoding: {0}")]
    PublicKeyEncoding(String),

    #[error("invalid publickey: {0}")]
    InvalidPublicKey(String),

    #[error("signature base64 encoding: {0}")]
    SignatureEncoding(String),

    /// The signature bytes are malformed or do not verify against the
    /// claimed public key.
    #[error("invalid signature")]
    InvalidSignature,
}

pub type Result<T> = std::result::Result<T, RegistryError>;
