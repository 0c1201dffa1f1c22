//! A dataset is a claimed name bound to versioned, content-addressed data.

use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};

use crate::errors::{RegistryError, Result};
use crate::proof;

/// Commit metadata for a dataset version. The signature covers the RFC3339
/// timestamp and the structure checksum, newline separated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub timestamp: DateTime<Utc>,
    pub signature: String,
}

/// Structure metadata for a dataset version. The registry reads only the
/// checksum; the rest of the dataset document is opaque to it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub checksum: String,
}

/// A dataset name claim, keyed by `handle/name`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub handle: String,
    pub name: String,
    /// Base64-encoded Ed25519 public key of the registering identity
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Content-address of this dataset version
    pub path: String,
    pub commit: Option<Commit>,
    pub structure: Option<Structure>,
    /// Opaque dataset document body, carried verbatim for search providers
    /// and other collaborators. The registry itself never interprets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl Dataset {
    /// Creates a dataset claim with an already-signed commit. The registry
    /// never signs dataset claims on a caller's behalf, it only verifies
    /// them; see [`proof::sign_commit`] for producing the commit signature.
    pub fn new(
        handle: impl Into<String>,
        name: impl Into<String>,
        key: &SigningKey,
        path: impl Into<String>,
        commit: Commit,
        structure: Structure,
    ) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        Self {
            handle: handle.into(),
            name: name.into(),
            public_key: STANDARD.encode(key.verifying_key().to_bytes()),
            path: path.into(),
            commit: Some(commit),
            structure: Some(structure),
            meta: None,
        }
    }

    /// Sanity check that all required fields are present.
    pub fn validate(&self) -> Result<()> {
        if self.handle.is_empty() {
            return Err(RegistryError::FieldRequired("handle"));
        }
        if self.name.is_empty() {
            return Err(RegistryError::FieldRequired("name"));
        }
        if self.public_key.is_empty() {
            return Err(RegistryError::FieldRequired("publicKey"));
        }
        if self.path.is_empty() {
            return Err(RegistryError::FieldRequired("path"));
        }
        if self.commit.is_none() {
            return Err(RegistryError::FieldRequired("commit"));
        }
        if self.structure.is_none() {
            return Err(RegistryError::FieldRequired("structure"));
        }
        Ok(())
    }

    /// Checks the proof of key ownership over the commit metadata.
    pub fn verify(&self) -> Result<()> {
        let (Some(commit), Some(structure)) = (&self.commit, &self.structure) else {
            return self.validate();
        };
        let msg = proof::commit_sig_bytes(&commit.timestamp, &structure.checksum);
        proof::verify(&self.public_key, &commit.signature, msg.as_bytes())
    }

    /// The canonical key this dataset is stored under.
    pub fn key(&self) -> String {
        format!("{}/{}", self.handle, self.name)
    }
}
