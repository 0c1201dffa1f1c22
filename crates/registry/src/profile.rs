//! A profile is a claimed human identity: a handle bound to a keypair.

use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};

use crate::errors::{RegistryError, Result};
use crate::proof;

/// A handle claim. The signature covers the UTF-8 handle bytes; it is
/// consumed at registration time and cleared from the stored record, so a
/// stored profile never carries reusable proof material.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Timestamp of first successful registration, stamped by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Human-chosen name, unique within the registry
    pub handle: String,
    /// Durable identity: base58 multihash of the public key
    #[serde(rename = "profileID")]
    pub profile_id: String,
    /// Base64-encoded Ed25519 public key
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Base64-encoded signature over the handle. Empty once stored.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
}

impl Profile {
    /// Builds a fully-proven claim for `handle` using `key`.
    pub fn new(handle: impl Into<String>, key: &SigningKey) -> Self {
        let handle = handle.into();
        let proof = proof::build_profile_proof(&handle, key);
        Self {
            created: None,
            handle,
            profile_id: proof.profile_id,
            public_key: proof.public_key,
            signature: proof.signature,
        }
    }

    /// Sanity check that all required fields are present.
    pub fn validate(&self) -> Result<()> {
        if self.handle.is_empty() {
            return Err(RegistryError::FieldRequired("handle"));
        }
        if self.profile_id.is_empty() {
            return Err(RegistryError::FieldRequired("profileID"));
        }
        if self.public_key.is_empty() {
            return Err(RegistryError::FieldRequired("publicKey"));
        }
        if self.signature.is_empty() {
            return Err(RegistryError::FieldRequired("signature"));
        }
        Ok(())
    }

    /// Checks the proof of key ownership: the signature must cover the
    /// claimed handle and verify against the claimed public key.
    pub fn verify(&self) -> Result<()> {
        proof::verify(&self.public_key, &self.signature, self.handle.as_bytes())
    }

    /// The canonical key this profile is stored under.
    pub fn key(&self) -> String {
        self.handle.clone()
    }
}
