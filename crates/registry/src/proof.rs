//! Proof-of-control primitives.
//!
//! Registrants prove they hold the private key behind a claim by signing the
//! claimed value (a handle, or dataset commit metadata). Verification here is
//! a pure function: it never mutates the record it checks. Scrubbing one-time
//! proof material after a successful registration is the store's job.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::errors::{RegistryError, Result};

/// Multihash code for sha2-256.
const MULTIHASH_SHA2_256: u64 = 0x12;

/// The proof material produced when claiming a handle.
#[derive(Debug, Clone)]
pub struct ProfileProof {
    pub profile_id: String,
    pub public_key: String,
    pub signature: String,
}

/// Derives a profile ID from public key bytes: the base58 encoding of the
/// sha2-256 multihash of the key. The ID is the durable identity of a peer,
/// independent of whatever handle it currently claims.
pub fn profile_id(pubkey_bytes: &[u8]) -> String {
    let digest = Sha256::digest(pubkey_bytes);
    let mh = multihash::Multihash::<64>::wrap(MULTIHASH_SHA2_256, &digest)
        .expect("a 32-byte digest fits a 64-byte multihash");
    bs58::encode(mh.to_bytes()).into_string()
}

/// Builds the proof for claiming `handle` with `key`: the derived profile ID,
/// the base64 public key, and a base64 signature over the UTF-8 handle.
pub fn build_profile_proof(handle: &str, key: &SigningKey) -> ProfileProof {
    let pubkey = key.verifying_key().to_bytes();
    ProfileProof {
        profile_id: profile_id(&pubkey),
        public_key: BASE64.encode(pubkey),
        signature: BASE64.encode(key.sign(handle.as_bytes()).to_bytes()),
    }
}

/// The signable bytes for a dataset claim: the RFC3339 commit timestamp and
/// the structure checksum, newline separated.
pub(crate) fn commit_sig_bytes(timestamp: &DateTime<Utc>, checksum: &str) -> String {
    format!(
        "{}\n{}",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        checksum
    )
}

/// Signs dataset commit metadata, returning the base64 signature. The
/// registry only ever verifies dataset claims; this helper exists for
/// clients and tests constructing them.
pub fn sign_commit(timestamp: &DateTime<Utc>, checksum: &str, key: &SigningKey) -> String {
    let sig = key.sign(commit_sig_bytes(timestamp, checksum).as_bytes());
    BASE64.encode(sig.to_bytes())
}

/// Verifies a base64 signature over `msg` against a base64 public key.
pub fn verify(public_key_b64: &str, signature_b64: &str, msg: &[u8]) -> Result<()> {
    let pk_bytes = BASE64
        .decode(public_key_b64)
        .map_err(|e| RegistryError::PublicKeyEncoding(e.to_string()))?;
    let pk_arr: [u8; 32] = pk_bytes.as_slice().try_into().map_err(|_| {
        RegistryError::InvalidPublicKey(format!("expected 32 bytes, got {}", pk_bytes.len()))
    })?;
    let key = VerifyingKey::from_bytes(&pk_arr)
        .map_err(|e| RegistryError::InvalidPublicKey(e.to_string()))?;

    let sig_bytes = BASE64
        .decode(signature_b64)
        .map_err(|e| RegistryError::SignatureEncoding(e.to_string()))?;
    let sig =
        Signature::from_slice(&sig_bytes).map_err(|_| RegistryError::InvalidSignature)?;

    key.verify(msg, &sig)
        .map_err(|_| RegistryError::InvalidSignature)
}
