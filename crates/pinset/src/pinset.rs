//! The pinning service seam and an in-memory implementation.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signer, SigningKey};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use harbor_registry::clock::Clock;
use harbor_registry::proof;

use crate::errors::{PinsetError, Result};
use crate::status::{PinStatus, PinStatusStore};

/// A signed request to modify the status of a pin.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRequest {
    #[serde(rename = "profileID")]
    pub profile_id: String,
    /// Base64 signature over the path
    pub signature: String,
    pub path: String,
    #[serde(rename = "peerAddresses", default)]
    pub peer_addresses: Vec<String>,
}

impl PinRequest {
    /// Creates a pin request from a private key and path combo.
    pub fn new(path: impl Into<String>, key: &SigningKey, peer_addresses: Vec<String>) -> Self {
        let path = path.into();
        let pubkey = key.verifying_key().to_bytes();
        Self {
            profile_id: proof::profile_id(&pubkey),
            signature: BASE64.encode(key.sign(path.as_bytes()).to_bytes()),
            path,
            peer_addresses,
        }
    }
}

/// The interface for acting as a remote pinning service.
///
/// Implementations are expected to keep a store of [`PinStatus`] that
/// callers can use to probe the progress of a request.
#[async_trait]
pub trait Pinset: Send + Sync {
    /// Pinning can take a while, so `pin` returns a channel of status
    /// updates for the request.
    async fn pin(&self, req: &PinRequest) -> Result<mpsc::Receiver<PinStatus>>;

    /// Removes a pin.
    async fn unpin(&self, req: &PinRequest) -> Result<()>;

    /// The current status for a request's path.
    async fn status(&self, req: &PinRequest) -> Result<PinStatus>;

    /// Lists pinned paths within `limit`/`offset`, in lexicographic order
    /// smallest to largest.
    async fn pins(&self, limit: usize, offset: usize) -> Result<Vec<String>>;

    /// Number of pins in the set.
    async fn pin_len(&self) -> Result<usize>;
}

/// Inserts `elem` into a sorted list, keeping it sorted. Paths already
/// present are left alone so repeat pins don't grow the list.
pub(crate) fn insert_sorted(list: &mut Vec<String>, elem: String) {
    if let Err(i) = list.binary_search(&elem) {
        list.insert(i, elem);
    }
}

/// A completely fictitious pinset backed by nothing but memory. Useful for
/// mocking a pinning service in tests; every pin completes instantly.
pub struct MemPinset {
    statuses: PinStatusStore,
    pins: RwLock<Vec<String>>,
}

impl MemPinset {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            statuses: PinStatusStore::new(clock),
            pins: RwLock::new(Vec::new()),
        }
    }

    /// Whether `path` is currently pinned.
    pub fn pinned(&self, path: &str) -> bool {
        self.pins.read().binary_search(&path.to_string()).is_ok()
    }

    /// Stops the status store's background sweep.
    pub fn stop_gc(&self) {
        self.statuses.stop_gc();
    }
}

#[async_trait]
impl Pinset for MemPinset {
    async fn pin(&self, req: &PinRequest) -> Result<mpsc::Receiver<PinStatus>> {
        insert_sorted(&mut self.pins.write(), req.path.clone());

        let progress = PinStatus {
            path: req.path.clone(),
            pinned: true,
            pct_complete: 1.0,
            ..Default::default()
        };
        self.statuses.set(progress.clone());

        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            let _ = tx.send(progress).await;
        });
        Ok(rx)
    }

    async fn unpin(&self, req: &PinRequest) -> Result<()> {
        let mut pins = self.pins.write();
        if let Ok(i) = pins.binary_search(&req.path) {
            pins.remove(i);
            self.statuses.delete(&req.path);
        }
        Ok(())
    }

    async fn status(&self, req: &PinRequest) -> Result<PinStatus> {
        self.statuses.get(&req.path).ok_or(PinsetError::NotFound)
    }

    async fn pins(&self, limit: usize, offset: usize) -> Result<Vec<String>> {
        Ok(self
            .pins
            .read()
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn pin_len(&self) -> Result<usize> {
        Ok(self.pins.read().len())
    }
}
