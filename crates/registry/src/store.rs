//! The concurrent name store.
//!
//! One generic map/lock/iteration implementation serves both profiles and
//! datasets; per-entity collision semantics live in [`RegisterPolicy`]
//! objects. The store exclusively owns committed records: callers get
//! clones, so nothing outside the registration protocol can mutate a stored
//! value.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::dataset::Dataset;
use crate::errors::{RegistryError, Result};
use crate::profile::Profile;

/// A record the store knows how to guard: it has a canonical key, a
/// structural validity check, and a cryptographic proof check.
pub trait Record: Clone + Send + Sync + 'static {
    fn key(&self) -> String;
    fn validate(&self) -> Result<()>;
    fn verify(&self) -> Result<()>;
}

impl Record for Profile {
    fn key(&self) -> String {
        Profile::key(self)
    }
    fn validate(&self) -> Result<()> {
        Profile::validate(self)
    }
    fn verify(&self) -> Result<()> {
        Profile::verify(self)
    }
}

impl Record for Dataset {
    fn key(&self) -> String {
        Dataset::key(self)
    }
    fn validate(&self) -> Result<()> {
        Dataset::validate(self)
    }
    fn verify(&self) -> Result<()> {
        Dataset::verify(self)
    }
}

/// Per-entity collision resolution. `admit` runs with the table write lock
/// held, after validation and verification have already passed, and may
/// reject the record, evict prior entries, and seal the record for storage
/// (scrub proof material, stamp timestamps).
pub trait RegisterPolicy<T: Record>: Send + Sync {
    fn admit(
        &self,
        table: &mut HashMap<String, T>,
        incoming: &mut T,
        now: DateTime<Utc>,
    ) -> Result<()>;
}

/// A concurrency-safe associative store keyed by a record's canonical key.
pub struct NameStore<T: Record, P: RegisterPolicy<T>> {
    table: RwLock<HashMap<String, T>>,
    policy: P,
    clock: Arc<dyn Clock>,
}

impl<T: Record, P: RegisterPolicy<T>> NameStore<T, P> {
    pub fn with_policy(policy: P, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
            policy,
            clock,
        }
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Fetches a copy of the record at `key`. Absence is a normal outcome,
    /// not an error.
    pub fn load(&self, key: &str) -> Option<T> {
        self.table.read().get(key).cloned()
    }

    /// Calls `iter` on each record until the table is exhausted or `iter`
    /// returns true. Iteration order is unspecified.
    ///
    /// The read lock is held for the whole iteration: `iter` must not call
    /// back into this store or it will deadlock.
    pub fn range<F>(&self, mut iter: F)
    where
        F: FnMut(&str, &T) -> bool,
    {
        let table = self.table.read();
        for (key, value) in table.iter() {
            if iter(key, value) {
                break;
            }
        }
    }

    /// Like [`NameStore::range`] but visits keys in ascending lexicographic
    /// order, for stable pagination. Materializes and sorts the key list, so
    /// each call is O(n log n). The same no-reentrancy contract applies.
    pub fn sorted_range<F>(&self, mut iter: F)
    where
        F: FnMut(&str, &T) -> bool,
    {
        let table = self.table.read();
        let mut keys: Vec<&String> = table.keys().collect();
        keys.sort();
        for key in keys {
            if iter(key, &table[key]) {
                break;
            }
        }
    }

    /// Unconditionally stores `value` at `key`, bypassing the registration
    /// protocol. Privileged: not to be exposed to untrusted callers.
    pub fn store(&self, key: impl Into<String>, value: T) {
        self.table.write().insert(key.into(), value);
    }

    /// Unconditionally removes the record at `key`, bypassing the
    /// registration protocol. Privileged: not to be exposed to untrusted
    /// callers.
    pub fn delete(&self, key: &str) {
        self.table.write().remove(key);
    }

    /// The guarded write path: structural validation, proof verification
    /// (before any lock is taken), then policy-driven collision resolution
    /// and commit under a single write lock. On any failure the store is
    /// left untouched.
    pub fn register(&self, mut record: T) -> Result<()> {
        record.validate()?;
        record.verify()?;

        let now = self.clock.now();
        let mut table = self.table.write();
        self.policy.admit(&mut table, &mut record, now)?;
        let key = record.key();
        debug!(%key, "registered record");
        table.insert(key, record);
        Ok(())
    }

    /// Re-proves control, then removes the record at its canonical key.
    /// Deregistering a record that was never stored is not an error.
    pub fn deregister(&self, record: &T) -> Result<()> {
        record.validate()?;
        record.verify()?;

        let key = record.key();
        debug!(%key, "deregistered record");
        self.table.write().remove(&key);
        Ok(())
    }
}

/// Profile collisions: a handle held by a *different* identity is rejected;
/// a new handle for an identity that already holds one is a rename and
/// evicts the old entry. One-time proof material is scrubbed and `created`
/// stamped on first commit.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProfilePolicy;

impl RegisterPolicy<Profile> for ProfilePolicy {
    fn admit(
        &self,
        table: &mut HashMap<String, Profile>,
        incoming: &mut Profile,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(existing) = table.get(&incoming.handle) {
            if existing.profile_id != incoming.profile_id {
                return Err(RegistryError::HandleTaken {
                    handle: incoming.handle.clone(),
                });
            }
        }

        // the store owns the creation stamp: whatever the caller sent is
        // discarded, and idempotent re-registration keeps the original
        incoming.created = table.get(&incoming.handle).and_then(|p| p.created);

        // rename: this identity may hold at most one handle
        let prev = table
            .iter()
            .find(|(key, p)| p.profile_id == incoming.profile_id && **key != incoming.handle)
            .map(|(key, _)| key.clone());
        if let Some(prev) = prev {
            debug!(old = %prev, new = %incoming.handle, "handle renamed");
            table.remove(&prev);
        }

        incoming.signature.clear();
        if incoming.created.is_none() {
            incoming.created = Some(now);
        }
        Ok(())
    }
}

/// Dataset collisions: last writer wins at the canonical key. Ownership is
/// established solely by the incoming payload verifying against its own key;
/// there is no cross-check against the previous entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct DatasetPolicy;

impl RegisterPolicy<Dataset> for DatasetPolicy {
    fn admit(
        &self,
        _table: &mut HashMap<String, Dataset>,
        _incoming: &mut Dataset,
        _now: DateTime<Utc>,
    ) -> Result<()> {
        Ok(())
    }
}

/// The store of profile claims, keyed by handle.
pub type Profiles = NameStore<Profile, ProfilePolicy>;

/// The store of dataset claims, keyed by `handle/name`.
pub type Datasets = NameStore<Dataset, DatasetPolicy>;

impl Profiles {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_policy(ProfilePolicy, clock)
    }
}

impl Datasets {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_policy(DatasetPolicy, clock)
    }
}

impl Default for Profiles {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Default for Datasets {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
