//! Pin status records and the TTL-evicting status store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::debug;

use harbor_registry::clock::{Clock, SystemClock};

/// How often the lazily-started sweep loop runs.
pub const DEFAULT_GC_INTERVAL: StdDuration = StdDuration::from_secs(20 * 60);

fn default_ttl() -> Duration {
    Duration::hours(4)
}

/// Transient record of replication progress for one content path.
///
/// A pin moves `requested -> in-progress -> pinned | errored`; reaching
/// `pinned` or a non-empty `error` is terminal for the request. An unpin
/// deletes the record outright, returning the path to the absent state.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinStatus {
    pub path: String,
    pub pinned: bool,
    /// When the pin request began. Stamped by the store if the caller
    /// leaves it unset.
    #[serde(rename = "startedAt", default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Progress in the range 0.0..=1.0
    #[serde(rename = "pctComplete")]
    pub pct_complete: f32,
    /// Free-text status line, intended to be shown to users
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// An in-memory store of [`PinStatus`] keyed by path.
///
/// To keep the store from growing without bound, statuses are swept once
/// the timespan since their `started_at` exceeds the store TTL (default 4
/// hours). The sweep runs on a background tick started lazily by the first
/// [`PinStatusStore::set`] (default every 20 minutes); [`PinStatusStore::stop_gc`]
/// shuts it down at process teardown.
pub struct PinStatusStore {
    table: Arc<RwLock<HashMap<String, PinStatus>>>,
    ttl: Arc<RwLock<Option<Duration>>>,
    clock: Arc<dyn Clock>,
    gc: Mutex<Option<JoinHandle<()>>>,
    gc_started: AtomicBool,
}

impl PinStatusStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Arc::new(RwLock::new(HashMap::new())),
            ttl: Arc::new(RwLock::new(None)),
            clock,
            gc: Mutex::new(None),
            gc_started: AtomicBool::new(false),
        }
    }

    /// Overrides the eviction TTL. Unset stores fall back to 4 hours.
    pub fn set_ttl(&self, ttl: Duration) {
        *self.ttl.write() = Some(ttl);
    }

    /// Inserts or overwrites the status at its path.
    ///
    /// Stamps `started_at` with the current time when the caller left it
    /// unset. The very first call starts the background sweep loop, so `set`
    /// must run inside a tokio runtime.
    pub fn set(&self, mut status: PinStatus) {
        if status.started_at.is_none() {
            status.started_at = Some(self.clock.now());
        }
        {
            let mut ttl = self.ttl.write();
            if ttl.is_none() {
                *ttl = Some(default_ttl());
            }
        }
        if self
            .gc_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.start_gc(DEFAULT_GC_INTERVAL);
        }

        self.table.write().insert(status.path.clone(), status);
    }

    /// Fetches a copy of the status for `path`, if any.
    pub fn get(&self, path: &str) -> Option<PinStatus> {
        self.table.read().get(path).cloned()
    }

    /// Removes the status for `path`.
    pub fn delete(&self, path: &str) {
        self.table.write().remove(path);
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Removes every status whose `started_at + ttl` has already elapsed.
    /// Runs on each background tick; callable directly for deterministic
    /// tests. Returns the number of statuses removed.
    pub fn sweep(&self) -> usize {
        sweep_table(&self.table, &self.ttl, self.clock.as_ref())
    }

    /// Starts the sweep ticker, replacing any ticker already running.
    pub fn start_gc(&self, interval: StdDuration) {
        let mut gc = self.gc.lock();
        if let Some(prev) = gc.take() {
            prev.abort();
        }

        let table = Arc::clone(&self.table);
        let ttl = Arc::clone(&self.ttl);
        let clock = Arc::clone(&self.clock);
        *gc = Some(tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            // the first interval tick completes immediately; a ticker fires
            // only after a full period has passed
            tick.tick().await;
            loop {
                tick.tick().await;
                let removed = sweep_table(&table, &ttl, clock.as_ref());
                if removed > 0 {
                    debug!(removed, "swept expired pin statuses");
                }
            }
        }));
    }

    /// Halts the sweep ticker. A no-op when the ticker was never started.
    pub fn stop_gc(&self) {
        if let Some(handle) = self.gc.lock().take() {
            handle.abort();
        }
    }
}

impl Default for PinStatusStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Drop for PinStatusStore {
    fn drop(&mut self) {
        self.stop_gc();
    }
}

fn sweep_table(
    table: &RwLock<HashMap<String, PinStatus>>,
    ttl: &RwLock<Option<Duration>>,
    clock: &dyn Clock,
) -> usize {
    let now = clock.now();
    let ttl = ttl.read().unwrap_or_else(default_ttl);
    let mut table = table.write();
    let before = table.len();
    table.retain(|_, status| match status.started_at {
        Some(started) => started + ttl >= now,
        None => true,
    });
    before - table.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_registry::clock::ManualClock;

    fn status(path: &str, started_at: Option<DateTime<Utc>>) -> PinStatus {
        PinStatus {
            path: path.into(),
            started_at,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn set_get_delete() {
        let store = PinStatusStore::default();
        store.set(status("/ipfs/QmA", None));

        let got = store.get("/ipfs/QmA").unwrap();
        assert!(got.started_at.is_some(), "set must stamp started_at");
        assert!(store.get("/ipfs/QmB").is_none());

        store.delete("/ipfs/QmA");
        assert!(store.get("/ipfs/QmA").is_none());
        store.stop_gc();
    }

    #[tokio::test]
    async fn sweep_evicts_by_ttl() {
        let now = Utc::now();
        let clock = ManualClock::new(now);
        let store = PinStatusStore::new(Arc::new(clock));

        store.set(status("/ipfs/QmStale", Some(now - Duration::hours(5))));
        store.set(status("/ipfs/QmFresh", Some(now)));
        assert_eq!(store.len(), 2);

        let removed = store.sweep();
        assert_eq!(removed, 1);
        assert!(store.get("/ipfs/QmStale").is_none());
        assert!(store.get("/ipfs/QmFresh").is_some());
        store.stop_gc();
    }

    #[tokio::test]
    async fn sweep_honors_custom_ttl() {
        let now = Utc::now();
        let clock = ManualClock::new(now);
        let store = PinStatusStore::new(Arc::new(clock.clone()));
        store.set_ttl(Duration::minutes(10));

        store.set(status("/ipfs/QmA", None));
        assert_eq!(store.sweep(), 0);

        clock.advance(Duration::minutes(11));
        assert_eq!(store.sweep(), 1);
        assert!(store.is_empty());
        store.stop_gc();
    }

    #[tokio::test]
    async fn gc_lifecycle_is_idempotent() {
        let store = PinStatusStore::default();
        // stop before any start is a no-op
        store.stop_gc();

        store.set(status("/ipfs/QmA", None));
        // restart replaces the running ticker
        store.start_gc(StdDuration::from_millis(10));
        store.start_gc(StdDuration::from_millis(10));
        store.stop_gc();
        store.stop_gc();
    }

    #[tokio::test]
    async fn background_sweep_runs() {
        let now = Utc::now();
        let clock = ManualClock::new(now);
        let store = PinStatusStore::new(Arc::new(clock.clone()));

        store.set(status("/ipfs/QmA", Some(now - Duration::hours(5))));
        store.start_gc(StdDuration::from_millis(5));
        tokio::time::sleep(StdDuration::from_millis(50)).await;
        assert!(store.get("/ipfs/QmA").is_none());
        store.stop_gc();
    }
}
