//! The `Registry` facade.

use std::sync::Arc;

use harbor_pinset::{MemPinset, Pinset};
use harbor_registry::clock::Clock;
use harbor_registry::{Datasets, Profiles, Searchable};

use crate::search::DatasetSearch;

/// A registry: name stores plus optional pinning and search providers.
///
/// Holds references to its stores but performs no mutation of its own; all
/// writes go through the stores' guarded operations.
#[derive(Clone)]
pub struct Registry {
    pub profiles: Arc<Profiles>,
    pub datasets: Arc<Datasets>,
    pub search: Option<Arc<dyn Searchable>>,
    pub pinset: Option<Arc<dyn Pinset>>,
}

impl Registry {
    pub fn new(profiles: Arc<Profiles>, datasets: Arc<Datasets>) -> Self {
        Self {
            profiles,
            datasets,
            search: None,
            pinset: None,
        }
    }

    pub fn with_search(mut self, search: Arc<dyn Searchable>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_pinset(mut self, pinset: Arc<dyn Pinset>) -> Self {
        self.pinset = Some(pinset);
        self
    }

    /// A fully in-memory registry: empty stores, naive dataset search, and
    /// a memory-backed pinset. The shape used by mock servers and tests.
    pub fn memory(clock: Arc<dyn Clock>) -> Self {
        let profiles = Arc::new(Profiles::new(Arc::clone(&clock)));
        let datasets = Arc::new(Datasets::new(Arc::clone(&clock)));
        let search = DatasetSearch::new(Arc::clone(&datasets));
        let pinset = MemPinset::new(clock);
        Self::new(profiles, datasets)
            .with_search(Arc::new(search))
            .with_pinset(Arc::new(pinset))
    }
}
