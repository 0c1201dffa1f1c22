//! Remote pinning: signed pin requests, progress statuses, and the
//! TTL-evicting status cache.
//!
//! Pinning asks the registry's storage backend to replicate a piece of
//! content. Requests can take a while, so implementations keep a store of
//! [`PinStatus`] records that callers probe for progress; the store sweeps
//! out stale records by age so it can't grow without bound.

pub mod errors;
#[allow(clippy::module_inception)]
pub mod pinset;
pub mod status;

pub use errors::{PinsetError, Result};
pub use pinset::{MemPinset, PinRequest, Pinset};
pub use status::{PinStatus, PinStatusStore, DEFAULT_GC_INTERVAL};
