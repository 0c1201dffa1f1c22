//! Proof-of-control name registry primitives.
//!
//! A registry keeps centralized stores of claims made by peers on a
//! decentralized dataset network. That seems to run against the grain of
//! decentralization, but associating human-readable names with crypto
//! keypairs is an order of magnitude easier if you just put the damn thing
//! in a list. So that's what this crate does: claims are accepted when the
//! registrant proves control of the claimed keypair by signature, and
//! stored in concurrency-safe name stores with deterministic enumeration.

pub mod clock;
pub mod dataset;
pub mod errors;
pub mod profile;
pub mod proof;
pub mod search;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dataset::{Commit, Dataset, Structure};
pub use errors::{RegistryError, Result};
pub use profile::Profile;
pub use proof::{build_profile_proof, profile_id, sign_commit, verify, ProfileProof};
pub use search::{ResultKind, SearchParams, SearchResult, Searchable};
pub use store::{Datasets, NameStore, Profiles, Record, RegisterPolicy};
