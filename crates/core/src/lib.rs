//! The aggregate registry handed to a transport layer.
//!
//! A [`Registry`] bundles the profile and dataset name stores with optional
//! pinning and search providers. The facade performs no mutation itself;
//! every write funnels through the stores' register/deregister/store/delete
//! operations.

pub mod registry;
pub mod search;

pub use registry::Registry;
pub use search::DatasetSearch;

pub use harbor_pinset as pinset;
pub use harbor_refs as refs;
pub use harbor_registry::{Datasets, Profiles};
