//! Reference grammar for the harbor dataset naming system.
//!
//! A reference is a compact string naming a peer, a dataset, or a specific
//! content-addressed version of a dataset:
//!
//! ```text
//! peer_name/dataset_name@profile_id/network/hash
//! ```
//!
//! Every segment is optional. Human-chosen names and content-hash tokens
//! share positions in the grammar and are disambiguated by checking whether
//! a token base58-decodes to a valid multihash.

pub mod errors;
pub mod http;
pub mod reference;

pub use errors::{RefError, Result};
pub use http::{http_path_to_ref_path, ref_from_http_path};
pub use reference::{compare_refs, is_base58_multihash, must_parse_ref, parse_ref, Ref};
