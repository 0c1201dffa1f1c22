//! Conversion between transport-layer URL paths and reference strings.
//!
//! HTTP routes encode the `@` of a reference as a `/at` path segment, since
//! `@` is awkward in URLs. The transport layer is expected to run this
//! rewrite before handing a string to [`parse_ref`].

use crate::errors::Result;
use crate::reference::{parse_ref, Ref};

/// Rewrites an HTTP path into a reference string: strips any query suffix,
/// swaps the first `/at` for `@`, and drops the leading slash.
pub fn http_path_to_ref_path(path: &str) -> String {
    let path = match path.find('?') {
        Some(i) => &path[..i],
        None => path,
    };
    let path = path.replacen("/at", "@", 1);
    path.strip_prefix('/').unwrap_or(&path).to_string()
}

/// Parses the reference named by an HTTP path.
pub fn ref_from_http_path(path: &str) -> Result<Ref> {
    parse_ref(&http_path_to_ref_path(path))
}
