//! The search seam. Registries may optionally expose a search provider to
//! the transport layer; index machinery lives behind this trait, outside
//! the core.

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Parameters provided to [`Searchable::search`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: usize,
    pub offset: usize,
}

/// What a search result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Dataset,
    Profile,
}

/// A single search hit: a kind, a key to look the record up by, and an
/// opaque value payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub id: String,
    pub value: serde_json::Value,
}

pub trait Searchable: Send + Sync {
    fn search(&self, params: &SearchParams) -> Result<Vec<SearchResult>>;
}
