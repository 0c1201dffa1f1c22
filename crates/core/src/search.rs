//! Naive in-memory search over the dataset store.
//!
//! Matches a query substring against dataset keys and meta titles. Good
//! enough for mock servers and small registries; real deployments hang an
//! index-backed provider on the same `Searchable` seam.

use std::sync::Arc;

use harbor_registry::{Datasets, Result, ResultKind, SearchParams, SearchResult, Searchable};

pub struct DatasetSearch {
    datasets: Arc<Datasets>,
}

impl DatasetSearch {
    pub fn new(datasets: Arc<Datasets>) -> Self {
        Self { datasets }
    }
}

impl Searchable for DatasetSearch {
    fn search(&self, params: &SearchParams) -> Result<Vec<SearchResult>> {
        let q = params.q.to_lowercase();
        let mut hits = Vec::new();

        self.datasets.sorted_range(|key, ds| {
            let title = ds
                .meta
                .as_ref()
                .and_then(|meta| meta.get("title"))
                .and_then(|title| title.as_str())
                .unwrap_or("");

            if q.is_empty() || key.to_lowercase().contains(&q) || title.to_lowercase().contains(&q)
            {
                hits.push(SearchResult {
                    kind: ResultKind::Dataset,
                    id: key.to_string(),
                    value: serde_json::to_value(ds).unwrap_or(serde_json::Value::Null),
                });
            }
            false
        });

        let limit = if params.limit == 0 {
            hits.len()
        } else {
            params.limit
        };
        Ok(hits.into_iter().skip(params.offset).take(limit).collect())
    }
}
