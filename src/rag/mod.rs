pub mod index;
pub mod loader;
pub mod splitter;

pub use index::*;
pub use loader::*;
pub use splitter::*;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A piece of knowledge-base text with where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::from([("source".to_string(), source.into())]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    /// Similarity to the query, higher is closer
    pub score: f64,
}

/// Similarity search over the knowledge base.
///
/// Implementations swallow their own failures: an unavailable or empty
/// index yields an empty list.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `k` documents, most relevant first
    async fn retrieve_with_scores(&self, query: &str, k: usize) -> Vec<ScoredDocument>;
}

#[async_trait]
impl<R: Retriever + ?Sized> Retriever for Arc<R> {
    async fn retrieve_with_scores(&self, query: &str, k: usize) -> Vec<ScoredDocument> {
        (**self).retrieve_with_scores(query, k).await
    }
}
