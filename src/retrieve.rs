//! Top-K chunk retrieval over the vector index.

use crate::embedding::{EmbedError, EmbeddingProvider};
use crate::index::{ScoredChunk, VectorIndex};

/// Stateless "query in, nearest chunks out" wrapper around an index.
pub struct Retriever<'a> {
    index: &'a VectorIndex,
    provider: &'a dyn EmbeddingProvider,
    top_k: usize,
}

impl<'a> Retriever<'a> {
    pub fn new(index: &'a VectorIndex, provider: &'a dyn EmbeddingProvider, top_k: usize) -> Self {
        Self {
            index,
            provider,
            top_k,
        }
    }

    /// Embed `query` and return at most `top_k` chunks, nearest first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>, EmbedError> {
        let query_vec = self.provider.embed_query(query).await?;
        Ok(self.index.query(&query_vec, self.top_k))
    }
}
