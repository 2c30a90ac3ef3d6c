//! Pipeline orchestration: the ask operation.
//!
//! One invocation walks Loading → Chunking → IndexReady → Rewriting →
//! Retrieving → Composing. IndexReady is reached either by loading the
//! persisted index (cache hit) or by build → persist → reload (cache
//! miss; the immediate reload proves the cache entry is usable before
//! the first answer depends on it). Any stage failure maps to one
//! [`AskError`] variant; no partial result is ever returned.
//!
//! Writes to a cache path are not atomic: two processes building the
//! same document race to last-writer-wins on the persisted file, which
//! is acceptable for a single interactive user.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::cache;
use crate::chunk::{Chunk, Splitter};
use crate::compose;
use crate::config::Config;
use crate::credential;
use crate::embedding::{EmbeddingProvider, OpenAiEmbeddings};
use crate::error::AskError;
use crate::generation::{Generator, OpenAiChat};
use crate::index::{IndexLoadError, ScoredChunk, VectorIndex};
use crate::loader;
use crate::retrieve::Retriever;
use crate::rewrite;
use crate::session::ChatHistory;

/// The typed result of one ask: the original question, the composed
/// answer, and the source chunks the answer was grounded in.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub query: String,
    pub answer: String,
    pub sources: Vec<ScoredChunk>,
}

/// How a document's index became ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    /// Loaded from the persisted cache.
    Cache,
    /// Built from the document, persisted, and reloaded.
    Built,
}

/// Wires loader, chunker, index, rewriter, retriever, and composer into
/// a single ask operation. Providers are trait objects so tests (or
/// other backends) can substitute their own.
pub struct Pipeline {
    config: Config,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn Generator>,
}

impl Pipeline {
    /// Wire the pipeline to the OpenAI providers. The key is checked
    /// for shape here and then held by the providers alone.
    pub fn new(config: Config, api_key: &str) -> Result<Self> {
        credential::check_format(api_key)?;
        let embedder = OpenAiEmbeddings::new(&config.embedding, api_key)?;
        let generator = OpenAiChat::new(&config.generation, api_key)?;
        Ok(Self {
            config,
            embedder: Arc::new(embedder),
            generator: Arc::new(generator),
        })
    }

    /// Wire the pipeline to arbitrary providers.
    pub fn with_providers(
        config: Config,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            config,
            embedder,
            generator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Make the index for `document` ready: load it from the cache, or
    /// build, persist, and reload it.
    pub async fn ensure_index(
        &self,
        document: &Path,
    ) -> Result<(VectorIndex, IndexSource), AskError> {
        let identity = document.to_string_lossy();
        let dir = cache::index_dir(&self.config.cache, &identity)
            .map_err(|e| AskError::IndexBuild(format!("cache directory unavailable: {}", e)))?;

        match VectorIndex::load(&dir) {
            Ok(index) => return Ok((index, IndexSource::Cache)),
            Err(IndexLoadError::Missing(_)) => {}
            Err(IndexLoadError::Corrupt(reason)) => {
                eprintln!("warning: discarding cached index: {}", reason);
            }
        }

        let pages = loader::load_pdf(document)?;

        let splitter = Splitter::new(&self.config.chunking);
        let chunks: Vec<Chunk> = splitter.split_pages(&pages).collect();
        if chunks.is_empty() {
            return Err(AskError::IndexBuild(
                "document contains no extractable text".to_string(),
            ));
        }

        let index = VectorIndex::build(
            chunks,
            self.embedder.as_ref(),
            self.config.embedding.batch_size,
        )
        .await
        .map_err(|e| AskError::IndexBuild(e.to_string()))?;

        index
            .persist(&dir)
            .map_err(|e| AskError::IndexBuild(format!("persist failed: {}", e)))?;

        // Reload what was just written rather than trusting the
        // in-memory build; a broken cache entry surfaces now instead of
        // on the next session's cache hit.
        let index = VectorIndex::load(&dir)
            .map_err(|e| AskError::IndexBuild(format!("reload after persist failed: {}", e)))?;

        Ok((index, IndexSource::Built))
    }

    /// Answer `question` about `document`, grounded in its content.
    /// `history` conditions the retrieval query only; the composer
    /// always answers the original question.
    pub async fn ask(
        &self,
        question: &str,
        document: &Path,
        history: &ChatHistory,
    ) -> Result<QueryResult, AskError> {
        let (index, _) = self.ensure_index(document).await?;

        let standalone = rewrite::rewrite_query(self.generator.as_ref(), history, question)
            .await
            .map_err(|e| AskError::Retrieval(format!("query rewrite failed: {}", e)))?;

        let retriever = Retriever::new(
            &index,
            self.embedder.as_ref(),
            self.config.retrieval.top_k,
        );
        let sources = retriever
            .retrieve(&standalone)
            .await
            .map_err(|e| AskError::Retrieval(e.to_string()))?;

        let answer = compose::compose_answer(self.generator.as_ref(), question, &sources)
            .await
            .map_err(|e| AskError::Composition(e.to_string()))?;

        Ok(QueryResult {
            query: question.to_string(),
            answer,
            sources,
        })
    }
}
