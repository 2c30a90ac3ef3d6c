//! In-memory vector index with on-disk persistence.
//!
//! Owns one embedding vector per chunk and answers exact
//! nearest-neighbor queries by brute-force cosine scan; documents here
//! are a few hundred chunks, far below the point where an approximate
//! index pays off. Persists as a single versioned JSON file inside the
//! per-key cache directory; the format is private to this
//! implementation and only guarantees same-implementation round-trips.

use std::fmt;
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::embedding::{cosine_similarity, EmbedError, EmbeddingProvider};

/// File name inside the per-key cache directory.
const INDEX_FILE: &str = "index.json";
/// Bumped whenever the serialized layout changes.
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    model: String,
    dims: usize,
    created_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

/// A chunk returned from a query, with its cosine distance to the
/// query vector (smaller is closer).
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub distance: f32,
}

/// Why a persisted index could not be loaded. Both cases are recovered
/// by rebuilding; neither reaches the caller of an ask.
#[derive(Debug)]
pub enum IndexLoadError {
    Missing(PathBuf),
    Corrupt(String),
}

impl fmt::Display for IndexLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexLoadError::Missing(p) => write!(f, "no persisted index at {}", p.display()),
            IndexLoadError::Corrupt(e) => write!(f, "persisted index unreadable: {}", e),
        }
    }
}

impl std::error::Error for IndexLoadError {}

/// Exclusive owner of the (chunk, vector) entries for one document.
pub struct VectorIndex {
    model: String,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Embed every chunk and build the index. Order-preserving:
    /// entry `i` always corresponds to `chunks[i]`. Texts go to the
    /// provider `batch_size` at a time.
    pub async fn build(
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> Result<Self, EmbedError> {
        let batch_size = batch_size.max(1);
        let mut entries = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = provider.embed(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(EmbedError::InvalidResponse(format!(
                    "expected {} vectors, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            for (chunk, vector) in batch.iter().cloned().zip(vectors) {
                entries.push(IndexEntry { chunk, vector });
            }
        }

        Ok(Self {
            model: provider.model_name().to_string(),
            entries,
        })
    }

    /// Serialize into `dir`, overwriting any prior contents.
    pub fn persist(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)?;
        let file = fs::File::create(dir.join(INDEX_FILE))?;
        let record = IndexFile {
            version: FORMAT_VERSION,
            model: self.model.clone(),
            dims: self.entries.first().map(|e| e.vector.len()).unwrap_or(0),
            created_at: Utc::now(),
            entries: self.entries.clone(),
        };
        serde_json::to_writer(BufWriter::new(file), &record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(())
    }

    /// Deserialize the index persisted in `dir`.
    pub fn load(dir: &Path) -> Result<Self, IndexLoadError> {
        let path = dir.join(INDEX_FILE);
        if !path.is_file() {
            return Err(IndexLoadError::Missing(path));
        }

        let file = fs::File::open(&path).map_err(|e| IndexLoadError::Corrupt(e.to_string()))?;
        let record: IndexFile = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| IndexLoadError::Corrupt(e.to_string()))?;

        if record.version != FORMAT_VERSION {
            return Err(IndexLoadError::Corrupt(format!(
                "unsupported index format version {}",
                record.version
            )));
        }

        Ok(Self {
            model: record.model,
            entries: record.entries,
        })
    }

    /// The `k` chunks nearest to `query_vec` by cosine distance,
    /// ascending; equal distances keep insertion order.
    pub fn query(&self, query_vec: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, 1.0 - cosine_similarity(query_vec, &e.vector)))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, distance)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                distance,
            })
            .collect()
    }

    /// Embedding model the stored vectors came from.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Maps a fixed set of texts to hand-picked unit vectors.
    struct TableEmbedder;

    fn table_vector(text: &str) -> Vec<f32> {
        match text {
            "alpha" => vec![1.0, 0.0, 0.0],
            "beta" => vec![0.0, 1.0, 0.0],
            "gamma" => vec![0.0, 0.0, 1.0],
            "alpha twin" => vec![1.0, 0.0, 0.0],
            _ => vec![0.5, 0.5, 0.5],
        }
    }

    #[async_trait]
    impl EmbeddingProvider for TableEmbedder {
        fn model_name(&self) -> &str {
            "table"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts.iter().map(|t| table_vector(t)).collect())
        }
    }

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk {
            page: 0,
            index,
            text: text.to_string(),
        }
    }

    async fn build_index(texts: &[&str]) -> VectorIndex {
        let chunks: Vec<Chunk> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| chunk(i, t))
            .collect();
        VectorIndex::build(chunks, &TableEmbedder, 2).await.unwrap()
    }

    #[tokio::test]
    async fn test_build_preserves_order_across_batches() {
        let index = build_index(&["alpha", "beta", "gamma"]).await;
        assert_eq!(index.len(), 3);
        // batch_size = 2 forces two API calls; order must survive.
        assert_eq!(index.entries[0].chunk.text, "alpha");
        assert_eq!(index.entries[2].chunk.text, "gamma");
        assert_eq!(index.entries[2].vector, vec![0.0, 0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_query_sorts_by_ascending_distance() {
        let index = build_index(&["alpha", "beta", "gamma"]).await;
        let results = index.query(&[1.0, 0.1, 0.0], 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.text, "alpha");
        assert!(results[0].distance <= results[1].distance);
        assert!(results[1].distance <= results[2].distance);
    }

    #[tokio::test]
    async fn test_query_tie_break_keeps_insertion_order() {
        let index = build_index(&["beta", "alpha", "alpha twin"]).await;
        let results = index.query(&[1.0, 0.0, 0.0], 2);
        // "alpha" and "alpha twin" tie exactly; earlier insertion wins.
        assert_eq!(results[0].chunk.text, "alpha");
        assert_eq!(results[1].chunk.text, "alpha twin");
        assert_eq!(results[0].distance, results[1].distance);
    }

    #[tokio::test]
    async fn test_query_caps_at_k() {
        let index = build_index(&["alpha", "beta", "gamma"]).await;
        assert_eq!(index.query(&[1.0, 0.0, 0.0], 2).len(), 2);
        assert_eq!(index.query(&[1.0, 0.0, 0.0], 10).len(), 3);
    }

    #[tokio::test]
    async fn test_persist_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("index-abc");

        let index = build_index(&["alpha", "beta"]).await;
        index.persist(&dir).unwrap();

        let reloaded = VectorIndex::load(&dir).unwrap();
        assert_eq!(reloaded.model_name(), "table");
        assert_eq!(reloaded.len(), index.len());
        for (a, b) in index.entries.iter().zip(reloaded.entries.iter()) {
            assert_eq!(a.chunk, b.chunk);
            assert_eq!(a.vector, b.vector);
        }
    }

    #[tokio::test]
    async fn test_persist_overwrites_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("index-abc");

        build_index(&["alpha", "beta", "gamma"])
            .await
            .persist(&dir)
            .unwrap();
        build_index(&["alpha"]).await.persist(&dir).unwrap();

        assert_eq!(VectorIndex::load(&dir).unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let err = VectorIndex::load(&tmp.path().join("absent")).unwrap_err();
        assert!(matches!(err, IndexLoadError::Missing(_)));
    }

    #[test]
    fn test_load_corrupt_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("index-abc");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(INDEX_FILE), "truncated {").unwrap();

        let err = VectorIndex::load(&dir).unwrap_err();
        assert!(matches!(err, IndexLoadError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_load_rejects_future_format_version() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("index-abc");

        build_index(&["alpha"]).await.persist(&dir).unwrap();
        let raw = fs::read_to_string(dir.join(INDEX_FILE)).unwrap();
        fs::write(
            dir.join(INDEX_FILE),
            raw.replacen("\"version\":1", "\"version\":99", 1),
        )
        .unwrap();

        let err = VectorIndex::load(&dir).unwrap_err();
        assert!(matches!(err, IndexLoadError::Corrupt(_)));
    }
}
