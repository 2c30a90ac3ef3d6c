use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration. Every section has complete defaults, so a
/// config file is optional and may specify only the fields it changes.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Root directory for persisted indexes. Overridable with the
    /// `DOCASK_INDEX_DIR` environment variable.
    #[serde(default = "default_index_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
        }
    }
}

fn default_index_dir() -> PathBuf {
    std::env::var_os("DOCASK_INDEX_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./data/indexes"))
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Target chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    /// Preferred split boundary within the target window.
    #[serde(default = "default_separator")]
    pub separator: char,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            separator: default_separator(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_overlap() -> usize {
    30
}
fn default_separator() -> char {
    '\n'
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Texts per embeddings API call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_embedding_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_model")]
    pub model: String,
    /// Deterministic answers by default.
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_generation_model(),
            temperature: 0.0,
            max_retries: default_max_retries(),
            timeout_secs: default_generation_timeout_secs(),
        }
    }
}

fn default_generation_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_generation_timeout_secs() -> u64 {
    60
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to the defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.is_file() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.overlap >= config.chunking.chunk_size {
        anyhow::bail!("chunking.overlap must be smaller than chunking.chunk_size");
    }
    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.embedding.batch_size == 0 {
        anyhow::bail!("embedding.batch_size must be > 0");
    }
    if config.embedding.model.is_empty() {
        anyhow::bail!("embedding.model must not be empty");
    }
    if config.generation.model.is_empty() {
        anyhow::bail!("generation.model must not be empty");
    }
    if config.embedding.timeout_secs == 0 || config.generation.timeout_secs == 0 {
        anyhow::bail!("timeout_secs must be > 0");
    }
    Ok(())
}
