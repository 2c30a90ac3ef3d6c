//! Embedding provider abstraction and the OpenAI implementation.
//!
//! [`EmbeddingProvider`] turns text into vectors for similarity
//! comparison. [`OpenAiEmbeddings`] calls the OpenAI embeddings API
//! with batching, a bounded per-request timeout, and exponential
//! backoff. The API key is a constructor parameter held by the provider
//! alone; it is never read from process-wide state and never logged.
//!
//! # Retry strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network/timeout errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;

/// Embedding backend failure.
#[derive(Debug)]
pub enum EmbedError {
    /// The request never produced a response (network, TLS, timeout).
    Http(String),
    /// The provider answered with a non-success status.
    Api { status: u16, body: String },
    /// The response arrived but did not have the expected shape.
    InvalidResponse(String),
}

impl fmt::Display for EmbedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedError::Http(e) => write!(f, "embedding request failed: {}", e),
            EmbedError::Api { status, body } => {
                write!(f, "embedding API error {}: {}", status, body)
            }
            EmbedError::InvalidResponse(e) => write!(f, "invalid embedding response: {}", e),
        }
    }
}

impl std::error::Error for EmbedError {}

/// Converts batches of texts into embedding vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Embed a batch of texts: one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        if vectors.is_empty() {
            return Err(EmbedError::InvalidResponse(
                "empty embedding batch".to_string(),
            ));
        }
        Ok(vectors.remove(0))
    }
}

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// Embedding provider backed by `POST /v1/embeddings`.
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_retries: u32,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    pub fn new(config: &EmbeddingConfig, api_key: &str) -> Result<Self, EmbedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbedError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(EMBEDDINGS_URL)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let parsed: EmbeddingsResponse = response
                            .json()
                            .await
                            .map_err(|e| EmbedError::InvalidResponse(e.to_string()))?;
                        return order_embeddings(parsed, texts.len());
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(EmbedError::Api {
                            status: status.as_u16(),
                            body: body_text,
                        });
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    return Err(EmbedError::Api {
                        status: status.as_u16(),
                        body: body_text,
                    });
                }
                Err(e) => {
                    last_err = Some(EmbedError::Http(e.to_string()));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| EmbedError::Http("embedding failed after retries".to_string())))
    }
}

/// Place each returned vector at its `index` so the output lines up
/// with the input batch regardless of response order.
fn order_embeddings(
    resp: EmbeddingsResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbedError> {
    if resp.data.len() != expected {
        return Err(EmbedError::InvalidResponse(format!(
            "expected {} embeddings, got {}",
            expected,
            resp.data.len()
        )));
    }

    let mut out: Vec<Vec<f32>> = vec![Vec::new(); expected];
    for item in resp.data {
        if item.index >= expected {
            return Err(EmbedError::InvalidResponse(format!(
                "embedding index {} out of range",
                item.index
            )));
        }
        out[item.index] = item.embedding;
    }
    Ok(out)
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`; `0.0` for empty vectors or vectors
/// of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_empty_and_mismatched() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_order_embeddings_restores_input_order() {
        let resp = EmbeddingsResponse {
            data: vec![
                EmbeddingItem {
                    index: 1,
                    embedding: vec![2.0],
                },
                EmbeddingItem {
                    index: 0,
                    embedding: vec![1.0],
                },
            ],
        };
        let ordered = order_embeddings(resp, 2).unwrap();
        assert_eq!(ordered, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_order_embeddings_rejects_count_mismatch() {
        let resp = EmbeddingsResponse {
            data: vec![EmbeddingItem {
                index: 0,
                embedding: vec![1.0],
            }],
        };
        assert!(order_embeddings(resp, 2).is_err());
    }
}
