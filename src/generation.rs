//! Generation capability abstraction and the OpenAI chat implementation.
//!
//! [`Generator`] runs one completion over a short message list and
//! returns the text content. [`OpenAiChat`] calls the chat completions
//! API at temperature 0 with the same timeout and retry discipline as
//! the embedding provider.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;

/// A single chat message sent to the generation capability.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Generation backend failure.
#[derive(Debug)]
pub enum GenerateError {
    Http(String),
    Api { status: u16, body: String },
    InvalidResponse(String),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Http(e) => write!(f, "generation request failed: {}", e),
            GenerateError::Api { status, body } => {
                write!(f, "generation API error {}: {}", status, body)
            }
            GenerateError::InvalidResponse(e) => write!(f, "invalid generation response: {}", e),
        }
    }
}

impl std::error::Error for GenerateError {}

/// Runs one completion and returns the generated text.
#[async_trait]
pub trait Generator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn complete(&self, messages: &[Message]) -> Result<String, GenerateError>;
}

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Chat generation backed by `POST /v1/chat/completions`.
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiChat {
    pub fn new(config: &GenerationConfig, api_key: &str) -> Result<Self, GenerateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerateError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Generator for OpenAiChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, GenerateError> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(CHAT_COMPLETIONS_URL)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let parsed: ChatResponse = response
                            .json()
                            .await
                            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;
                        return parsed
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.message.content)
                            .ok_or_else(|| {
                                GenerateError::InvalidResponse(
                                    "response contained no completion".to_string(),
                                )
                            });
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(GenerateError::Api {
                            status: status.as_u16(),
                            body: body_text,
                        });
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    return Err(GenerateError::Api {
                        status: status.as_u16(),
                        body: body_text,
                    });
                }
                Err(e) => {
                    last_err = Some(GenerateError::Http(e.to_string()));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| GenerateError::Http("generation failed after retries".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let m = Message::system("context here");
        assert_eq!(m.role, "system");
        let m = Message::user("question");
        assert_eq!(m.role, "user");
        assert_eq!(m.content, "question");
    }
}
