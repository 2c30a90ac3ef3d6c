//! Grounded answer composition.
//!
//! The retrieved chunks become the only context the generation model is
//! allowed to answer from, concatenated in retrieval order. With zero
//! retrieved chunks there is nothing to ground an answer in, so the
//! composer returns a fixed "no relevant passages" answer and makes no
//! generation call at all.

use crate::generation::{GenerateError, Generator, Message};
use crate::index::ScoredChunk;

const ANSWER_TEMPLATE: &str = "Answer the user's question based solely on the context below. \
If the context does not contain the answer, say that the document does not cover it.\n\n\
<context>\n{context}\n</context>";

/// Returned when retrieval produced no grounding context.
pub const NO_CONTEXT_ANSWER: &str =
    "I could not find any relevant passages in the document to answer that question.";

/// Compose an answer to `question` from the retrieved `sources`.
pub async fn compose_answer(
    generator: &dyn Generator,
    question: &str,
    sources: &[ScoredChunk],
) -> Result<String, GenerateError> {
    if sources.is_empty() {
        return Ok(NO_CONTEXT_ANSWER.to_string());
    }

    let context = sources
        .iter()
        .map(|s| s.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let system = ANSWER_TEMPLATE.replace("{context}", &context);
    let answer = generator
        .complete(&[Message::system(system), Message::user(question)])
        .await?;

    Ok(answer.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingGenerator {
        prompts: Mutex<Vec<Vec<Message>>>,
    }

    impl RecordingGenerator {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        fn model_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, messages: &[Message]) -> Result<String, GenerateError> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            Ok("  grounded answer \n".to_string())
        }
    }

    fn source(index: usize, text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                page: 0,
                index,
                text: text.to_string(),
            },
            distance: index as f32 * 0.1,
        }
    }

    #[tokio::test]
    async fn test_empty_context_short_circuits_without_generation() {
        let generator = RecordingGenerator::new();
        let answer = compose_answer(&generator, "What is ReAct?", &[])
            .await
            .unwrap();

        assert_eq!(answer, NO_CONTEXT_ANSWER);
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_context_keeps_retrieval_order() {
        let generator = RecordingGenerator::new();
        let sources = vec![source(0, "nearest passage"), source(1, "second passage")];

        let answer = compose_answer(&generator, "What is ReAct?", &sources)
            .await
            .unwrap();
        assert_eq!(answer, "grounded answer");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        let system = &prompts[0][0];
        assert_eq!(system.role, "system");

        let first = system.content.find("nearest passage").unwrap();
        let second = system.content.find("second passage").unwrap();
        assert!(first < second);

        let user = &prompts[0][1];
        assert_eq!(user.role, "user");
        assert_eq!(user.content, "What is ReAct?");
    }
}
