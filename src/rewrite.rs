//! History-aware query rewriting.
//!
//! A follow-up question ("what does it use?") is rewritten into a
//! standalone query against the prior conversation turns before
//! anything is embedded; the rewritten form is what retrieval matches
//! on. With no history the question is already standalone and passes
//! through unchanged, without spending a generation call.

use crate::generation::{GenerateError, Generator, Message};
use crate::session::ChatHistory;

const REPHRASE_TEMPLATE: &str = "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question, in its original language. \
Return only the standalone question.\n\n\
Chat History:\n{chat_history}\n\n\
Follow Up Question: {question}\n\
Standalone Question:";

/// Produce a standalone query for `question` given the prior turns.
pub async fn rewrite_query(
    generator: &dyn Generator,
    history: &ChatHistory,
    question: &str,
) -> Result<String, GenerateError> {
    let question = question.trim();
    if history.is_empty() {
        return Ok(question.to_string());
    }

    let prompt = REPHRASE_TEMPLATE
        .replace("{chat_history}", &format_history(history))
        .replace("{question}", question);

    let rewritten = generator.complete(&[Message::user(prompt)]).await?;
    let rewritten = rewritten.trim();

    // An empty rewrite would retrieve nothing; keep the original.
    if rewritten.is_empty() {
        Ok(question.to_string())
    } else {
        Ok(rewritten.to_string())
    }
}

fn format_history(history: &ChatHistory) -> String {
    history
        .turns()
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}
