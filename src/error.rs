//! Pipeline failure taxonomy.
//!
//! One variant per fatal stage of an ask. Errors recovered below the
//! orchestrator (a missing or corrupt cached index falls back to a
//! rebuild) never appear here; everything that does is final for the
//! invocation and carries a message naming the stage that failed.

use std::fmt;

use crate::loader::LoadError;

/// A failed ask. The orchestrator returns either a full result or one
/// of these, never a partially-filled answer.
#[derive(Debug)]
pub enum AskError {
    /// Credential missing or malformed; raised before any pipeline work.
    Credential(String),
    /// The document could not be read or parsed. Not retried; the
    /// caller must supply the file again.
    Load(LoadError),
    /// Embedding, persisting, or reloading the index failed. Retrying
    /// the whole ask is safe.
    IndexBuild(String),
    /// Query rewriting or the index lookup failed.
    Retrieval(String),
    /// The generation call for the final answer failed.
    Composition(String),
}

impl fmt::Display for AskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AskError::Credential(msg) => write!(f, "credential rejected: {}", msg),
            AskError::Load(e) => write!(f, "document loading failed: {}", e),
            AskError::IndexBuild(msg) => write!(f, "index build failed: {}", msg),
            AskError::Retrieval(msg) => write!(f, "retrieval failed: {}", msg),
            AskError::Composition(msg) => write!(f, "answer composition failed: {}", msg),
        }
    }
}

impl std::error::Error for AskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AskError::Load(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LoadError> for AskError {
    fn from(e: LoadError) -> Self {
        AskError::Load(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_messages_name_the_stage() {
        let e = AskError::IndexBuild("boom".to_string());
        assert!(e.to_string().contains("index build"));

        let e = AskError::Load(LoadError::Missing(PathBuf::from("gone.pdf")));
        assert!(e.to_string().contains("document loading"));
        assert!(e.to_string().contains("gone.pdf"));
    }
}
