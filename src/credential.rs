//! Credential checks run before any pipeline work.
//!
//! The format check is cheap and offline; `validate` adds one
//! inexpensive round-trip to the provider's model listing to confirm
//! the key is live before a whole ask is spent on it. The key only ever
//! travels in the Authorization header and is never logged.

use std::time::Duration;

use crate::error::AskError;

const MODELS_URL: &str = "https://api.openai.com/v1/models";
const KEY_PREFIX: &str = "sk-";
const MIN_KEY_LEN: usize = 40;

/// Offline shape check: non-empty, recognized prefix, minimum length.
pub fn check_format(api_key: &str) -> Result<(), AskError> {
    if api_key.trim().is_empty() {
        return Err(AskError::Credential("no API key provided".to_string()));
    }
    if !api_key.starts_with(KEY_PREFIX) || api_key.len() < MIN_KEY_LEN {
        return Err(AskError::Credential(
            "API key is not in the expected format".to_string(),
        ));
    }
    Ok(())
}

/// Format check plus one model-list round-trip against the provider.
pub async fn validate(api_key: &str, timeout_secs: u64) -> Result<(), AskError> {
    check_format(api_key)?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AskError::Credential(e.to_string()))?;

    let resp = client
        .get(MODELS_URL)
        .header("Authorization", format!("Bearer {}", api_key))
        .send()
        .await
        .map_err(|e| AskError::Credential(format!("validation request failed: {}", e)))?;

    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else if status.as_u16() == 401 || status.as_u16() == 403 {
        Err(AskError::Credential(
            "API key was rejected by the provider".to_string(),
        ))
    } else {
        Err(AskError::Credential(format!(
            "validation returned HTTP {}",
            status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(check_format(""), Err(AskError::Credential(_))));
        assert!(matches!(check_format("   "), Err(AskError::Credential(_))));
    }

    #[test]
    fn test_wrong_prefix_rejected() {
        let key = format!("pk-{}", "a".repeat(48));
        assert!(check_format(&key).is_err());
    }

    #[test]
    fn test_short_key_rejected() {
        assert!(check_format("sk-short").is_err());
    }

    #[test]
    fn test_plausible_key_accepted() {
        let key = format!("sk-{}", "a".repeat(48));
        assert!(check_format(&key).is_ok());
    }
}
