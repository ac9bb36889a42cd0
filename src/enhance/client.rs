//! Anthropic messages API client
//!
//! Thin wrapper around reqwest. The model id and token budget are fixed:
//! this service sends one kind of request (improve a document) and the
//! frontend never picks models.

use super::EnhanceError;
use serde_json::{json, Value};
use std::time::Duration;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-sonnet-4-20250514";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the text-improvement model. Cheap to clone; holds the
/// credential (if any) and a shared connection pool.
#[derive(Clone)]
pub struct AiClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl AiClient {
    pub fn new(api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            log::warn!("[ai] No API key configured; enhancement endpoints will return 503");
        }
        AiClient {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send one completion request and return the upstream response body
    /// verbatim. The proxy route forwards this untouched.
    pub async fn raw_complete(&self, prompt: &str, system: &str) -> Result<Value, EnhanceError> {
        let api_key = self.api_key.as_deref().ok_or(EnhanceError::CredentialMissing)?;

        let body = json!({
            "model": MODEL,
            "max_tokens": MAX_TOKENS,
            "system": system,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| EnhanceError::Network(e.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| EnhanceError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or("AI enhancement failed")
                .to_string();
            log::error!("[ai] Upstream returned {}: {}", status, message);
            return Err(EnhanceError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(payload)
    }

    /// Send one completion request and extract the first content block's
    /// text. Fails with `EmptyResponse` when the reply has no text block.
    pub async fn complete(&self, prompt: &str, system: &str) -> Result<String, EnhanceError> {
        let payload = self.raw_complete(prompt, system).await?;
        extract_text(&payload).ok_or(EnhanceError::EmptyResponse)
    }
}

/// First content block text of a messages API response
fn extract_text(payload: &Value) -> Option<String> {
    let text = payload["content"][0]["text"].as_str()?;
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text() {
        let payload = json!({"content": [{"type": "text", "text": "hello"}]});
        assert_eq!(extract_text(&payload).as_deref(), Some("hello"));
    }

    #[test]
    fn test_extract_text_missing_or_empty() {
        assert!(extract_text(&json!({"content": []})).is_none());
        assert!(extract_text(&json!({})).is_none());
        assert!(extract_text(&json!({"content": [{"type": "text", "text": ""}]})).is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_credential_error() {
        let client = AiClient::new(None);
        let err = client.complete("p", "s").await.unwrap_err();
        assert!(matches!(err, EnhanceError::CredentialMissing));
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        assert!(!AiClient::new(Some("   ".to_string())).is_configured());
        assert!(AiClient::new(Some("sk-test".to_string())).is_configured());
    }
}
