//! Google Generative Language (Gemini) REST client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{LanguageModel, LlmError};
use crate::data::{LlmConfig, API_KEY_ENV};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Gemini `generateContent` client.
///
/// Holds one pooled `reqwest::Client`; safe to share across requests.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        // Accept both "gemini-2.0-flash" and "models/gemini-2.0-flash"
        let model = config
            .model
            .strip_prefix("models/")
            .unwrap_or(&config.model)
            .to_string();

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model,
            api_key,
            timeout_secs: config.timeout_secs,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey(API_KEY_ENV))?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::debug!("Calling model {}", self.model);
        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&error_text)
                .map(|body| body.error.message)
                .unwrap_or(error_text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::InvalidResponse(format!(
                "Empty completion (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn client_for(server: &MockServer, api_key: Option<&str>, timeout_secs: u64) -> GeminiClient {
        let config = LlmConfig {
            endpoint: server.base_url(),
            model: "models/gemini-2.0-flash".to_string(),
            timeout_secs,
        };
        GeminiClient::new(&config, api_key.map(str::to_string)).unwrap()
    }

    #[tokio::test]
    async fn test_generate_joins_parts() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .header("x-goog-api-key", "test-key")
                    .json_body(json!({"contents": [{"parts": [{"text": "hello"}]}]}));
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {"parts": [{"text": "{\"headers\":"}, {"text": "[]}"}]},
                        "finishReason": "STOP"
                    }]
                }));
            })
            .await;

        let client = client_for(&server, Some("test-key"), 5);
        let text = client.generate("hello").await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "{\"headers\":[]}");
        assert_eq!(client.model_name(), "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(400).json_body(json!({
                    "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
                }));
            })
            .await;

        let client = client_for(&server, Some("bad-key"), 5);
        let err = client.generate("hello").await.unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200);
            })
            .await;

        let client = client_for(&server, None, 5);
        assert!(!client.is_configured());
        let err = client.generate("hello").await.unwrap_err();

        assert!(matches!(err, LlmError::MissingApiKey(API_KEY_ENV)));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_no_candidates_is_invalid() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200).json_body(json!({"candidates": []}));
            })
            .await;

        let client = client_for(&server, Some("k"), 5);
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({"candidates": []}));
            })
            .await;

        let client = client_for(&server, Some("k"), 1);
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout(1)));
    }
}
