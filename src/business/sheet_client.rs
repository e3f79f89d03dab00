//! Sheet API Client
//!
//! Submits an instruction to the conversion endpoint and returns the workbook.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::server::types::{ConvertRequest, ErrorResponse, CONVERT_PATH};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Anything that can turn an instruction into workbook bytes
#[async_trait]
pub trait SheetApi: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ClientError>;
}

/// HTTP client for `POST /api/excel`
pub struct HttpSheetClient {
    http: reqwest::Client,
    url: String,
}

impl HttpSheetClient {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            http,
            url: format!("{}{}", server_url.trim_end_matches('/'), CONVERT_PATH),
        })
    }
}

#[async_trait]
impl SheetApi for HttpSheetClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ClientError> {
        let response = self
            .http
            .post(&self.url)
            .json(&ConvertRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
