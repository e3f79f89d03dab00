//! Request/response types of the HTTP API

use serde::{Deserialize, Serialize};

pub const CONVERT_PATH: &str = "/api/excel";
pub const STATUS_PATH: &str = "/api/status";

/// Conversion request
#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertRequest {
    /// Natural-language instruction
    pub prompt: String,
}

/// Error body returned with status 500
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Server status
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `ready` or `missing_key`
    pub status: String,
    pub model: String,
    pub extraction: String,
    pub version: String,
}
