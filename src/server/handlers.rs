//! API request handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::business::{ConvertError, Converter, XLSX_CONTENT_TYPE};
use crate::server::types::{ConvertRequest, ErrorResponse, StatusResponse};

/// Shared handler state
pub struct AppState {
    pub converter: Converter,
}

/// Any failure while serving a conversion; always answered with 500 JSON
#[derive(Debug)]
pub struct ApiError(String);

impl ApiError {
    fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self("Internal server error".to_string())
        } else {
            Self(message)
        }
    }
}

impl From<ConvertError> for ApiError {
    fn from(err: ConvertError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: self.0 }),
        )
            .into_response()
    }
}

/// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let model = state.converter.model();
    let status = if model.is_configured() {
        "ready"
    } else {
        "missing_key"
    };

    Json(StatusResponse {
        status: status.to_string(),
        model: model.model_name().to_string(),
        extraction: state.converter.extraction().mode.as_str().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/excel - instruction in, workbook out
#[tracing::instrument(name = "convert", skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn convert(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::error!("Rejected request body: {}", e.body_text());
        ApiError::from(e)
    })?;

    let conversion = state
        .converter
        .convert(&request.prompt)
        .await
        .map_err(|e| {
            tracing::error!("Conversion failed: {}", e);
            ApiError::from(e)
        })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        state.converter.workbook().file_name
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        conversion.bytes,
    )
        .into_response())
}
