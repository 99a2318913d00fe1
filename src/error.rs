use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::llm::LlmError;
use crate::services::stt::SttError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("upstream request failed: {detail}")]
    Upstream { status: Option<u16>, detail: String },
    #[error("internal error: {0}")]
    Internal(String),
    #[error("server api key missing")]
    Configuration,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) | AppError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn envelope(&self) -> ErrorResponse {
        match self {
            AppError::InvalidInput(message) => ErrorResponse {
                error: message.clone(),
                detail: None,
            },
            AppError::Unauthorized => ErrorResponse {
                error: "unauthorized".to_string(),
                detail: None,
            },
            AppError::Upstream { detail, .. } => ErrorResponse {
                error: "upstream request failed".to_string(),
                detail: Some(detail.clone()),
            },
            AppError::Internal(detail) => ErrorResponse {
                error: "internal error".to_string(),
                detail: Some(detail.clone()),
            },
            AppError::Configuration => ErrorResponse {
                error: "server api key missing".to_string(),
                detail: None,
            },
        }
    }

    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_builder() {
            return AppError::Internal(e.to_string());
        }

        AppError::Upstream {
            status: e.status().map(|s| s.as_u16()),
            detail: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Upstream { status: upstream, .. } => {
                tracing::error!(upstream_status = ?upstream, error = %self, "Upstream call failed")
            }
            AppError::Internal(_) | AppError::Configuration => {
                tracing::error!(error = %self, "Request failed")
            }
            _ => tracing::warn!(status = status.as_u16(), error = %self, "Request rejected"),
        }

        (status, Json(self.envelope())).into_response()
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::RequestError(e) => AppError::from_transport(e),
            LlmError::ApiError(failure) => AppError::Upstream {
                status: Some(failure.status.as_u16()),
                detail: failure.to_string(),
            },
            LlmError::InvalidResponse(detail) => AppError::Upstream {
                status: None,
                detail,
            },
        }
    }
}

impl From<SttError> for AppError {
    fn from(e: SttError) -> Self {
        match e {
            SttError::RequestError(e) => AppError::from_transport(e),
            SttError::ApiError(failure) => AppError::Upstream {
                status: Some(failure.status.as_u16()),
                detail: failure.to_string(),
            },
            SttError::InvalidUpload(message) => AppError::InvalidInput(message),
        }
    }
}
