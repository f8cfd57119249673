use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tabplan_exec::{ExecutionError, TableError};
use tabplan_registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    NotFound(#[from] RegistryError),

    #[error("No file ids given")]
    NoFiles,

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Invalid table: {0}")]
    InvalidTable(#[from] TableError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) | ApiError::NoFiles => StatusCode::NOT_FOUND,
            ApiError::Execution(_) | ApiError::InvalidTable(_) => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
