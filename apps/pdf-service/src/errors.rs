use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::FieldError;
use crate::pdf::error::PdfError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// A render pipeline failure. `message` is what the client sees; the
    /// source is only logged.
    #[error("{message}: {source}")]
    Pdf {
        message: &'static str,
        #[source]
        source: PdfError,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn pdf(message: &'static str) -> impl FnOnce(PdfError) -> AppError {
        move |source| AppError::Pdf { message, source }
    }
}

impl From<Vec<FieldError>> for AppError {
    fn from(errors: Vec<FieldError>) -> Self {
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": "Validation failed",
                    "errors": errors
                })),
            )
                .into_response(),
            AppError::Pdf { message, source } => {
                tracing::error!("{message}: {source}");
                internal(message)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                internal("Internal server error")
            }
        }
    }
}

fn internal(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": message })),
    )
        .into_response()
}
