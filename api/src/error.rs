use std::sync::Arc;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{StoreError, ValidationError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// JSON body of every response that only carries a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The central error type used for HTTP responses.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("bad request")]
    BadRequest(&'static str),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Doctor already exists with the same details.")]
    Duplicate,

    /// A store failure. `message` is all the client gets to see.
    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("internal error")]
    Internal(
        #[source]
        #[from]
        eyre::Report,
    ),
}

impl AppError {
    /// Converts a store error, using `message` for failures the client cannot fix.
    pub fn from_store(err: StoreError, message: &'static str) -> Self {
        match err {
            StoreError::Duplicate => AppError::Duplicate,
            source => AppError::Storage { message, source },
        }
    }

    /// Whether this error is a server side failure.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AppError::Storage { .. } | AppError::Internal(..))
    }
}

impl From<JsonRejection> for AppError {
    fn from(_: JsonRejection) -> Self {
        AppError::BadRequest("Invalid request body.")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Storage { message, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, (*message).to_string())
            }
            AppError::Internal(..) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, (*msg).to_string()),
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Duplicate => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let mut response = (status, Json(MessageResponse::new(message))).into_response();

        response.extensions_mut().insert(Arc::new(self));

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_store_error_is_a_client_error() {
        let err = AppError::from_store(StoreError::Duplicate, "Failed to add doctor.");

        assert!(matches!(err, AppError::Duplicate));
        assert!(!err.is_server_error());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failures_hide_their_cause() {
        let err = AppError::from_store(StoreError::NotConfigured, "Database connection error");

        assert!(err.is_server_error());
        assert_eq!(err.to_string(), "Database connection error");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let response = AppError::from(ValidationError::MissingFields).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.extensions().get::<Arc<AppError>>().is_some());
    }
}
