//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Deterministic domain failures are surfaced with their message. Anything
//! else is logged under a fresh correlation id and answered with a generic
//! 500 body carrying only that id.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use cardsync_core::{Error, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] Error),

  /// The request body was missing, not JSON, or did not match the schema.
  #[error("{}", .0.body_text())]
  Body(#[from] JsonRejection),
}

impl From<ValidationError> for ApiError {
  fn from(e: ValidationError) -> Self { Self::Core(e.into()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::Core(Error::Validation(e)) => {
        (StatusCode::BAD_REQUEST, e.to_string())
      }
      ApiError::Core(e @ Error::NotFound(_)) => {
        (StatusCode::NOT_FOUND, e.to_string())
      }
      ApiError::Core(e @ Error::AlreadyExists(_)) => {
        (StatusCode::CONFLICT, e.to_string())
      }
      ApiError::Core(e) => return internal(e),
      ApiError::Body(rejection) => {
        let status = match &rejection {
          JsonRejection::JsonDataError(_)
          | JsonRejection::JsonSyntaxError(_) => StatusCode::BAD_REQUEST,
          other => other.status(),
        };
        (status, rejection.body_text())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

fn internal(e: Error) -> Response {
  let id = Uuid::new_v4();
  error!(%id, error = %e, "internal error");
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "error": "internal server error", "id": id })),
  )
    .into_response()
}
