//! A JSON extractor whose rejection is an [`ApiError`].

use axum::{
  extract::FromRequest,
  response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// `axum::Json`, but a malformed body is answered in the API's error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
  fn into_response(self) -> Response { axum::Json(self.0).into_response() }
}
