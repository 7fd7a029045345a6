//! `POST /card-status` requests a status change for a client and its card.
//!
//! The message is handed to the publisher and the request is answered with
//! 202 before the change is applied.

use axum::{extract::State, http::StatusCode};
use cardsync_core::StatusChangeMessage;
use cardsync_lifecycle::CardRequester;

use crate::{AppState, Store, error::ApiError, extract::AppJson};

pub async fn change<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
  AppJson(message): AppJson<StatusChangeMessage>,
) -> Result<StatusCode, ApiError> {
  state.publisher.publish(&message);
  Ok(StatusCode::ACCEPTED)
}
