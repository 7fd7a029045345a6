//! Handlers for `/cards` and `/card-request` endpoints.
//!
//! | Method   | Path                   | Notes |
//! |----------|------------------------|-------|
//! | `GET`    | `/cards`               | Every card |
//! | `POST`   | `/cards`               | 201; 409 if the number or OIB is taken |
//! | `PUT`    | `/cards`               | Matched by card number; 404 if absent |
//! | `GET`    | `/cards/{cardNumber}`  | |
//! | `DELETE` | `/cards/{cardNumber}`  | Returns the deleted card |
//! | `GET`    | `/cards/client/{oib}`  | The card held by `oib` |
//! | `POST`   | `/card-request`        | Issue a card under a generated number |

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cardsync_core::{Card, CardNumber, Oib};
use cardsync_lifecycle::{CardRequest, CardRequester};

use crate::{AppState, Store, error::ApiError, extract::AppJson};

/// `GET /cards`
pub async fn list<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
) -> Result<AppJson<Vec<Card>>, ApiError> {
  Ok(AppJson(state.cards.get_all().await?))
}

/// `POST /cards`
pub async fn create<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
  AppJson(card): AppJson<Card>,
) -> Result<impl IntoResponse, ApiError> {
  let card = state.cards.create_card(card).await?;
  Ok((StatusCode::CREATED, AppJson(card)))
}

/// `PUT /cards`
pub async fn update<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
  AppJson(card): AppJson<Card>,
) -> Result<AppJson<Card>, ApiError> {
  Ok(AppJson(state.cards.update_card(card).await?))
}

/// `GET /cards/{cardNumber}`
pub async fn get_one<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
  Path(card_number): Path<String>,
) -> Result<AppJson<Card>, ApiError> {
  let card_number = CardNumber::parse(card_number)?;
  Ok(AppJson(state.cards.get_by_card_number(&card_number).await?))
}

/// `DELETE /cards/{cardNumber}`
pub async fn delete_one<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
  Path(card_number): Path<String>,
) -> Result<AppJson<Card>, ApiError> {
  let card_number = CardNumber::parse(card_number)?;
  Ok(AppJson(state.cards.delete_card(&card_number).await?))
}

/// `GET /cards/client/{oib}`
pub async fn by_oib<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
  Path(oib): Path<String>,
) -> Result<AppJson<Card>, ApiError> {
  let oib = Oib::parse(oib)?;
  Ok(AppJson(state.cards.get_by_oib(&oib).await?))
}

/// `POST /card-request` with body `{"oib":"…","status":"PENDING",…}`
pub async fn request<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
  AppJson(request): AppJson<CardRequest>,
) -> Result<impl IntoResponse, ApiError> {
  request.validate()?;
  let card = state
    .cards
    .create_card_for_client(request.oib, request.status)
    .await?;
  Ok((StatusCode::CREATED, AppJson(card)))
}
