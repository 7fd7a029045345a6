//! Handlers for `/clients` endpoints.
//!
//! | Method   | Path             | Notes |
//! |----------|------------------|-------|
//! | `GET`    | `/clients`       | Every client |
//! | `POST`   | `/clients`       | 201; 409 if the OIB is taken |
//! | `PUT`    | `/clients`       | Matched by OIB; 404 if absent |
//! | `GET`    | `/clients/{oib}` | Also requests a card for the client |
//! | `DELETE` | `/clients/{oib}` | Returns the deleted client |

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cardsync_core::{Client, Oib};
use cardsync_lifecycle::CardRequester;

use crate::{AppState, Store, error::ApiError, extract::AppJson};

/// `GET /clients`
pub async fn list<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
) -> Result<AppJson<Vec<Client>>, ApiError> {
  Ok(AppJson(state.clients.get_all().await?))
}

/// `POST /clients`
pub async fn create<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
  AppJson(client): AppJson<Client>,
) -> Result<impl IntoResponse, ApiError> {
  let client = state.clients.create_client(client).await?;
  Ok((StatusCode::CREATED, AppJson(client)))
}

/// `PUT /clients`
pub async fn update<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
  AppJson(client): AppJson<Client>,
) -> Result<AppJson<Client>, ApiError> {
  Ok(AppJson(state.clients.update_client(client).await?))
}

/// `GET /clients/{oib}`
///
/// The card request runs detached; its outcome never changes this response.
pub async fn get_one<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
  Path(oib): Path<String>,
) -> Result<AppJson<Client>, ApiError> {
  let oib = Oib::parse(oib)?;
  let (client, _provisioning) =
    state.clients.get_by_oib_requesting_card(&oib).await?;
  Ok(AppJson(client))
}

/// `DELETE /clients/{oib}`
pub async fn delete_one<S: Store, R: CardRequester>(
  State(state): State<AppState<S, R>>,
  Path(oib): Path<String>,
) -> Result<AppJson<Client>, ApiError> {
  let oib = Oib::parse(oib)?;
  Ok(AppJson(state.clients.delete_client(&oib).await?))
}
