//! JSON REST API for cardsync.
//!
//! Exposes an axum [`Router`] over the client and card lifecycles and the
//! status publisher. Every route lives under `/api/v1`. Auth and TLS are the
//! deployer's responsibility.

pub mod cards;
pub mod clients;
pub mod error;
pub mod extract;
pub mod status;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  http::{HeaderValue, Method, header, header::InvalidHeaderValue},
  routing::{get, post},
};
use cardsync_core::store::{CardStore, ClientStore};
use cardsync_lifecycle::{
  CardLifecycle, CardRequester, ClientLifecycle, StatusPublisher,
  channel::STATUS_TOPIC,
};
use serde::Deserialize;
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CARDSYNC_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                    String,
  #[serde(default = "default_port")]
  pub port:                    u16,
  #[serde(default = "default_store_path")]
  pub store_path:              PathBuf,
  #[serde(default = "default_topic")]
  pub topic:                   String,
  #[serde(default = "default_partitions")]
  pub partitions:              usize,
  /// Where lookups send new-card requests. Defaults to this server's own
  /// `/api/v1/card-request`.
  #[serde(default)]
  pub card_request_url:        Option<String>,
  #[serde(default = "default_card_request_timeout_ms")]
  pub card_request_timeout_ms: u64,
  /// Origins allowed to call the API from a browser. `*` allows any origin;
  /// an empty list disables cross-origin access.
  #[serde(default = "default_cors_allowed_origins")]
  pub cors_allowed_origins:    Vec<String>,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("cardsync.db") }
fn default_topic() -> String { STATUS_TOPIC.to_string() }
fn default_partitions() -> usize { 4 }
fn default_card_request_timeout_ms() -> u64 { 2000 }
fn default_cors_allowed_origins() -> Vec<String> { vec!["*".to_string()] }

impl ServerConfig {
  pub fn card_request_url(&self) -> String {
    if let Some(url) = &self.card_request_url {
      return url.clone();
    }
    let host = match self.host.as_str() {
      "0.0.0.0" | "::" => "127.0.0.1",
      h => h,
    };
    format!("http://{host}:{}/api/v1/card-request", self.port)
  }

  pub fn card_request_timeout(&self) -> Duration {
    Duration::from_millis(self.card_request_timeout_ms)
  }

  pub fn cors_layer(&self) -> Result<CorsLayer, InvalidHeaderValue> {
    cors_layer(&self.cors_allowed_origins)
  }
}

/// Build the CORS policy for `origins`. Any entry equal to `*` allows every
/// origin.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
  let allow_origin = if origins.iter().any(|o| o == "*") {
    AllowOrigin::any()
  } else {
    AllowOrigin::list(
      origins
        .iter()
        .map(|o| HeaderValue::from_str(o))
        .collect::<Result<Vec<_>, _>>()?,
    )
  };

  Ok(
    CorsLayer::new()
      .allow_origin(allow_origin)
      .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
      .allow_headers([header::CONTENT_TYPE]),
  )
}

// ─── Application state ────────────────────────────────────────────────────────

/// A backend that stores both aggregates.
pub trait Store: ClientStore + CardStore + Send + Sync + 'static {}

impl<T: ClientStore + CardStore + Send + Sync + 'static> Store for T {}

/// Shared state threaded through all axum handlers.
pub struct AppState<S, R> {
  pub clients:   Arc<ClientLifecycle<S, R>>,
  pub cards:     Arc<CardLifecycle<S>>,
  pub publisher: StatusPublisher,
}

impl<S, R> Clone for AppState<S, R> {
  fn clone(&self) -> Self {
    Self {
      clients:   Arc::clone(&self.clients),
      cards:     Arc::clone(&self.cards),
      publisher: self.publisher.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full router, with every route nested under `/api/v1`, `cors`
/// applied to all of them, and HTTP requests traced.
pub fn router<S, R>(state: AppState<S, R>, cors: CorsLayer) -> Router
where
  S: Store,
  R: CardRequester,
{
  let api = Router::new()
    // Clients
    .route(
      "/clients",
      get(clients::list::<S, R>)
        .post(clients::create::<S, R>)
        .put(clients::update::<S, R>),
    )
    .route(
      "/clients/{oib}",
      get(clients::get_one::<S, R>).delete(clients::delete_one::<S, R>),
    )
    // Cards
    .route(
      "/cards",
      get(cards::list::<S, R>)
        .post(cards::create::<S, R>)
        .put(cards::update::<S, R>),
    )
    .route(
      "/cards/{card_number}",
      get(cards::get_one::<S, R>).delete(cards::delete_one::<S, R>),
    )
    .route("/cards/client/{oib}", get(cards::by_oib::<S, R>))
    .route("/card-request", post(cards::request::<S, R>))
    // Status synchronization
    .route("/card-status", post(status::change::<S, R>))
    .with_state(state);

  Router::new()
    .nest("/api/v1", api)
    .layer(cors)
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
