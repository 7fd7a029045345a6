//! Best-effort card provisioning for looked-up clients.
//!
//! When a client is looked up, the card subsystem is asked to issue a card
//! for that OIB. The request runs on its own task under a timeout, and its
//! failure never reaches the caller of the lookup: an existing card,
//! a downstream error and a timeout are all logged and swallowed.

use std::{future::Future, sync::Arc, time::Duration};

use cardsync_core::{
  Client, Entity, Error, Oib, Result, Status, ValidationError,
  client::{check_first_name, check_last_name},
  store::CardStore,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::CardLifecycle;

// ─── Request ─────────────────────────────────────────────────────────────────

/// Body of a new-card request. Mirrors the client record; only `oib` and
/// `status` are needed to issue the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRequest {
  pub oib:        Oib,
  pub status:     Status,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub first_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_name:  Option<String>,
}

impl CardRequest {
  /// Names are optional, but when present they follow the client rules.
  pub fn validate(&self) -> Result<(), ValidationError> {
    if let Some(first) = &self.first_name {
      check_first_name(first)?;
    }
    if let Some(last) = &self.last_name {
      check_last_name(last)?;
    }
    Ok(())
  }
}

impl From<&Client> for CardRequest {
  fn from(client: &Client) -> Self {
    Self {
      oib:        client.oib.clone(),
      status:     client.status,
      first_name: Some(client.first_name.clone()),
      last_name:  Some(client.last_name.clone()),
    }
  }
}

// ─── Requester port ──────────────────────────────────────────────────────────

/// Something that can ask the card subsystem to issue a card.
///
/// Implementations report an existing card as [`Error::AlreadyExists`] and
/// every other failure as [`Error::DownstreamUnavailable`].
pub trait CardRequester: Send + Sync + 'static {
  fn submit(
    &self,
    request: CardRequest,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

/// Posts the request as JSON to a card service over HTTP.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpCardRequester {
  client: reqwest::Client,
  url:    String,
}

impl HttpCardRequester {
  pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| Error::DownstreamUnavailable(e.to_string()))?;
    Ok(Self { client, url: url.into() })
  }
}

impl CardRequester for HttpCardRequester {
  async fn submit(&self, request: CardRequest) -> Result<()> {
    let oib = request.oib.to_string();
    let resp = self
      .client
      .post(&self.url)
      .json(&request)
      .send()
      .await
      .map_err(|e| Error::DownstreamUnavailable(format!("POST {}: {e}", self.url)))?;

    match resp.status() {
      s if s.is_success() => Ok(()),
      StatusCode::CONFLICT => Err(Error::AlreadyExists(Entity::CardForOib(oib))),
      s => Err(Error::DownstreamUnavailable(format!("POST {} returned {s}", self.url))),
    }
  }
}

/// Issues the card in-process through a [`CardLifecycle`].
pub struct LocalCardRequester<S> {
  cards: Arc<CardLifecycle<S>>,
}

impl<S> LocalCardRequester<S> {
  pub fn new(cards: Arc<CardLifecycle<S>>) -> Self { Self { cards } }
}

impl<S: CardStore + 'static> CardRequester for LocalCardRequester<S> {
  async fn submit(&self, request: CardRequest) -> Result<()> {
    request.validate()?;
    match self
      .cards
      .create_card_for_client(request.oib, request.status)
      .await
    {
      Ok(_) => Ok(()),
      Err(e @ Error::AlreadyExists(_)) => Err(e),
      Err(e) => Err(Error::DownstreamUnavailable(e.to_string())),
    }
  }
}

// ─── Fire-and-forget dispatch ────────────────────────────────────────────────

/// How a provisioning request ended. Observable for tests and diagnostics;
/// the lookup that triggered it never sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
  /// The card subsystem accepted the request.
  Requested,
  /// A card already exists for the OIB.
  AlreadyExists,
  /// The request failed for any other reason.
  Failed(String),
  /// No answer within the timeout.
  TimedOut,
}

/// Submit `request` on a separate task, bounded by `timeout`. The outcome is
/// logged; nothing is propagated.
pub fn spawn_card_request<R: CardRequester>(
  requester: Arc<R>,
  request: CardRequest,
  timeout: Duration,
) -> JoinHandle<ProvisionOutcome> {
  tokio::spawn(async move {
    let oib = request.oib.clone();
    let outcome =
      match tokio::time::timeout(timeout, requester.submit(request)).await {
        Ok(Ok(())) => ProvisionOutcome::Requested,
        Ok(Err(Error::AlreadyExists(_))) => ProvisionOutcome::AlreadyExists,
        Ok(Err(e)) => ProvisionOutcome::Failed(e.to_string()),
        Err(_) => ProvisionOutcome::TimedOut,
      };

    match &outcome {
      ProvisionOutcome::Requested => info!(%oib, "card requested for client"),
      ProvisionOutcome::AlreadyExists => {
        debug!(%oib, "card already exists for client")
      }
      ProvisionOutcome::Failed(reason) => {
        warn!(%oib, %reason, "card request failed")
      }
      ProvisionOutcome::TimedOut => {
        warn!(%oib, timeout_ms = timeout.as_millis() as u64, "card request timed out")
      }
    }
    outcome
  })
}
