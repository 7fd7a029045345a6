//! Error types for `cardsync-core`.

use std::fmt;

use thiserror::Error;

/// Identifies the record a `NotFound` or `AlreadyExists` refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
  /// A client, keyed by OIB.
  Client(String),
  /// A card, keyed by card number.
  Card(String),
  /// The card held by the client with this OIB.
  CardForOib(String),
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Client(oib) => write!(f, "client with OIB {oib}"),
      Self::Card(number) => write!(f, "card with number {number}"),
      Self::CardForOib(oib) => write!(f, "card for OIB {oib}"),
    }
  }
}

/// A malformed input, rejected before any store access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("invalid OIB: {0:?}")]
  InvalidOib(String),

  #[error(
    "invalid card number {0:?}: must be 16 digits and must not start with 0"
  )]
  InvalidCardNumber(String),

  #[error(
    "unknown status {0:?}: expected one of INACTIVE, ACTIVE, PENDING, \
     APPROVED, REJECTED, BLOCKED"
  )]
  UnknownStatus(String),

  #[error("invalid {field}: {reason}")]
  InvalidName {
    field:  &'static str,
    reason: String,
  },
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("{0} already exists")]
  AlreadyExists(Entity),

  #[error("{0} not found")]
  NotFound(Entity),

  #[error("malformed status message: {0}")]
  MessageDecode(String),

  #[error("downstream unavailable: {0}")]
  DownstreamUnavailable(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
