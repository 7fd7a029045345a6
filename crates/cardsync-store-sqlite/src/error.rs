//! Error type for `cardsync-store-sqlite`.

use cardsync_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A UNIQUE or PRIMARY KEY constraint rejected the write.
  #[error("uniqueness conflict: {0}")]
  Conflict(String),

  /// A stored value no longer parses as its domain type.
  #[error("corrupt row: {0}")]
  Decode(#[from] cardsync_core::ValidationError),
}

impl Error {
  /// Classify a failed write, separating constraint violations from other
  /// database failures.
  pub(crate) fn from_write(e: tokio_rusqlite::Error) -> Self {
    match &e {
      tokio_rusqlite::Error::Rusqlite(inner)
        if inner.sqlite_error_code()
          == Some(rusqlite::ErrorCode::ConstraintViolation) =>
      {
        Self::Conflict(inner.to_string())
      }
      _ => Self::Database(e),
    }
  }
}

impl StoreError for Error {
  fn is_conflict(&self) -> bool { matches!(self, Self::Conflict(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
