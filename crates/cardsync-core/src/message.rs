//! The status-change message carried over the `card-status` channel.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, oib::Oib, status::Status};

/// A request to move both the client and the card with `oib` to `status`.
///
/// Transient: it is never persisted. Encoded as JSON with the field names
/// `oib` and `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeMessage {
  pub oib:    Oib,
  pub status: Status,
}

impl StatusChangeMessage {
  pub fn new(oib: Oib, status: Status) -> Self { Self { oib, status } }

  pub fn encode(&self) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(self)?)
  }

  /// Decode a payload. Any failure, including an invalid OIB or an unknown
  /// status, is an [`Error::MessageDecode`].
  pub fn decode(payload: &[u8]) -> Result<Self> {
    serde_json::from_slice(payload).map_err(|e| Error::MessageDecode(e.to_string()))
  }
}
