//! Card: a payment card held by at most one client.
//!
//! A card refers to its holder only by OIB. The holder need not exist as a
//! client record; the link is value equality, never a foreign key.

use serde::{Deserialize, Serialize};

use crate::{card_number::CardNumber, oib::Oib, status::Status};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
  pub card_number: CardNumber,
  pub oib:         Oib,
  pub status:      Status,
}
