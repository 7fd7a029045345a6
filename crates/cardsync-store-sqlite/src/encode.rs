//! Conversions between domain records and the plain-text columns stored in
//! SQLite.
//!
//! Every key and status is stored as text. Reading a row re-validates it, so
//! a hand-edited database cannot smuggle a malformed OIB into the domain.

use cardsync_core::{Card, CardNumber, Client, Oib, Status};

use crate::Result;

/// Raw strings read directly from a `clients` row.
pub struct RawClient {
  pub oib:        String,
  pub first_name: String,
  pub last_name:  String,
  pub status:     String,
}

impl RawClient {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      oib:        row.get(0)?,
      first_name: row.get(1)?,
      last_name:  row.get(2)?,
      status:     row.get(3)?,
    })
  }

  pub fn into_client(self) -> Result<Client> {
    Ok(Client {
      oib:        Oib::parse(self.oib)?,
      first_name: self.first_name,
      last_name:  self.last_name,
      status:     Status::parse(&self.status)?,
    })
  }
}

/// Raw strings read directly from a `cards` row.
pub struct RawCard {
  pub card_number: String,
  pub oib:         String,
  pub status:      String,
}

impl RawCard {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      card_number: row.get(0)?,
      oib:         row.get(1)?,
      status:      row.get(2)?,
    })
  }

  pub fn into_card(self) -> Result<Card> {
    Ok(Card {
      card_number: CardNumber::parse(self.card_number)?,
      oib:         Oib::parse(self.oib)?,
      status:      Status::parse(&self.status)?,
    })
  }
}
