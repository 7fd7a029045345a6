//! [`SqliteStore`]: the SQLite implementation of [`ClientStore`] and
//! [`CardStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use cardsync_core::{
  Card, CardNumber, Client, Oib, Status,
  store::{CardStore, ClientStore},
};

use crate::{
  Error, Result,
  encode::{RawCard, RawClient},
  schema::SCHEMA,
};

const CLIENT_COLUMNS: &str = "oib, first_name, last_name, status";
const CARD_COLUMNS: &str = "card_number, oib, status";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A cardsync store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row `SELECT` over the `cards` table.
  async fn find_card_where(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<Card>> {
    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CARD_COLUMNS} FROM cards WHERE {column} = ?1"),
              rusqlite::params![value],
              RawCard::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCard::into_card).transpose()
  }
}

// ─── ClientStore impl ────────────────────────────────────────────────────────

impl ClientStore for SqliteStore {
  type Error = Error;

  async fn find_client(&self, oib: &Oib) -> Result<Option<Client>> {
    let oib_str = oib.to_string();

    let raw: Option<RawClient> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE oib = ?1"),
              rusqlite::params![oib_str],
              RawClient::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawClient::into_client).transpose()
  }

  async fn all_clients(&self) -> Result<Vec<Client>> {
    let raws: Vec<RawClient> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY oib"
        ))?;
        let rows = stmt
          .query_map([], RawClient::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawClient::into_client).collect()
  }

  async fn insert_client(&self, client: Client) -> Result<Client> {
    let oib_str    = client.oib.to_string();
    let first      = client.first_name.clone();
    let last       = client.last_name.clone();
    let status_str = client.status.as_str();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO clients (oib, first_name, last_name, status)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![oib_str, first, last, status_str],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from_write)?;

    Ok(client)
  }

  async fn update_client(&self, client: Client) -> Result<Option<Client>> {
    let oib_str    = client.oib.to_string();
    let first      = client.first_name.clone();
    let last       = client.last_name.clone();
    let status_str = client.status.as_str();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE clients SET first_name = ?2, last_name = ?3, status = ?4
           WHERE oib = ?1",
          rusqlite::params![oib_str, first, last, status_str],
        )?)
      })
      .await
      .map_err(Error::from_write)?;

    Ok((changed > 0).then_some(client))
  }

  async fn set_client_status(
    &self,
    oib: &Oib,
    status: Status,
  ) -> Result<Option<Client>> {
    let oib_str    = oib.to_string();
    let status_str = status.as_str();

    let raw: Option<RawClient> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE clients SET status = ?2 WHERE oib = ?1
                 RETURNING {CLIENT_COLUMNS}"
              ),
              rusqlite::params![oib_str, status_str],
              RawClient::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawClient::into_client).transpose()
  }

  async fn delete_client(&self, oib: &Oib) -> Result<bool> {
    let oib_str = oib.to_string();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM clients WHERE oib = ?1",
          rusqlite::params![oib_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }
}

// ─── CardStore impl ──────────────────────────────────────────────────────────

impl CardStore for SqliteStore {
  type Error = Error;

  async fn find_card_by_number(
    &self,
    card_number: &CardNumber,
  ) -> Result<Option<Card>> {
    self.find_card_where("card_number", card_number.to_string()).await
  }

  async fn find_card_by_oib(&self, oib: &Oib) -> Result<Option<Card>> {
    self.find_card_where("oib", oib.to_string()).await
  }

  async fn all_cards(&self) -> Result<Vec<Card>> {
    let raws: Vec<RawCard> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CARD_COLUMNS} FROM cards ORDER BY card_id"
        ))?;
        let rows = stmt
          .query_map([], RawCard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCard::into_card).collect()
  }

  async fn insert_card(&self, card: Card) -> Result<Card> {
    let number_str = card.card_number.to_string();
    let oib_str    = card.oib.to_string();
    let status_str = card.status.as_str();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cards (card_number, oib, status) VALUES (?1, ?2, ?3)",
          rusqlite::params![number_str, oib_str, status_str],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from_write)?;

    Ok(card)
  }

  async fn update_card(&self, card: Card) -> Result<Option<Card>> {
    let number_str = card.card_number.to_string();
    let oib_str    = card.oib.to_string();
    let status_str = card.status.as_str();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE cards SET oib = ?2, status = ?3 WHERE card_number = ?1",
          rusqlite::params![number_str, oib_str, status_str],
        )?)
      })
      .await
      .map_err(Error::from_write)?;

    Ok((changed > 0).then_some(card))
  }

  async fn set_card_status(
    &self,
    oib: &Oib,
    status: Status,
  ) -> Result<Option<Card>> {
    let oib_str    = oib.to_string();
    let status_str = status.as_str();

    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE cards SET status = ?2 WHERE oib = ?1
                 RETURNING {CARD_COLUMNS}"
              ),
              rusqlite::params![oib_str, status_str],
              RawCard::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCard::into_card).transpose()
  }

  async fn delete_card(&self, card_number: &CardNumber) -> Result<bool> {
    let number_str = card_number.to_string();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM cards WHERE card_number = ?1",
          rusqlite::params![number_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }
}
