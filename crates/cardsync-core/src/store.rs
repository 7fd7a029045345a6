//! The `ClientStore` and `CardStore` traits.
//!
//! The traits are implemented by storage backends (e.g.
//! `cardsync-store-sqlite`). The lifecycle layer depends on this abstraction,
//! not on any concrete backend.
//!
//! Each write is atomic for a single record. Stores enforce uniqueness on
//! their keys (OIB for clients; card number and OIB for cards) and report a
//! violation as an error for which [`StoreError::is_conflict`] is `true`.
//! Callers rely on that instead of taking their own locks.

use std::future::Future;

use crate::{
  card::Card, card_number::CardNumber, client::Client, oib::Oib,
  status::Status,
};

/// Error bound shared by store backends.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` if the operation failed on a uniqueness constraint.
  fn is_conflict(&self) -> bool;
}

// ─── Clients ─────────────────────────────────────────────────────────────────

pub trait ClientStore: Send + Sync {
  type Error: StoreError;

  /// Retrieve a client by OIB. Returns `None` if not found.
  fn find_client<'a>(
    &'a self,
    oib: &'a Oib,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + 'a;

  /// List every client.
  fn all_clients(
    &self,
  ) -> impl Future<Output = Result<Vec<Client>, Self::Error>> + Send + '_;

  /// Persist a new client. Fails with a conflict if the OIB is taken.
  fn insert_client(
    &self,
    client: Client,
  ) -> impl Future<Output = Result<Client, Self::Error>> + Send + '_;

  /// Overwrite the client with the same OIB. Returns `None` if there is none.
  fn update_client(
    &self,
    client: Client,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  /// Overwrite only the status of the client with `oib`, leaving its other
  /// fields as they are at the moment of the write. Returns the updated
  /// client, or `None` if there is none.
  fn set_client_status<'a>(
    &'a self,
    oib: &'a Oib,
    status: Status,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + 'a;

  /// Remove a client. Returns `false` if there was nothing to remove.
  fn delete_client<'a>(
    &'a self,
    oib: &'a Oib,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

// ─── Cards ───────────────────────────────────────────────────────────────────

pub trait CardStore: Send + Sync {
  type Error: StoreError;

  /// Retrieve a card by number. Returns `None` if not found.
  fn find_card_by_number<'a>(
    &'a self,
    card_number: &'a CardNumber,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + 'a;

  /// Retrieve the card held by `oib`. Returns `None` if not found.
  fn find_card_by_oib<'a>(
    &'a self,
    oib: &'a Oib,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + 'a;

  /// List every card.
  fn all_cards(
    &self,
  ) -> impl Future<Output = Result<Vec<Card>, Self::Error>> + Send + '_;

  /// Persist a new card. Fails with a conflict if the card number or the OIB
  /// is taken.
  fn insert_card(
    &self,
    card: Card,
  ) -> impl Future<Output = Result<Card, Self::Error>> + Send + '_;

  /// Overwrite the card with the same number. Returns `None` if there is
  /// none. Fails with a conflict if the new OIB belongs to another card.
  fn update_card(
    &self,
    card: Card,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + '_;

  /// Overwrite only the status of the card held by `oib`. Returns the
  /// updated card, or `None` if there is none.
  fn set_card_status<'a>(
    &'a self,
    oib: &'a Oib,
    status: Status,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + 'a;

  /// Remove a card. Returns `false` if there was nothing to remove.
  fn delete_card<'a>(
    &'a self,
    card_number: &'a CardNumber,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
