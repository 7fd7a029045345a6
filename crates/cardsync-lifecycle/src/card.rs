//! [`CardLifecycle`]: creation, lookup, update, deletion and status changes
//! for cards.

use std::sync::Arc;

use cardsync_core::{
  Card, CardNumber, CardNumberGenerator, DigitSource, Entity, Error, Oib,
  OsDigits, Result, Status,
  store::{CardStore, StoreError},
};
use tracing::{info, warn};

use crate::{store_error, write_error};

pub struct CardLifecycle<S> {
  store:     Arc<S>,
  generator: CardNumberGenerator<Box<dyn DigitSource>>,
}

impl<S: CardStore> CardLifecycle<S> {
  /// Card numbers are drawn from the OS random source.
  pub fn new(store: Arc<S>) -> Self { Self::with_digits(store, OsDigits) }

  pub fn with_digits(store: Arc<S>, digits: impl DigitSource + 'static) -> Self {
    Self {
      store,
      generator: CardNumberGenerator::new(Box::new(digits)),
    }
  }

  /// Persist a new card.
  ///
  /// Fails with `AlreadyExists` if the card number, or a card for the same
  /// OIB, is already stored.
  pub async fn create_card(&self, card: Card) -> Result<Card> {
    info!(card_number = %card.card_number, oib = %card.oib, "creating card");

    if self
      .store
      .find_card_by_number(&card.card_number)
      .await
      .map_err(store_error)?
      .is_some()
    {
      warn!(card_number = %card.card_number, "card number already exists");
      return Err(Error::AlreadyExists(Entity::Card(card.card_number.into())));
    }

    let number = card.card_number.clone();
    let oib = card.oib.clone();
    match self.store.insert_card(card).await {
      Ok(card) => Ok(card),
      Err(e) if e.is_conflict() => {
        // Lost a race on the number, or the OIB already holds a card.
        let entity = match self.store.find_card_by_number(&number).await {
          Ok(Some(_)) => Entity::Card(number.into()),
          _ => Entity::CardForOib(oib.into()),
        };
        warn!(%entity, "card create conflict");
        Err(Error::AlreadyExists(entity))
      }
      Err(e) => Err(store_error(e)),
    }
  }

  /// Issue a card for `oib` under a freshly generated number.
  ///
  /// A number collision is reported as `AlreadyExists`, never retried.
  pub async fn create_card_for_client(
    &self,
    oib: Oib,
    status: Status,
  ) -> Result<Card> {
    let card_number = self.generator.generate();
    self.create_card(Card { card_number, oib, status }).await
  }

  pub async fn get_by_card_number(&self, card_number: &CardNumber) -> Result<Card> {
    self
      .store
      .find_card_by_number(card_number)
      .await
      .map_err(store_error)?
      .ok_or_else(|| {
        warn!(%card_number, "card not found");
        Error::NotFound(Entity::Card(card_number.to_string()))
      })
  }

  pub async fn get_by_oib(&self, oib: &Oib) -> Result<Card> {
    self
      .store
      .find_card_by_oib(oib)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::NotFound(Entity::CardForOib(oib.to_string())))
  }

  pub async fn get_all(&self) -> Result<Vec<Card>> {
    self.store.all_cards().await.map_err(store_error)
  }

  /// Overwrite an existing card, matched by card number.
  pub async fn update_card(&self, card: Card) -> Result<Card> {
    let number = card.card_number.clone();
    let oib = card.oib.clone();
    let updated = self
      .store
      .update_card(card)
      .await
      .map_err(|e| write_error(e, || Entity::CardForOib(oib.to_string())))?
      .ok_or_else(|| {
        warn!(card_number = %number, "card not found for update");
        Error::NotFound(Entity::Card(number.to_string()))
      })?;

    info!(card_number = %updated.card_number, status = %updated.status, "card updated");
    Ok(updated)
  }

  /// Remove a card and return what it looked like before removal.
  pub async fn delete_card(&self, card_number: &CardNumber) -> Result<Card> {
    let snapshot = self.get_by_card_number(card_number).await?;

    if !self.store.delete_card(card_number).await.map_err(store_error)? {
      return Err(Error::NotFound(Entity::Card(card_number.to_string())));
    }

    info!(%card_number, "card deleted");
    Ok(snapshot)
  }

  /// Set the status of the card held by `oib`, leaving its number and
  /// holder untouched. Applying the same status twice leaves the card
  /// unchanged.
  pub async fn apply_status_change(&self, oib: &Oib, status: Status) -> Result<Card> {
    info!(%oib, %status, "changing card status");

    let card = self
      .store
      .set_card_status(oib, status)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::NotFound(Entity::CardForOib(oib.to_string())))?;

    info!(%oib, %status, card_number = %card.card_number, "card status changed");
    Ok(card)
  }
}
