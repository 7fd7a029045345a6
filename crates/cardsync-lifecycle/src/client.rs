//! [`ClientLifecycle`]: creation, lookup, update, deletion and status
//! changes for clients.

use std::{sync::Arc, time::Duration};

use cardsync_core::{
  Client, Entity, Error, Oib, Result, Status,
  store::ClientStore,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
  provision::{CardRequest, CardRequester, ProvisionOutcome, spawn_card_request},
  store_error, write_error,
};

/// Default upper bound on the card request issued during lookup.
pub const DEFAULT_CARD_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

pub struct ClientLifecycle<S, R> {
  store:                Arc<S>,
  requester:            Arc<R>,
  card_request_timeout: Duration,
}

impl<S: ClientStore, R: CardRequester> ClientLifecycle<S, R> {
  pub fn new(store: Arc<S>, requester: Arc<R>) -> Self {
    Self {
      store,
      requester,
      card_request_timeout: DEFAULT_CARD_REQUEST_TIMEOUT,
    }
  }

  pub fn with_card_request_timeout(mut self, timeout: Duration) -> Self {
    self.card_request_timeout = timeout;
    self
  }

  /// Persist a new client. Fails with `AlreadyExists` if the OIB is taken.
  pub async fn create_client(&self, client: Client) -> Result<Client> {
    client.validate()?;
    info!(oib = %client.oib, "creating client");

    if self
      .store
      .find_client(&client.oib)
      .await
      .map_err(store_error)?
      .is_some()
    {
      warn!(oib = %client.oib, "client already exists");
      return Err(Error::AlreadyExists(Entity::Client(client.oib.into())));
    }

    let oib = client.oib.clone();
    self
      .store
      .insert_client(client)
      .await
      .map_err(|e| write_error(e, || Entity::Client(oib.into())))
  }

  /// Plain lookup, without side effects.
  pub async fn get_by_oib(&self, oib: &Oib) -> Result<Client> {
    self
      .store
      .find_client(oib)
      .await
      .map_err(store_error)?
      .ok_or_else(|| {
        warn!(%oib, "client not found");
        Error::NotFound(Entity::Client(oib.to_string()))
      })
  }

  /// Look up a client and, on success, ask the card subsystem to issue a
  /// card for it.
  ///
  /// The card request runs on its own task and does not delay the returned
  /// client; the handle resolves to its outcome. Its failure, including an
  /// existing card, is logged and swallowed.
  pub async fn get_by_oib_requesting_card(
    &self,
    oib: &Oib,
  ) -> Result<(Client, JoinHandle<ProvisionOutcome>)> {
    let client = self.get_by_oib(oib).await?;
    let handle = spawn_card_request(
      Arc::clone(&self.requester),
      CardRequest::from(&client),
      self.card_request_timeout,
    );
    Ok((client, handle))
  }

  pub async fn get_all(&self) -> Result<Vec<Client>> {
    self.store.all_clients().await.map_err(store_error)
  }

  /// Overwrite names and status of an existing client, matched by OIB.
  pub async fn update_client(&self, client: Client) -> Result<Client> {
    client.validate()?;
    let oib = client.oib.clone();

    let updated = self
      .store
      .update_client(client)
      .await
      .map_err(store_error)?
      .ok_or_else(|| {
        warn!(%oib, "client not found for update");
        Error::NotFound(Entity::Client(oib.to_string()))
      })?;

    info!(%oib, status = %updated.status, "client updated");
    Ok(updated)
  }

  /// Remove a client and return what it looked like before removal.
  pub async fn delete_client(&self, oib: &Oib) -> Result<Client> {
    let snapshot = self.get_by_oib(oib).await?;

    if !self.store.delete_client(oib).await.map_err(store_error)? {
      return Err(Error::NotFound(Entity::Client(oib.to_string())));
    }

    info!(%oib, "client deleted");
    Ok(snapshot)
  }

  /// Set the status of the client with `oib`, leaving its names untouched.
  /// Applying the same status twice leaves the client unchanged.
  pub async fn apply_status_change(&self, oib: &Oib, status: Status) -> Result<Client> {
    info!(%oib, %status, "changing client status");

    let client = self
      .store
      .set_client_status(oib, status)
      .await
      .map_err(store_error)?
      .ok_or_else(|| {
        warn!(%oib, "client not found for status change");
        Error::NotFound(Entity::Client(oib.to_string()))
      })?;

    info!(%oib, %status, "client status changed");
    Ok(client)
  }
}
