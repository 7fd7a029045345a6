//! [`StatusSubscriber`]: the consuming half of status synchronization.
//!
//! Each delivery is decoded and applied to the client, then to the card,
//! with the same OIB. The two writes are independent and not transactional:
//! a missing client does not stop the card update and vice versa, and a
//! half-applied change is a legitimate end state left for external
//! reconciliation. Undecodable deliveries are logged and dropped; nothing is
//! retried or dead-lettered.

use std::sync::Arc;

use cardsync_core::{
  Error, Oib, Result, Status, StatusChangeMessage,
  store::{CardStore, ClientStore},
};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
  CardLifecycle, ClientLifecycle, channel::Partition, provision::CardRequester,
};

/// The result of applying one half of a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
  Applied,
  /// No record with that OIB; this half was abandoned.
  NotFound,
  /// Any other failure; this half was abandoned.
  Failed(String),
}

impl ApplyOutcome {
  fn from_result<T>(result: Result<T>) -> Self {
    match result {
      Ok(_) => Self::Applied,
      Err(Error::NotFound(_)) => Self::NotFound,
      Err(e) => Self::Failed(e.to_string()),
    }
  }
}

/// The result of handling one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
  /// The payload could not be decoded and was dropped.
  Dropped(String),
  Handled {
    oib:    Oib,
    status: Status,
    client: ApplyOutcome,
    card:   ApplyOutcome,
  },
}

pub struct StatusSubscriber<C, K, R> {
  clients: Arc<ClientLifecycle<C, R>>,
  cards:   Arc<CardLifecycle<K>>,
}

impl<C, K, R> StatusSubscriber<C, K, R>
where
  C: ClientStore + 'static,
  K: CardStore + 'static,
  R: CardRequester,
{
  pub fn new(
    clients: Arc<ClientLifecycle<C, R>>,
    cards: Arc<CardLifecycle<K>>,
  ) -> Self {
    Self { clients, cards }
  }

  /// Decode one payload and apply it to the client and then the card.
  pub async fn handle(&self, payload: &[u8]) -> SyncOutcome {
    let message = match StatusChangeMessage::decode(payload) {
      Ok(m) => m,
      Err(e) => {
        error!(
          error = %e,
          payload = %String::from_utf8_lossy(payload),
          "dropping undecodable status message"
        );
        return SyncOutcome::Dropped(e.to_string());
      }
    };

    let StatusChangeMessage { oib, status } = message;
    info!(%oib, %status, "applying status change");

    let client = ApplyOutcome::from_result(
      self.clients.apply_status_change(&oib, status).await,
    );
    log_half("client", &oib, &client);

    let card = ApplyOutcome::from_result(
      self.cards.apply_status_change(&oib, status).await,
    );
    log_half("card", &oib, &card);

    SyncOutcome::Handled { oib, status, client, card }
  }

  /// Start one worker task per partition. Each worker handles its
  /// partition's deliveries one at a time, in order, until the channel
  /// closes.
  pub fn spawn(self: Arc<Self>, partitions: Vec<Partition>) -> Vec<JoinHandle<()>> {
    partitions
      .into_iter()
      .map(|partition| tokio::spawn(Arc::clone(&self).run(partition)))
      .collect()
  }

  async fn run(self: Arc<Self>, mut partition: Partition) {
    let topic = partition.topic().to_owned();
    let index = partition.index();
    info!(%topic, partition = index, "status subscriber started");

    while let Some(delivery) = partition.recv().await {
      self.handle(&delivery.payload).await;
    }

    info!(%topic, partition = index, "status subscriber stopped");
  }
}

fn log_half(record: &'static str, oib: &Oib, outcome: &ApplyOutcome) {
  match outcome {
    ApplyOutcome::Applied => {}
    ApplyOutcome::NotFound => {
      warn!(%oib, record, "status change skipped: record not found")
    }
    ApplyOutcome::Failed(reason) => {
      error!(%oib, record, %reason, "status change failed")
    }
  }
}
