//! Lifecycle managers and the status-synchronization protocol.
//!
//! [`CardLifecycle`] and [`ClientLifecycle`] own all reads and writes of
//! their aggregate. A [`StatusPublisher`] hands status-change messages to a
//! keyed [`StatusChannel`]; a [`StatusSubscriber`] consumes them and applies
//! the change to the client first and the card second. The two writes are
//! independent: either may find nothing to update while the other succeeds.

pub mod card;
pub mod channel;
pub mod client;
pub mod provision;
pub mod publisher;
pub mod subscriber;

pub use card::CardLifecycle;
pub use channel::{Delivery, Partition, PartitionedChannel, StatusChannel};
pub use client::ClientLifecycle;
pub use provision::{
  CardRequest, CardRequester, HttpCardRequester, LocalCardRequester,
  ProvisionOutcome,
};
pub use publisher::StatusPublisher;
pub use subscriber::{ApplyOutcome, StatusSubscriber, SyncOutcome};

use cardsync_core::{Entity, Error, store::StoreError};

/// Wrap an unexpected backend failure.
fn store_error<E: StoreError>(e: E) -> Error { Error::Store(Box::new(e)) }

/// Map a failed write, turning uniqueness conflicts into `AlreadyExists`.
fn write_error<E: StoreError>(e: E, entity: impl FnOnce() -> Entity) -> Error {
  if e.is_conflict() {
    Error::AlreadyExists(entity())
  } else {
    store_error(e)
  }
}
