//! [`StatusPublisher`]: the producing half of status synchronization.

use std::sync::Arc;

use cardsync_core::StatusChangeMessage;
use tracing::{debug, error};

use crate::channel::StatusChannel;

/// Hands status-change messages to a [`StatusChannel`], keyed by OIB.
///
/// Publishing is fire-and-forget: it returns as soon as the message is
/// enqueued, before it is delivered or applied, and reports nothing back. A
/// message that cannot be enqueued is logged and lost.
#[derive(Clone)]
pub struct StatusPublisher {
  channel: Arc<dyn StatusChannel>,
}

impl StatusPublisher {
  pub fn new(channel: Arc<dyn StatusChannel>) -> Self { Self { channel } }

  pub fn publish(&self, message: &StatusChangeMessage) {
    let topic = self.channel.topic();
    let payload = match message.encode() {
      Ok(p) => p,
      Err(e) => {
        error!(topic, oib = %message.oib, error = %e, "failed to encode status message");
        return;
      }
    };

    match self.channel.send(message.oib.as_str(), payload) {
      Ok(()) => {
        debug!(topic, oib = %message.oib, status = %message.status, "status message published")
      }
      Err(e) => {
        error!(topic, oib = %message.oib, error = %e, "failed to publish status message")
      }
    }
  }
}
