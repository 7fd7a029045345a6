//! The keyed publish/subscribe channel that carries status-change messages.
//!
//! [`StatusChannel`] is the outbound half a publisher needs. The in-process
//! [`PartitionedChannel`] splits the topic into partitions and routes each
//! delivery by a hash of its key, so deliveries sharing a key (an OIB) are
//! consumed in the order they were sent. Deliveries with different keys may
//! be consumed concurrently and in any order.

use std::hash::{DefaultHasher, Hash, Hasher};

use cardsync_core::{Error, Result};
use tokio::sync::mpsc;

/// Default topic for status-change messages.
pub const STATUS_TOPIC: &str = "card-status";

/// A message in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
  /// Ordering key; deliveries with equal keys are consumed in send order.
  pub key:     String,
  pub payload: Vec<u8>,
}

/// Outbound side of a keyed channel. Sending never waits for the consumer.
pub trait StatusChannel: Send + Sync {
  fn topic(&self) -> &str;

  /// Enqueue `payload` under `key`. Fails only if the channel is gone.
  fn send(&self, key: &str, payload: Vec<u8>) -> Result<()>;
}

// ─── In-process implementation ───────────────────────────────────────────────

/// An in-process channel with a fixed number of partitions.
///
/// Cloning is cheap: it clones the partition senders.
#[derive(Clone)]
pub struct PartitionedChannel {
  topic:   String,
  senders: Vec<mpsc::UnboundedSender<Delivery>>,
}

/// The receiving end of one partition.
pub struct Partition {
  topic: String,
  index: usize,
  rx:    mpsc::UnboundedReceiver<Delivery>,
}

impl PartitionedChannel {
  /// Create a channel with `partitions` partitions (at least one) and return
  /// it together with one receiver per partition.
  pub fn new(
    topic: impl Into<String>,
    partitions: usize,
  ) -> (Self, Vec<Partition>) {
    let topic = topic.into();
    let (senders, receivers): (Vec<_>, Vec<_>) = (0..partitions.max(1))
      .map(|index| {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Partition { topic: topic.clone(), index, rx })
      })
      .unzip();

    (Self { topic, senders }, receivers)
  }

  pub fn partition_count(&self) -> usize { self.senders.len() }

  /// The partition every delivery keyed by `key` lands on.
  pub fn partition_for(&self, key: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % self.senders.len() as u64) as usize
  }
}

impl StatusChannel for PartitionedChannel {
  fn topic(&self) -> &str { &self.topic }

  fn send(&self, key: &str, payload: Vec<u8>) -> Result<()> {
    let index = self.partition_for(key);
    self.senders[index]
      .send(Delivery { key: key.to_owned(), payload })
      .map_err(|_| {
        Error::DownstreamUnavailable(format!(
          "partition {index} of topic {:?} is closed",
          self.topic
        ))
      })
  }
}

impl Partition {
  pub fn topic(&self) -> &str { &self.topic }

  pub fn index(&self) -> usize { self.index }

  /// Wait for the next delivery. Returns `None` once every sender is gone.
  pub async fn recv(&mut self) -> Option<Delivery> { self.rx.recv().await }
}
