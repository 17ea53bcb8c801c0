use tokio::sync::mpsc;

use crate::{Document, StoreError};

pub type Snapshot = Result<Vec<Document>, StoreError>;

/// Store side of a live subscription.
#[derive(Debug, Clone)]
pub struct SnapshotSender(mpsc::UnboundedSender<Snapshot>);
impl SnapshotSender {
  /// Returns false once the subscriber is gone.
  pub fn deliver(&self, snapshot: Snapshot) -> bool {
    self.0.send(snapshot).is_ok()
  }

  #[must_use]
  pub fn is_closed(&self) -> bool {
    self.0.is_closed()
  }
}

/// Subscriber side of a live subscription. Dropping it unsubscribes; nothing
/// queued for it is delivered afterwards.
#[derive(Debug)]
pub struct Subscription(mpsc::UnboundedReceiver<Snapshot>);
impl Subscription {
  #[must_use]
  pub fn channel() -> (SnapshotSender, Self) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SnapshotSender(tx), Self(rx))
  }

  /// Waits for the next snapshot. `None` means the store ended the
  /// subscription. Cancel safe.
  pub async fn next(&mut self) -> Option<Snapshot> {
    self.0.recv().await
  }
}
