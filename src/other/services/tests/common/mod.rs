#![allow(dead_code)] // Each test crate uses its own subset

use std::time::Duration;

use repositories::{memory::MemoryStore, DocRef};
use serde_json::Value;
use tokio::{sync::watch, time::timeout};

pub const WAIT: Duration = Duration::from_secs(2);
pub const QUIET: Duration = Duration::from_millis(100);

pub fn put(store: &MemoryStore, collection: &str, id: &str, fields: Value) {
  store.insert(&DocRef::new(collection, id), fields);
}

/// Waits until the watched value satisfies `done` and returns a copy of it.
pub async fn settled<T: Clone>(view: &mut watch::Receiver<T>, done: impl FnMut(&T) -> bool) -> T {
  timeout(WAIT, view.wait_for(done))
    .await
    .unwrap_or_else(|_| panic!("the view never settled"))
    .map(|value| T::clone(&value))
    .unwrap_or_else(|e| panic!("the view was closed: {e}"))
}
