use std::sync::Arc;

use futures::future::select_all;
use tracing::{event, Level};
use types::normalize;
use utils::{constants::MAX_IDS_PER_QUERY, Id};

use crate::{Document, DocumentStore, Filter, Snapshot, StoreError, Subscription};

#[derive(Debug)]
struct Chunk {
  ids: Vec<Id>,
  feed: Subscription,
  latest: Option<Vec<Document>>,
}
impl Chunk {
  fn open<S: DocumentStore>(store: &S, collection: &str, ids: Vec<Id>) -> Result<Self, StoreError> {
    let feed = store.subscribe(collection, Filter::IdIn(ids.clone()))?;
    Ok(Self {
      ids,
      feed,
      latest: None,
    })
  }
}

/// Live subscription to an id set of any size, split into store-sized
/// chunks whose snapshots are merged.
///
/// A merged snapshot is only produced once every chunk has delivered its
/// first one. The store refuses a whole chunk when any of its documents is
/// unreadable, so a refused chunk is replaced by one subscription per id;
/// only the ids still refused then count as empty.
#[derive(Debug)]
pub struct IdSetSubscription {
  collection: Arc<str>,
  chunks: Vec<Chunk>,
}
impl IdSetSubscription {
  /// # Errors
  /// Fails when `ids` is empty or when the store rejects any chunk; chunks
  /// already opened are dropped again.
  pub fn open<S: DocumentStore>(
    store: &S,
    collection: &str,
    ids: &[Id],
  ) -> Result<Self, StoreError> {
    let ids = normalize::unique(ids.iter().cloned());
    if ids.is_empty() {
      return Err(StoreError::InvalidArgument(
        "cannot watch an empty id set".to_string(),
      ));
    }

    let chunks = ids
      .chunks(MAX_IDS_PER_QUERY)
      .map(|chunk| Chunk::open(store, collection, chunk.to_vec()))
      .collect::<Result<Vec<_>, _>>()?;
    event!(
      Level::DEBUG,
      "Watching {} ids of {collection} in {} chunk(s).",
      ids.len(),
      chunks.len()
    );

    Ok(Self {
      collection: Arc::from(collection),
      chunks,
    })
  }

  /// Waits for the next merged snapshot. Transient failures of a chunk are
  /// passed through. `None` once any chunk is closed by the store.
  ///
  /// `store` must be the store the subscription was opened on.
  pub async fn next<S: DocumentStore>(&mut self, store: &S) -> Option<Snapshot> {
    loop {
      let (index, snapshot) = {
        let pending = self
          .chunks
          .iter_mut()
          .enumerate()
          .map(|(index, chunk)| Box::pin(async move { (index, chunk.feed.next().await) }));
        let (ready, _, _) = select_all(pending).await;
        ready
      };

      match snapshot? {
        Ok(documents) => self.chunks[index].latest = Some(documents),
        Err(e) if e.is_absence() && self.chunks[index].ids.len() > 1 => {
          event!(
            Level::DEBUG,
            "Chunk {index} of {} was refused ({e}), watching its ids one by one.",
            self.collection
          );
          let singles = self.chunks[index]
            .ids
            .iter()
            .map(|id| Chunk::open(store, &self.collection, vec![id.clone()]))
            .collect::<Result<Vec<_>, _>>();
          match singles {
            Ok(singles) => drop(self.chunks.splice(index..=index, singles)),
            Err(e) => return Some(Err(e)),
          }
        }
        Err(e) if e.is_absence() => {
          event!(
            Level::DEBUG,
            "{}/{:?} is not readable ({e}), treating it as missing.",
            self.collection,
            self.chunks[index].ids
          );
          self.chunks[index].latest = Some(Vec::new());
        }
        Err(e) => return Some(Err(e)),
      }

      if self.chunks.iter().all(|chunk| chunk.latest.is_some()) {
        return Some(Ok(
          self
            .chunks
            .iter()
            .filter_map(|chunk| chunk.latest.as_ref())
            .flatten()
            .cloned()
            .collect(),
        ));
      }
    }
  }
}
