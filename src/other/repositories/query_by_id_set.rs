use futures::future::join_all;
use tracing::{event, Level};
use types::normalize;
use utils::{constants::MAX_IDS_PER_QUERY, Id};

use crate::{DocRef, Document, DocumentStore, Filter, StoreError};

/// Outcome of an id-set query split into store-sized chunks.
#[derive(Debug, Default)]
pub struct ChunkedQuery {
  /// Every readable document found, each at most once. Ids with no document
  /// are silently missing.
  pub documents: Vec<Document>,
  /// Ids the store would not let us read.
  pub refused: Vec<Id>,
  /// Transient failures, one per chunk or point read that hit one.
  pub failures: Vec<StoreError>,
}
impl ChunkedQuery {
  fn absorb(mut self, other: Self) -> Self {
    self.documents.extend(other.documents);
    self.refused.extend(other.refused);
    self.failures.extend(other.failures);
    self
  }
}

/// Fetches every document of `collection` whose id is in `ids`, issuing one
/// query per [`MAX_IDS_PER_QUERY`] ids. No query is issued for an empty set.
///
/// The store refuses a whole chunk when any of its documents is unreadable,
/// so a refused chunk is read again document by document.
pub async fn query_by_id_set<S: DocumentStore>(
  store: &S,
  collection: &str,
  ids: &[Id],
) -> ChunkedQuery {
  let ids = normalize::unique(ids.iter().cloned());
  if ids.is_empty() {
    return ChunkedQuery::default();
  }

  let queries = ids
    .chunks(MAX_IDS_PER_QUERY)
    .map(|chunk| query_chunk(store, collection, chunk));

  join_all(queries)
    .await
    .into_iter()
    .fold(ChunkedQuery::default(), ChunkedQuery::absorb)
}

async fn query_chunk<S: DocumentStore>(store: &S, collection: &str, chunk: &[Id]) -> ChunkedQuery {
  let mut outcome = ChunkedQuery::default();
  match store.query(collection, &Filter::IdIn(chunk.to_vec())).await {
    Ok(documents) => outcome.documents = documents,
    Err(e) if e.is_absence() && chunk.len() > 1 => {
      event!(
        Level::DEBUG,
        "A chunk of {collection} was refused ({e}), reading its {} ids one by one.",
        chunk.len()
      );
      let reads = chunk.iter().map(|id| async move {
        (id, store.get(&DocRef::new(collection, id.clone())).await)
      });
      for (id, read) in join_all(reads).await {
        match read {
          Ok(Some(document)) => outcome.documents.push(document),
          Ok(None) => {}
          Err(e) if e.is_absence() => outcome.refused.push(id.clone()),
          Err(e) => outcome.failures.push(e),
        }
      }
    }
    Err(e) if e.is_absence() => outcome.refused.extend(chunk.iter().cloned()),
    Err(e) => outcome.failures.push(e),
  }
  outcome
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use serde_json::json;

  use super::*;
  use crate::{memory::MemoryStore, DocRef};

  fn seeded(count: usize) -> MemoryStore {
    let store = MemoryStore::default();
    for n in 0..count {
      store.insert(&DocRef::new("users", format!("u{n}")), json!({ "n": n }));
    }
    store
  }

  fn ids(range: std::ops::Range<usize>) -> Vec<Id> {
    range.map(|n| Id::from(format!("u{n}"))).collect()
  }

  #[tokio::test]
  async fn empty_set_issues_no_query() {
    let store = seeded(3);
    let result = query_by_id_set(&store, "users", &[]).await;
    assert!(result.documents.is_empty());
    assert!(result.failures.is_empty());
    assert_eq!(store.requests("users"), 0);
  }

  #[tokio::test]
  async fn large_sets_are_chunked_and_merged() {
    let store = seeded(70);
    // 75 ids: five of them do not exist, two are repeated.
    let mut wanted = ids(0..75);
    wanted.extend(ids(0..2));

    let result = query_by_id_set(&store, "users", &wanted).await;

    assert_eq!(store.requests("users"), 3);
    assert!(result.failures.is_empty());
    let found: HashSet<_> = result.documents.iter().map(|d| d.id.clone()).collect();
    assert_eq!(found.len(), result.documents.len(), "no duplicates");
    assert_eq!(found, ids(0..70).into_iter().collect());
  }

  #[tokio::test]
  async fn unreadable_document_hides_only_itself() {
    let store = seeded(40);
    store.deny(&DocRef::new("users", "u35"));

    let result = query_by_id_set(&store, "users", &ids(0..40)).await;

    assert!(result.failures.is_empty());
    assert_eq!(result.refused, [Id::from("u35")]);
    assert_eq!(result.documents.len(), 39);
    assert!(result.documents.iter().all(|d| &*d.id != "u35"));
  }

  #[tokio::test]
  async fn thirty_ids_fit_one_query_and_thirty_one_do_not() {
    let store = seeded(31);

    let full = query_by_id_set(&store, "users", &ids(0..MAX_IDS_PER_QUERY)).await;
    assert_eq!(store.requests("users"), 1);
    assert_eq!(full.documents.len(), MAX_IDS_PER_QUERY);

    let over = query_by_id_set(&store, "users", &ids(0..MAX_IDS_PER_QUERY + 1)).await;
    assert_eq!(store.requests("users"), 3);
    assert_eq!(over.documents.len(), MAX_IDS_PER_QUERY + 1);
  }

  #[tokio::test]
  async fn outage_is_reported_per_chunk() {
    let store = seeded(40);
    store.begin_outage("offline");

    let result = query_by_id_set(&store, "users", &ids(0..40)).await;

    assert!(result.documents.is_empty());
    assert!(result.refused.is_empty());
    assert_eq!(result.failures.len(), 2);
  }
}
