use utils::Id;

use crate::{DocumentStore, StoreError};

/// Adds `id` to the user's membership document for `collection`, keeping
/// whichever shape (sequence or map) the document already uses. Concurrent
/// additions never lose each other.
///
/// # Errors
///
/// Returns an error if the write fails.
pub async fn add<S: DocumentStore>(
  store: &S,
  uid: &Id,
  collection: &str,
  id: &Id,
) -> Result<(), StoreError> {
  store
    .array_union(&super::doc_ref(uid, collection), collection, &[id.clone()])
    .await
}
