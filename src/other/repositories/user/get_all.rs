use types::entities::UserProfile;
use utils::constants::USERS;

use crate::{DocumentStore, Filter, StoreError};

/// # Errors
///
/// Returns an error if the query fails.
pub async fn get_all<S: DocumentStore>(store: &S) -> Result<Vec<UserProfile>, StoreError> {
  let documents = store.query(USERS, &Filter::All).await?;
  Ok(
    documents
      .into_iter()
      .map(|d| UserProfile::from_document(d.id, &d.fields))
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{memory::MemoryStore, DocRef};

  #[tokio::test]
  async fn lists_every_profile_normalized() {
    let store = MemoryStore::default();
    store.insert(&DocRef::new(USERS, "u1"), json!({ "displayName": "One" }));
    store.insert(&DocRef::new(USERS, "u2"), json!({ "displayName": 2, "friends": ["u1"] }));

    let profiles = get_all(&store).await.unwrap_or_else(|e| panic!("{e}"));

    let names: Vec<_> = profiles.iter().map(|p| p.display_name.as_deref()).collect();
    assert_eq!(names, [Some("One"), None]);
    assert_eq!(profiles[1].friend_count(), 1);
  }

  #[tokio::test]
  async fn reports_an_unreadable_directory() {
    let store = MemoryStore::default();
    store.insert(&DocRef::new(USERS, "u1"), json!({}));
    store.deny(&DocRef::new(USERS, "u1"));

    assert_eq!(get_all(&store).await, Err(StoreError::PermissionDenied));
  }
}
