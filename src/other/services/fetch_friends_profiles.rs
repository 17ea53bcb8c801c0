use repositories::{query_by_id_set, DocumentStore};
use tracing::{event, Level};
use types::entities::UserProfile;
use utils::{constants::USERS, Id};

/// Fetches the profiles of `friend_ids`, chunking the lookup as the store
/// requires. Friends without a profile, or whose profile the store refuses,
/// are left out.
pub async fn act<S: DocumentStore>(store: &S, friend_ids: &[Id]) -> Vec<UserProfile> {
  if friend_ids.is_empty() {
    return Vec::new();
  }

  let result = query_by_id_set(store, USERS, friend_ids).await;
  if !result.refused.is_empty() {
    event!(
      Level::INFO,
      "Skipping unreadable friend profiles: {:?}",
      result.refused
    );
  }
  for e in &result.failures {
    event!(
      Level::WARN,
      "(Notice) Some friend profiles could not be fetched: {e}"
    );
  }

  result
    .documents
    .into_iter()
    .map(|d| UserProfile::from_document(d.id, &d.fields))
    .collect()
}
