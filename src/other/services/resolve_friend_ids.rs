use repositories::{user, DocumentStore};
use tracing::{event, Level};
use utils::Id;

/// Reads the user's profile once and lists their friends' ids, each once.
/// A missing profile or a failed read means no friends.
pub async fn act<S: DocumentStore>(store: &S, user_id: &Id) -> Vec<Id> {
  if user_id.is_empty() {
    event!(Level::WARN, "(Notice) Asked for the friends of an empty user id.");
    return Vec::new();
  }

  match user::get(store, user_id).await {
    Ok(Some(profile)) => profile.friend_ids().cloned().collect(),
    Ok(None) => {
      event!(Level::INFO, "{user_id} has no profile yet, so no friends.");
      Vec::new()
    }
    Err(e) => {
      event!(
        Level::WARN,
        "(Notice) Failed to read the profile of {user_id}, assuming no friends: {e}"
      );
      Vec::new()
    }
  }
}
