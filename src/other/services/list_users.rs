use repositories::{user, DocumentStore};
use tracing::{event, Level};
use types::entities::UserProfile;

/// Every known profile, for browsing people to befriend. Empty when the
/// store cannot list them.
pub async fn act<S: DocumentStore>(store: &S) -> Vec<UserProfile> {
  user::get_all(store).await.unwrap_or_else(|e| {
    event!(Level::WARN, "(Notice) Failed to list users: {e}");
    Vec::new()
  })
}
