use types::entities::UserProfile;
use utils::Id;

use crate::{DocumentStore, Loadable};

/// Reads one user profile.
///
/// # Errors
///
/// Returns an error if the read fails.
pub async fn get<S: DocumentStore>(store: &S, uid: &Id) -> Loadable<UserProfile> {
  let document = store.get(&super::doc_ref(uid)).await?;
  Ok(document.map(|d| UserProfile::from_document(d.id, &d.fields)))
}
