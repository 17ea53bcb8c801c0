use types::entities::UserProfile;

use crate::{DocumentStore, SetMode, StoreError};

/// Writes the whole profile, replacing whatever was stored.
///
/// # Errors
///
/// Returns an error if the write fails.
pub async fn save<S: DocumentStore>(store: &S, profile: &UserProfile) -> Result<(), StoreError> {
  store
    .set(&super::doc_ref(&profile.id), profile.to_fields(), SetMode::Replace)
    .await
}
