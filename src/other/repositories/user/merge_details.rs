use serde_json::Value;
use types::{entities::AuthUser, Fields};

use crate::{DocumentStore, SetMode, StoreError};

/// Stores the display fields the identity provider knows about, leaving
/// every other field (friends included) untouched.
///
/// # Returns
/// Whether anything was written.
///
/// # Errors
///
/// Returns an error if the write fails.
pub async fn merge_details<S: DocumentStore>(
  store: &S,
  user: &AuthUser,
) -> Result<bool, StoreError> {
  let mut fields = Fields::new();
  let known = [
    ("displayName", &user.display_name),
    ("email", &user.email),
    ("photoURL", &user.photo_url),
  ];
  for (key, value) in known {
    if let Some(value) = value {
      fields.insert(key.to_string(), Value::String(value.clone()));
    }
  }

  if fields.is_empty() {
    return Ok(false);
  }
  store
    .set(&super::doc_ref(&user.uid), fields, SetMode::Merge)
    .await?;
  Ok(true)
}
