use anyhow::Context;
use repositories::{user, DocumentStore};
use tracing::{event, Level};
use types::entities::{AuthUser, UserProfile};

/// Makes sure the signed-in user has a stored profile carrying the freshest
/// details the identity provider knows, and returns it.
///
/// A first sign-in creates the profile with an empty friends list. Later
/// sign-ins only refresh the details the provider supplies; the friends list
/// is never touched.
///
/// # Errors
/// When the profile cannot be read or written.
pub async fn act<S: DocumentStore>(store: &S, signed_in: &AuthUser) -> anyhow::Result<UserProfile> {
  let uid = &signed_in.uid;
  let stored = user::get(store, uid)
    .await
    .with_context(|| format!("Failed to load the profile of {uid}"))?;

  if let Some(mut profile) = stored {
    let refreshed = user::merge_details(store, signed_in)
      .await
      .with_context(|| format!("Failed to refresh the profile of {uid}"))?;
    if refreshed {
      event!(Level::DEBUG, "Refreshed the profile details of {uid}.");
      profile.display_name = signed_in.display_name.clone().or(profile.display_name);
      profile.email = signed_in.email.clone().or(profile.email);
      profile.avatar_url = signed_in.photo_url.clone().or(profile.avatar_url);
    }
    return Ok(profile);
  }

  let profile = UserProfile {
    display_name: signed_in.display_name.clone(),
    email: signed_in.email.clone(),
    avatar_url: signed_in.photo_url.clone(),
    ..UserProfile::new(uid.clone())
  };
  user::save(store, &profile)
    .await
    .with_context(|| format!("Failed to create the profile of {uid}"))?;
  event!(Level::INFO, "Created a profile for {uid}.");
  Ok(profile)
}
