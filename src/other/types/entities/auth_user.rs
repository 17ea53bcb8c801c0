use utils::Id;

/// What the identity provider knows about the signed-in user. Its display
/// fields are fresher than whatever the stored profile holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
  pub uid: Id,
  pub display_name: Option<String>,
  pub email: Option<String>,
  pub photo_url: Option<String>,
}
impl AuthUser {
  #[must_use]
  pub const fn new(uid: Id) -> Self {
    Self {
      uid,
      display_name: None,
      email: None,
      photo_url: None,
    }
  }
}
