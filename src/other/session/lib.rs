//! Who is signed in. The rest of the workspace only ever sees the
//! [`IdentityProvider`] trait; [`LocalIdentity`] is the in-process provider
//! used by the binary and by tests.

mod local;
pub use local::LocalIdentity;

use std::future::Future;

use thiserror::Error as ThisError;
use tokio::sync::watch;
use types::entities::AuthUser;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("No account is available to sign in with")]
  NoAccount,
  #[error("Identity provider failure: {0}")]
  Provider(String),
}

pub trait IdentityProvider: Send + Sync + 'static {
  /// The current user, `None` when signed out. The receiver starts with the
  /// restored session (if any) and sees every later sign-in and sign-out.
  fn on_auth_state_change(&self) -> watch::Receiver<Option<AuthUser>>;

  /// # Errors
  /// When the provider cannot sign anybody in.
  fn sign_in(&self) -> impl Future<Output = Result<(), Error>> + Send;

  /// # Errors
  /// When the provider fails to end the session.
  fn sign_out(&self) -> impl Future<Output = Result<(), Error>> + Send;
}
