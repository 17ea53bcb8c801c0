use tokio::sync::watch;
use tracing::{event, Level};
use types::entities::AuthUser;

use crate::{Error, IdentityProvider};

/// Signs in with one preconfigured account.
#[derive(Debug)]
pub struct LocalIdentity {
  account: Option<AuthUser>,
  current: watch::Sender<Option<AuthUser>>,
}
impl LocalIdentity {
  /// Starts signed out.
  #[must_use]
  pub fn new(account: Option<AuthUser>) -> Self {
    Self {
      account,
      current: watch::Sender::new(None),
    }
  }

  /// Starts signed in as `account`, like a session restored from a previous
  /// run.
  #[must_use]
  pub fn restored(account: AuthUser) -> Self {
    Self {
      current: watch::Sender::new(Some(account.clone())),
      account: Some(account),
    }
  }
}

impl IdentityProvider for LocalIdentity {
  fn on_auth_state_change(&self) -> watch::Receiver<Option<AuthUser>> {
    self.current.subscribe()
  }

  async fn sign_in(&self) -> Result<(), Error> {
    let account = self.account.clone().ok_or(Error::NoAccount)?;
    event!(Level::INFO, "Signing in as {}.", account.uid);
    self.current.send_replace(Some(account));
    Ok(())
  }

  async fn sign_out(&self) -> Result<(), Error> {
    if self.current.send_replace(None).is_some() {
      event!(Level::INFO, "Signed out.");
    }
    Ok(())
  }
}
