use std::sync::Arc;

use repositories::DocumentStore;
use session::IdentityProvider;
use tokio::sync::watch;
use tracing::{event, Level};
use types::entities::AuthUser;

use crate::{subscription::Gate, sync_profile, Resolver, SubscriptionHandle};

type Current = Arc<watch::Sender<Option<Arc<Resolver>>>>;

/// Keeps one [`Resolver`] running for whoever is signed in. Every sign-in
/// replaces it with a fresh one built for the new user, and a sign-out leaves
/// none.
#[derive(Debug)]
pub struct Session {
  current: Current,
  job: SubscriptionHandle,
}
impl Session {
  /// Starts following `identity`. Must be called within a Tokio runtime.
  #[must_use]
  pub fn begin<S: DocumentStore, P: IdentityProvider>(store: Arc<S>, identity: &P) -> Self {
    let current: Current = Arc::new(watch::Sender::new(None));
    let auth = identity.on_auth_state_change();

    let job = {
      let current = current.clone();
      SubscriptionHandle::spawn(move |gate| run(store, auth, current, gate))
    };

    event!(Level::INFO, "Now following the signed-in user.");
    Self { current, job }
  }

  /// The resolver of the signed-in user, `None` while signed out.
  #[must_use]
  pub fn resolver(&self) -> Option<Arc<Resolver>> {
    self.current.borrow().clone()
  }

  /// Sees every resolver replacement.
  #[must_use]
  pub fn watch(&self) -> watch::Receiver<Option<Arc<Resolver>>> {
    self.current.subscribe()
  }

  /// Stops following sign-ins and shuts the current resolver down.
  pub fn shutdown(&self) {
    self.job.unsubscribe();
    if let Some(resolver) = self.current.send_replace(None) {
      resolver.shutdown();
    }
  }
}
impl Drop for Session {
  fn drop(&mut self) {
    self.shutdown();
  }
}

async fn run<S: DocumentStore>(
  store: Arc<S>,
  mut auth: watch::Receiver<Option<AuthUser>>,
  current: Current,
  gate: Gate,
) {
  loop {
    let signed_in = auth.borrow_and_update().clone();
    tear_down(&current, &gate);

    match signed_in {
      None => event!(Level::INFO, "Nobody is signed in."),
      Some(user) => {
        if let Err(e) = sync_profile::act(&*store, &user).await {
          event!(
            Level::ERROR,
            "Profile sync failed, resolving with what is stored: {e:#}"
          );
        }

        let resolver = Arc::new(Resolver::start(store.clone(), user.uid.clone()));
        let published = gate.pass(|| {
          current.send_replace(Some(resolver.clone()));
        });
        if !published {
          resolver.shutdown();
          return;
        }
        event!(Level::INFO, "Resolving for {}.", user.uid);
      }
    }

    if auth.changed().await.is_err() {
      event!(
        Level::WARN,
        "(Notice) The identity provider went away, keeping the current session."
      );
      return;
    }
  }
}

fn tear_down(current: &Current, gate: &Gate) {
  let mut previous = None;
  gate.pass(|| previous = current.send_replace(None));
  if let Some(resolver) = previous {
    event!(Level::DEBUG, "Stopping the resolver of {}.", resolver.user_id());
    resolver.shutdown();
  }
}
