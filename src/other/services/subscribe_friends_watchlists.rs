//! Live view of the watchlists the current user follows through friends.
//!
//! Unlike the user's own watchlists, the friends list itself is read once
//! when the chain starts: later edits to it are only seen by a new chain.

use std::sync::Arc;

use repositories::{user, DocumentStore, IdSetSubscription};
use tracing::{event, Level};
use types::entities::Watchlist;
use utils::{constants::WATCHLISTS, Id};

use crate::{to_watchlists, SubscriptionHandle};

/// Calls `on_update` with the watchlists followed through friends now and
/// after every change to them, until the returned handle is dropped or
/// unsubscribed.
#[must_use]
pub fn act<S, F>(store: Arc<S>, user_id: Id, on_update: F) -> SubscriptionHandle
where
  S: DocumentStore,
  F: FnMut(Vec<Watchlist>) + Send + 'static,
{
  SubscriptionHandle::spawn(move |gate| async move {
    let mut on_update = on_update;
    let emit = move |watchlists: Vec<Watchlist>| {
      gate.pass(|| on_update(watchlists));
    };
    run(&*store, &user_id, emit).await;
  })
}

async fn run<S: DocumentStore>(store: &S, user_id: &Id, mut emit: impl FnMut(Vec<Watchlist>)) {
  let profile = match user::get(store, user_id).await {
    Ok(Some(profile)) => profile,
    Ok(None) => {
      event!(Level::INFO, "{user_id} has no profile yet, so no friends' watchlists.");
      emit(Vec::new());
      return;
    }
    Err(e) if e.is_absence() => {
      event!(
        Level::WARN,
        "(Notice) The profile of {user_id} is not readable, showing no friends' watchlists: {e}"
      );
      emit(Vec::new());
      return;
    }
    Err(e) => {
      event!(
        Level::WARN,
        "(Notice) Failed to read the profile of {user_id}, friends' watchlists stay unknown: {e}"
      );
      return;
    }
  };

  let ids = profile.friends_watchlist_ids();
  if ids.is_empty() {
    event!(Level::DEBUG, "{user_id} follows no watchlists through friends.");
    emit(Vec::new());
    return;
  }

  let mut watchlists = match IdSetSubscription::open(store, WATCHLISTS, &ids) {
    Ok(watchlists) => watchlists,
    Err(e) => {
      event!(
        Level::ERROR,
        "Failed to watch the friends' watchlists of {user_id}: {e}"
      );
      return;
    }
  };

  while let Some(snapshot) = watchlists.next(store).await {
    match snapshot {
      Ok(documents) => emit(to_watchlists(documents)),
      Err(e) => event!(
        Level::WARN,
        "(Notice) Failed to refresh friends' watchlists of {user_id}, keeping the last known ones: {e}"
      ),
    }
  }
  event!(
    Level::DEBUG,
    "The store ended the watch on the friends' watchlists of {user_id}."
  );
}
