//! Live view of the watchlists the current user owns.
//!
//! The chain has two states. While `AwaitingMembership`, only the user's
//! membership document (`users/{uid}/private/watchlists`) is watched. Once it
//! names some watchlists the chain is `WatchingWatchlists`, subscribed to
//! exactly those ids as well. A new set of ids always leaves the current
//! state before entering the next one: the old watchlist subscription is
//! dropped first, so none of its snapshots can be delivered after it.

use std::sync::Arc;

use repositories::{membership, DocumentStore, Filter, IdSetSubscription, Snapshot};
use tracing::{event, Level};
use types::entities::Watchlist;
use utils::{constants::WATCHLISTS, Id};

use crate::{to_watchlists, SubscriptionHandle};

enum State {
  AwaitingMembership,
  WatchingWatchlists {
    ids: Vec<Id>,
    watchlists: IdSetSubscription,
  },
}

enum Received {
  Membership(Option<Snapshot>),
  Watchlists(Option<Snapshot>),
}

/// Calls `on_update` with the user's watchlists now and after every change,
/// until the returned handle is dropped or unsubscribed.
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

#[allow(clippy::redundant_pub_crate)] // Select macro propagates this
async fn run<S: DocumentStore>(store: &S, user_id: &Id, mut emit: impl FnMut(Vec<Watchlist>)) {
  let doc = membership::doc_ref(user_id, WATCHLISTS);
  let mut memberships = match store.subscribe(&doc.collection, Filter::IdIn(vec![doc.id.clone()])) {
    Ok(subscription) => subscription,
    Err(e) => {
      event!(Level::ERROR, "Failed to watch {doc}: {e}");
      return;
    }
  };
  let mut state = State::AwaitingMembership;

  loop {
    let received = match &mut state {
      State::AwaitingMembership => Received::Membership(memberships.next().await),
      State::WatchingWatchlists { watchlists, .. } => tokio::select! {
        biased;
        snapshot = memberships.next() => Received::Membership(snapshot),
        snapshot = watchlists.next(store) => Received::Watchlists(snapshot),
      },
    };

    match received {
      Received::Membership(None) => {
        event!(Level::DEBUG, "The store ended the watch on {doc}.");
        return;
      }
      Received::Membership(Some(Err(e))) if e.is_absence() => {
        event!(
          Level::WARN,
          "(Notice) {doc} is not readable, showing no watchlists: {e}"
        );
        state = State::AwaitingMembership;
        emit(Vec::new());
      }
      Received::Membership(Some(Err(e))) => {
        event!(
          Level::WARN,
          "(Notice) Failed to refresh {doc}, keeping the last known watchlists: {e}"
        );
      }
      Received::Membership(Some(Ok(documents))) => {
        let ids = documents
          .first()
          .map(|d| membership::ids_of(d, WATCHLISTS))
          .unwrap_or_default();
        if matches!(&state, State::WatchingWatchlists { ids: current, .. } if *current == ids) {
          continue;
        }

        state = State::AwaitingMembership;
        if ids.is_empty() {
          event!(Level::DEBUG, "{user_id} owns no watchlists.");
          emit(Vec::new());
          continue;
        }

        event!(Level::DEBUG, "{user_id} owns watchlists {ids:?}.");
        match IdSetSubscription::open(store, WATCHLISTS, &ids) {
          Ok(watchlists) => state = State::WatchingWatchlists { ids, watchlists },
          Err(e) => event!(
            Level::ERROR,
            "Failed to watch the watchlists of {user_id}: {e}"
          ),
        }
      }
      Received::Watchlists(None) => {
        event!(
          Level::WARN,
          "(Notice) The store ended the watch on the watchlists of {user_id}."
        );
        state = State::AwaitingMembership;
      }
      Received::Watchlists(Some(Err(e))) => {
        event!(
          Level::WARN,
          "(Notice) Failed to refresh the watchlists of {user_id}, keeping the last known ones: {e}"
        );
      }
      Received::Watchlists(Some(Ok(documents))) => emit(to_watchlists(documents)),
    }
  }
}
