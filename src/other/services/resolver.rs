use std::sync::Arc;

use repositories::DocumentStore;
use tokio::sync::watch;
use types::entities::{UserProfile, Watchlist};
use utils::Id;

use crate::{
  fetch_friends_profiles, resolve_friend_ids, search_friends, subscribe_friends_watchlists,
  subscribe_my_watchlists, FriendSet, SubscriptionHandle,
};

/// A live-updating value. `None` until first resolved.
pub type View<T> = watch::Receiver<Option<T>>;

type Publisher<T> = Arc<watch::Sender<Option<T>>>;

fn publisher<T>() -> Publisher<T> {
  Arc::new(watch::Sender::new(None))
}

/// Everything the screens need to know about the current user's
/// relationships and watchlists, kept up to date for as long as it lives.
///
/// Built for one user id; a different user gets a new resolver. Dropping it
/// (or calling [`Resolver::shutdown`]) stops every subscription it opened.
#[derive(Debug)]
pub struct Resolver {
  user_id: Id,
  friends: Publisher<FriendSet>,
  friend_profiles: Publisher<Vec<UserProfile>>,
  my_watchlists: Publisher<Vec<Watchlist>>,
  friends_watchlists: Publisher<Vec<Watchlist>>,
  chains: [SubscriptionHandle; 3],
}
impl Resolver {
  /// Starts resolving for `user_id`. Must be called within a Tokio runtime.
  #[must_use]
  pub fn start<S: DocumentStore>(store: Arc<S>, user_id: Id) -> Self {
    let friends = publisher::<FriendSet>();
    let friend_profiles = publisher::<Vec<UserProfile>>();
    let my_watchlists = publisher::<Vec<Watchlist>>();
    let friends_watchlists = publisher::<Vec<Watchlist>>();

    let relationships = {
      let (store, user_id) = (store.clone(), user_id.clone());
      let (friends, friend_profiles) = (friends.clone(), friend_profiles.clone());
      SubscriptionHandle::spawn(move |gate| async move {
        let ids = resolve_friend_ids::act(&*store, &user_id).await;
        let published = gate.pass(|| {
          friends.send_replace(Some(ids.iter().cloned().collect()));
        });
        if !published {
          return;
        }

        let profiles = fetch_friends_profiles::act(&*store, &ids).await;
        gate.pass(|| {
          friend_profiles.send_replace(Some(profiles));
        });
      })
    };

    let mine = {
      let view = my_watchlists.clone();
      subscribe_my_watchlists::act(store.clone(), user_id.clone(), move |lists| {
        view.send_replace(Some(lists));
      })
    };

    let theirs = {
      let view = friends_watchlists.clone();
      subscribe_friends_watchlists::act(store, user_id.clone(), move |lists| {
        view.send_replace(Some(lists));
      })
    };

    Self {
      user_id,
      friends,
      friend_profiles,
      my_watchlists,
      friends_watchlists,
      chains: [relationships, mine, theirs],
    }
  }

  #[must_use]
  pub const fn user_id(&self) -> &Id {
    &self.user_id
  }

  /// Whether `candidate` is one of the current user's friends. False while
  /// the friends list is still loading.
  #[must_use]
  pub fn is_friend(&self, candidate: &str) -> bool {
    self
      .friends
      .borrow()
      .as_ref()
      .is_some_and(|friends| friends.contains(candidate))
  }

  #[must_use]
  pub fn friends(&self) -> View<FriendSet> {
    self.friends.subscribe()
  }

  #[must_use]
  pub fn friend_profiles(&self) -> View<Vec<UserProfile>> {
    self.friend_profiles.subscribe()
  }

  #[must_use]
  pub fn my_watchlists(&self) -> View<Vec<Watchlist>> {
    self.my_watchlists.subscribe()
  }

  #[must_use]
  pub fn friends_watchlists(&self) -> View<Vec<Watchlist>> {
    self.friends_watchlists.subscribe()
  }

  /// Friend profiles matching `query`, see [`search_friends::act`].
  #[must_use]
  pub fn search_friends(&self, query: &str) -> Vec<UserProfile> {
    let profiles = self.friend_profiles.borrow();
    profiles
      .as_deref()
      .map(|profiles| search_friends::act(profiles, query).into_iter().cloned().collect())
      .unwrap_or_default()
  }

  /// Whether any view is still waiting for its first value.
  #[must_use]
  pub fn is_loading(&self) -> bool {
    self.friends.borrow().is_none()
      || self.friend_profiles.borrow().is_none()
      || self.my_watchlists.borrow().is_none()
      || self.friends_watchlists.borrow().is_none()
  }

  /// Stops every subscription. No view changes once this returns.
  pub fn shutdown(&self) {
    for chain in &self.chains {
      chain.unsubscribe();
    }
  }
}
