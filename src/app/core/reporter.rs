//! Logs what the screens would show, every time it changes.

use std::{future::pending, sync::Arc};

use services::{Resolver, View};
use tokio::sync::watch;
use tracing::{event, Level};
use types::entities::{UserProfile, Watchlist};
use utils::Id;

#[allow(clippy::redundant_pub_crate)] // Select macro propagates this
pub async fn act(mut sessions: watch::Receiver<Option<Arc<Resolver>>>) {
  loop {
    let current = sessions.borrow_and_update().clone();
    tokio::select! {
      changed = sessions.changed() => {
        if changed.is_err() {
          event!(Level::DEBUG, "The session ended, no more reports.");
          return;
        }
      },
      () = report(current) => {},
    }
  }
}

/// Never returns; replaced when the session changes.
#[allow(clippy::redundant_pub_crate)] // Select macro propagates this
async fn report(current: Option<Arc<Resolver>>) {
  let Some(resolver) = current else {
    event!(Level::INFO, "Nobody is signed in.");
    return pending().await;
  };

  let user = resolver.user_id().clone();
  let mut mine = resolver.my_watchlists();
  let mut theirs = resolver.friends_watchlists();
  let mut friends = resolver.friend_profiles();
  mine.mark_changed();
  theirs.mark_changed();
  friends.mark_changed();

  loop {
    tokio::select! {
      Ok(()) = mine.changed() => watchlists(&user, "Own", &mut mine),
      Ok(()) = theirs.changed() => watchlists(&user, "Friends'", &mut theirs),
      Ok(()) = friends.changed() => profiles(&user, &mut friends),
      else => break,
    }
  }
  pending().await
}

fn watchlists(user: &Id, whose: &str, view: &mut View<Vec<Watchlist>>) {
  match &*view.borrow_and_update() {
    None => event!(Level::INFO, "{whose} watchlists of {user}: loading..."),
    Some(lists) => {
      let titles: Vec<&str> = lists.iter().map(|l| l.title.as_str()).collect();
      event!(
        Level::INFO,
        "{whose} watchlists of {user} ({}): {titles:?}",
        lists.len()
      );
    }
  }
}

fn profiles(user: &Id, view: &mut View<Vec<UserProfile>>) {
  match &*view.borrow_and_update() {
    None => event!(Level::INFO, "Friends of {user}: loading..."),
    Some(friends) => {
      let names: Vec<&str> = friends
        .iter()
        .map(|f| f.display_name.as_deref().unwrap_or(&f.id))
        .collect();
      event!(Level::INFO, "Friends of {user} ({}): {names:?}", friends.len());
    }
  }
}
