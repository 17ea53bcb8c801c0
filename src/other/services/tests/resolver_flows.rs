mod common;

use std::sync::{Arc, OnceLock};

use common::{put, settled, QUIET, WAIT};
use repositories::{membership, memory::MemoryStore, DocRef, DocumentStore};
use serde_json::{json, Value};
use services::{
  create_document::{self, Template},
  subscribe_my_watchlists, Resolver, SubscriptionHandle,
};
use tokio::{sync::mpsc, time::timeout};
use types::{entities::Watchlist, Fields};
use utils::{
  constants::{MAX_IDS_PER_QUERY, USERS, WATCHLISTS},
  Id,
};

fn me() -> Id {
  Id::from("me")
}

fn own(store: &MemoryStore, uid: &Id, ids: &[&str]) {
  store.insert(&membership::doc_ref(uid, WATCHLISTS), json!({ "watchlists": ids }));
}

fn titles(lists: &[Watchlist]) -> Vec<&str> {
  lists.iter().map(|l| l.title.as_str()).collect()
}

#[tokio::test]
async fn resolves_friends_and_their_watchlists() {
  let store = Arc::new(MemoryStore::default());
  put(&store, USERS, "me", json!({ "friends": [{ "uid": "f1", "watchlists": ["w1"] }] }));
  put(&store, USERS, "f1", json!({ "displayName": "Fran" }));
  put(
    &store,
    WATCHLISTS,
    "w1",
    json!({ "title": "Shared", "titles": "X, Y", "createdBy": "f1", "visibility": "friends" }),
  );

  let resolver = Resolver::start(store.clone(), me());
  assert!(resolver.is_loading());
  assert!(!resolver.is_friend("f1"));

  let theirs = settled(&mut resolver.friends_watchlists(), Option::is_some).await;
  let theirs = theirs.unwrap_or_default();
  assert_eq!(titles(&theirs), ["Shared"]);
  assert_eq!(theirs[0].titles, ["X", "Y"]);
  assert_eq!(theirs[0].owner_id.as_deref(), Some("f1"));

  let profiles = settled(&mut resolver.friend_profiles(), Option::is_some).await;
  assert_eq!(
    profiles.unwrap_or_default()[0].display_name.as_deref(),
    Some("Fran")
  );
  assert!(resolver.is_friend("f1"));
  assert!(!resolver.is_friend("me"));
  assert!(!resolver.is_friend("stranger"));
  assert_eq!(resolver.search_friends("FRA").len(), 1);
  assert!(resolver.search_friends("zed").is_empty());

  settled(&mut resolver.my_watchlists(), Option::is_some).await;
  assert!(!resolver.is_loading());
}

#[tokio::test]
async fn counts_self_as_friend_only_when_listed() {
  let store = Arc::new(MemoryStore::default());
  put(&store, USERS, "me", json!({ "friends": [{ "uid": "me" }] }));

  let resolver = Resolver::start(store, me());
  settled(&mut resolver.friends(), Option::is_some).await;

  assert!(resolver.is_friend("me"));
}

#[tokio::test]
async fn missing_membership_resolves_empty_without_watchlist_reads() {
  let store = Arc::new(MemoryStore::default());
  put(&store, USERS, "me", json!({ "displayName": "Me" }));

  let resolver = Resolver::start(store.clone(), me());
  let mine = settled(&mut resolver.my_watchlists(), Option::is_some).await;
  let theirs = settled(&mut resolver.friends_watchlists(), Option::is_some).await;
  let friends = settled(&mut resolver.friend_profiles(), Option::is_some).await;

  assert_eq!(mine, Some(Vec::new()));
  assert_eq!(theirs, Some(Vec::new()));
  assert_eq!(friends, Some(Vec::new()));
  assert_eq!(store.requests(WATCHLISTS), 0);
  assert_eq!(store.requests(USERS), 0);
}

#[tokio::test]
async fn unreadable_membership_resolves_empty() {
  let store = Arc::new(MemoryStore::default());
  own(&store, &me(), &["w1"]);
  put(&store, WATCHLISTS, "w1", json!({ "title": "Hidden" }));
  store.deny(&membership::doc_ref(&me(), WATCHLISTS));

  let resolver = Resolver::start(store, me());
  let mine = settled(&mut resolver.my_watchlists(), Option::is_some).await;

  assert_eq!(mine, Some(Vec::new()));
}

#[tokio::test]
async fn switching_id_sets_never_delivers_stale_watchlists() {
  let store = Arc::new(MemoryStore::default());
  for (id, title) in [("a", "A"), ("b", "B"), ("c", "C")] {
    put(&store, WATCHLISTS, id, json!({ "title": title }));
  }
  own(&store, &me(), &["a", "b"]);

  let (tx, mut rx) = mpsc::unbounded_channel();
  let handle = subscribe_my_watchlists::act(store.clone(), me(), move |lists| {
    tx.send(lists).ok();
  });

  let first = timeout(WAIT, rx.recv()).await.ok().flatten().unwrap_or_default();
  assert_eq!(titles(&first), ["A", "B"]);

  own(&store, &me(), &["c"]);
  let second = timeout(WAIT, rx.recv()).await.ok().flatten().unwrap_or_default();
  assert_eq!(titles(&second), ["C"]);
  // One for the membership document, one for the new id set.
  assert_eq!(store.live_subscriptions(), 2);

  put(&store, WATCHLISTS, "a", json!({ "title": "A, edited" }));
  assert!(timeout(QUIET, rx.recv()).await.is_err());

  put(&store, WATCHLISTS, "c", json!({ "title": "C, edited" }));
  let third = timeout(WAIT, rx.recv()).await.ok().flatten().unwrap_or_default();
  assert_eq!(titles(&third), ["C, edited"]);
  assert!(!handle.is_finished());
}

#[tokio::test]
async fn unsubscribing_stops_every_callback() {
  let store = Arc::new(MemoryStore::default());
  put(&store, WATCHLISTS, "a", json!({ "title": "A" }));
  own(&store, &me(), &["a"]);

  let (tx, mut rx) = mpsc::unbounded_channel();
  let handle = subscribe_my_watchlists::act(store.clone(), me(), move |lists| {
    tx.send(lists).ok();
  });
  assert!(timeout(WAIT, rx.recv()).await.ok().flatten().is_some());

  handle.unsubscribe();
  handle.unsubscribe();
  put(&store, WATCHLISTS, "a", json!({ "title": "A, edited" }));

  // The callback, and the sender it owns, is gone for good.
  assert_eq!(timeout(WAIT, rx.recv()).await.ok(), Some(None));
  assert_eq!(store.live_subscriptions(), 0);
}

#[tokio::test]
async fn outage_keeps_the_last_known_watchlists() {
  let store = Arc::new(MemoryStore::default());
  put(&store, WATCHLISTS, "a", json!({ "title": "A" }));
  own(&store, &me(), &["a"]);

  let (tx, mut rx) = mpsc::unbounded_channel();
  let _handle = subscribe_my_watchlists::act(store.clone(), me(), move |lists| {
    tx.send(lists).ok();
  });
  let first = timeout(WAIT, rx.recv()).await.ok().flatten().unwrap_or_default();
  assert_eq!(titles(&first), ["A"]);

  store.begin_outage("network down");
  assert!(timeout(QUIET, rx.recv()).await.is_err());

  store.end_outage();
  let recovered = timeout(WAIT, rx.recv()).await.ok().flatten().unwrap_or_default();
  assert_eq!(titles(&recovered), ["A"]);
}

#[tokio::test]
async fn large_friend_lists_are_read_in_chunks() {
  let store = Arc::new(MemoryStore::default());
  let friends: Vec<_> = (0..75)
    .map(|n| json!({ "uid": format!("f{n:02}"), "watchlists": [format!("w{n:02}")] }))
    .collect();
  put(&store, USERS, "me", json!({ "friends": friends }));
  for n in 0..75 {
    put(&store, USERS, &format!("f{n:02}"), json!({ "displayName": format!("Friend {n}") }));
    put(&store, WATCHLISTS, &format!("w{n:02}"), json!({ "title": format!("List {n}") }));
  }

  let resolver = Resolver::start(store.clone(), me());
  let profiles = settled(&mut resolver.friend_profiles(), Option::is_some).await;
  let theirs = settled(&mut resolver.friends_watchlists(), Option::is_some).await;

  assert_eq!(profiles.as_ref().map(Vec::len), Some(75));
  assert_eq!(theirs.as_ref().map(Vec::len), Some(75));
  assert_eq!(store.requests(USERS), 3);
  assert_eq!(store.requests(WATCHLISTS), 3);
  assert_eq!(resolver.friends().borrow().as_ref().map(services::FriendSet::len), Some(75));
}

#[tokio::test]
async fn shutdown_freezes_every_view() {
  let store = Arc::new(MemoryStore::default());
  put(&store, WATCHLISTS, "a", json!({ "title": "A" }));
  own(&store, &me(), &["a"]);

  let resolver = Resolver::start(store.clone(), me());
  let mut mine = resolver.my_watchlists();
  settled(&mut mine, Option::is_some).await;

  resolver.shutdown();
  put(&store, WATCHLISTS, "a", json!({ "title": "A, edited" }));

  assert!(timeout(QUIET, mine.changed()).await.is_err());
  assert_eq!(
    mine.borrow().as_deref().map(titles),
    Some(vec!["A"])
  );
}

#[tokio::test]
async fn unreadable_friend_data_hides_only_itself() {
  let store = Arc::new(MemoryStore::default());
  put(
    &store,
    USERS,
    "me",
    json!({ "friends": [
      { "uid": "f1", "watchlists": ["w1"] },
      { "uid": "f2", "watchlists": ["w2"] },
    ] }),
  );
  put(&store, USERS, "f1", json!({ "displayName": "Fran" }));
  put(&store, USERS, "f2", json!({ "displayName": "Gus" }));
  put(&store, WATCHLISTS, "w1", json!({ "title": "Open" }));
  put(&store, WATCHLISTS, "w2", json!({ "title": "Private" }));
  store.deny(&DocRef::new(USERS, "f2"));
  store.deny(&DocRef::new(WATCHLISTS, "w2"));

  let resolver = Resolver::start(store, me());
  settled(&mut resolver.friends(), Option::is_some).await;
  let theirs = settled(&mut resolver.friends_watchlists(), Option::is_some).await;
  let profiles = settled(&mut resolver.friend_profiles(), Option::is_some).await;

  assert_eq!(theirs.as_deref().map(titles), Some(vec!["Open"]));
  let names: Vec<_> = profiles
    .unwrap_or_default()
    .into_iter()
    .filter_map(|p| p.display_name)
    .collect();
  assert_eq!(names, ["Fran"]);
  // Still a friend, only the profile is hidden.
  assert!(resolver.is_friend("f2"));
}

#[tokio::test]
async fn a_full_chunk_of_friends_watchlists_is_one_subscription() {
  let store = Arc::new(MemoryStore::default());
  let friends: Vec<_> = (0..MAX_IDS_PER_QUERY)
    .map(|n| json!({ "uid": format!("f{n:02}"), "watchlists": [format!("w{n:02}")] }))
    .collect();
  put(&store, USERS, "me", json!({ "friends": friends }));
  for n in 0..MAX_IDS_PER_QUERY {
    put(&store, WATCHLISTS, &format!("w{n:02}"), json!({ "title": format!("List {n}") }));
  }

  let resolver = Resolver::start(store.clone(), me());
  let theirs = settled(&mut resolver.friends_watchlists(), Option::is_some).await;

  assert_eq!(theirs.as_ref().map(Vec::len), Some(MAX_IDS_PER_QUERY));
  assert_eq!(store.requests(WATCHLISTS), 1);
}

#[tokio::test]
async fn map_shaped_membership_drives_my_watchlists() {
  let store = Arc::new(MemoryStore::default());
  put(&store, WATCHLISTS, "a", json!({ "title": "A" }));
  put(&store, WATCHLISTS, "b", json!({ "title": "B" }));
  store.insert(
    &membership::doc_ref(&me(), WATCHLISTS),
    json!({ "watchlists": { "a": true, "b": true } }),
  );

  let resolver = Resolver::start(store.clone(), me());
  let mut mine = resolver.my_watchlists();
  let first = settled(&mut mine, Option::is_some).await;
  assert_eq!(first.as_deref().map(titles), Some(vec!["A", "B"]));

  let input: Fields = [("title".to_string(), json!("C"))].into_iter().collect();
  let created = create_document::act(&*store, Some(&me()), Template::Watchlist, input)
    .await
    .unwrap_or_else(|e| panic!("{e:#}"));

  let grown = settled(&mut mine, |lists| lists.as_ref().is_some_and(|l| l.len() == 3)).await;
  let ids: Vec<_> = grown.unwrap_or_default().into_iter().map(|l| l.id).collect();
  assert!(ids.contains(&created));
  let listed = store
    .get(&membership::doc_ref(&me(), WATCHLISTS))
    .await
    .ok()
    .flatten()
    .map(|d| d.fields.get(WATCHLISTS).is_some_and(Value::is_object));
  assert_eq!(listed, Some(true));
}

#[tokio::test]
async fn a_callback_may_unsubscribe_itself() {
  let store = Arc::new(MemoryStore::default());
  put(&store, WATCHLISTS, "a", json!({ "title": "A" }));
  own(&store, &me(), &["a"]);

  let own_handle: Arc<OnceLock<SubscriptionHandle>> = Arc::new(OnceLock::new());
  let (tx, mut rx) = mpsc::unbounded_channel();
  let handle = {
    let own_handle = own_handle.clone();
    subscribe_my_watchlists::act(store.clone(), me(), move |lists| {
      tx.send(lists).ok();
      if let Some(handle) = own_handle.get() {
        handle.unsubscribe();
      }
    })
  };
  own_handle.set(handle).unwrap_or_else(|_| panic!("set twice"));

  let first = timeout(WAIT, rx.recv()).await.ok().flatten().unwrap_or_default();
  assert_eq!(titles(&first), ["A"]);

  put(&store, WATCHLISTS, "a", json!({ "title": "A, edited" }));
  assert_eq!(timeout(WAIT, rx.recv()).await.ok(), Some(None));
}
