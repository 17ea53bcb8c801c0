//! In-process [`DocumentStore`] with live subscriptions. Backs the binary
//! with seeded data and lets tests inject refusals and outages.

mod seed;

use std::{
  collections::{BTreeMap, HashMap, HashSet},
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde_json::Value;
use tracing::{event, Level};
use types::Fields;
use utils::{constants::MAX_IDS_PER_QUERY, Id};

use crate::{
  DocRef, Document, DocumentStore, Filter, Loadable, SetMode, Snapshot, SnapshotSender,
  StoreError, Subscription,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
  state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
  collections: BTreeMap<Arc<str>, BTreeMap<Id, Fields>>,
  listeners: Vec<Listener>,
  denied: HashSet<DocRef>,
  outage: Option<String>,
  requests: HashMap<Arc<str>, usize>,
}

#[derive(Debug)]
struct Listener {
  collection: Arc<str>,
  filter: Filter,
  sender: SnapshotSender,
}

impl MemoryStore {
  fn state(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Writes a whole document, notifying subscribers. Anything but a JSON
  /// object is refused.
  pub fn insert(&self, doc: &DocRef, fields: Value) {
    let Value::Object(fields) = fields else {
      event!(Level::WARN, "(Notice) Refusing to store non-object {doc}: {fields}");
      return;
    };
    let mut state = self.state();
    state.write(doc, fields, SetMode::Replace);
    state.notify(&doc.collection, Some(&*doc.id));
  }

  pub fn remove(&self, doc: &DocRef) {
    let mut state = self.state();
    let removed = state
      .collections
      .get_mut(&doc.collection)
      .and_then(|docs| docs.remove(&doc.id));
    if removed.is_some() {
      state.notify(&doc.collection, Some(&*doc.id));
    }
  }

  /// Makes every read touching `doc` fail with [`StoreError::PermissionDenied`].
  pub fn deny(&self, doc: &DocRef) {
    let mut state = self.state();
    state.denied.insert(doc.clone());
    state.notify(&doc.collection, Some(&*doc.id));
  }

  pub fn allow(&self, doc: &DocRef) {
    let mut state = self.state();
    if state.denied.remove(doc) {
      state.notify(&doc.collection, Some(&*doc.id));
    }
  }

  /// Fails every operation with [`StoreError::Unavailable`] until
  /// [`MemoryStore::end_outage`]. Subscribers are told.
  pub fn begin_outage(&self, reason: &str) {
    let mut state = self.state();
    state.outage = Some(reason.to_string());
    state.notify_all();
  }

  /// Subscribers receive fresh snapshots.
  pub fn end_outage(&self) {
    let mut state = self.state();
    if state.outage.take().is_some() {
      state.notify_all();
    }
  }

  /// How many queries and subscriptions were issued against `collection`.
  #[must_use]
  pub fn requests(&self, collection: &str) -> usize {
    self.state().requests.get(collection).copied().unwrap_or_default()
  }

  /// Subscriptions whose subscriber is still around.
  #[must_use]
  pub fn live_subscriptions(&self) -> usize {
    let mut state = self.state();
    state.prune();
    state.listeners.len()
  }
}

impl State {
  fn check(filter: &Filter) -> Result<(), StoreError> {
    match filter {
      Filter::IdIn(ids) if ids.is_empty() => Err(StoreError::InvalidArgument(
        "an id-set filter needs at least one id".to_string(),
      )),
      Filter::IdIn(ids) if ids.len() > MAX_IDS_PER_QUERY => Err(StoreError::InvalidArgument(
        format!("an id-set filter takes at most {MAX_IDS_PER_QUERY} ids, got {}", ids.len()),
      )),
      _ => Ok(()),
    }
  }

  fn is_denied(&self, collection: &Arc<str>, id: &Id) -> bool {
    !self.denied.is_empty() && self.denied.contains(&DocRef::new(collection.clone(), id.clone()))
  }

  fn available(&self) -> Result<(), StoreError> {
    self
      .outage
      .as_ref()
      .map_or(Ok(()), |reason| Err(StoreError::Unavailable(reason.clone())))
  }

  fn count_request(&mut self, collection: &str) {
    *self.requests.entry(Arc::from(collection)).or_default() += 1;
  }

  fn snapshot(&self, collection: &str, filter: &Filter) -> Snapshot {
    self.available()?;
    let collection: Arc<str> = Arc::from(collection);
    let docs = self.collections.get(&collection);
    let document = |id: &Id, fields: &Fields| Document {
      id: id.clone(),
      fields: fields.clone(),
    };

    match filter {
      Filter::All => {
        let Some(docs) = docs else {
          return Ok(Vec::new());
        };
        if docs.keys().any(|id| self.is_denied(&collection, id)) {
          return Err(StoreError::PermissionDenied);
        }
        Ok(docs.iter().map(|(id, fields)| document(id, fields)).collect())
      }
      Filter::IdIn(ids) => {
        if ids.iter().any(|id| self.is_denied(&collection, id)) {
          return Err(StoreError::PermissionDenied);
        }
        Ok(
          ids
            .iter()
            .filter_map(|id| docs?.get_key_value(id))
            .map(|(id, fields)| document(id, fields))
            .collect(),
        )
      }
    }
  }

  fn write(&mut self, doc: &DocRef, fields: Fields, mode: SetMode) {
    let docs = self.collections.entry(doc.collection.clone()).or_default();
    match (mode, docs.get_mut(&doc.id)) {
      (SetMode::Merge, Some(existing)) => existing.extend(fields),
      _ => {
        docs.insert(doc.id.clone(), fields);
      }
    }
  }

  fn prune(&mut self) {
    self.listeners.retain(|l| !l.sender.is_closed());
  }

  /// Sends fresh snapshots to the subscribers of `collection`; only to
  /// those whose filter covers `id` when one is given.
  fn notify(&mut self, collection: &str, id: Option<&str>) {
    self.prune();
    for listener in &self.listeners {
      let affected = &*listener.collection == collection
        && id.map_or(true, |id| listener.filter.matches(id));
      if affected {
        listener
          .sender
          .deliver(self.snapshot(&listener.collection, &listener.filter));
      }
    }
  }

  fn notify_all(&mut self) {
    self.prune();
    for listener in &self.listeners {
      listener
        .sender
        .deliver(self.snapshot(&listener.collection, &listener.filter));
    }
  }
}

impl DocumentStore for MemoryStore {
  async fn get(&self, doc: &DocRef) -> Loadable<Document> {
    let state = self.state();
    state.available()?;
    if state.is_denied(&doc.collection, &doc.id) {
      return Err(StoreError::PermissionDenied);
    }
    Ok(
      state
        .collections
        .get(&doc.collection)
        .and_then(|docs| docs.get(&doc.id))
        .map(|fields| Document {
          id: doc.id.clone(),
          fields: fields.clone(),
        }),
    )
  }

  async fn set(&self, doc: &DocRef, fields: Fields, mode: SetMode) -> Result<(), StoreError> {
    let mut state = self.state();
    state.available()?;
    if state.is_denied(&doc.collection, &doc.id) {
      return Err(StoreError::PermissionDenied);
    }
    state.write(doc, fields, mode);
    state.notify(&doc.collection, Some(&*doc.id));
    Ok(())
  }

  async fn array_union(&self, doc: &DocRef, field: &str, ids: &[Id]) -> Result<(), StoreError> {
    let mut state = self.state();
    state.available()?;
    if state.is_denied(&doc.collection, &doc.id) {
      return Err(StoreError::PermissionDenied);
    }

    let fields = state
      .collections
      .entry(doc.collection.clone())
      .or_default()
      .entry(doc.id.clone())
      .or_default();
    let listed = fields.entry(field.to_string()).or_insert(Value::Null);
    let mut added = false;
    if !(listed.is_object() || listed.is_array()) {
      *listed = Value::Array(Vec::new());
      added = true;
    }
    match listed {
      Value::Object(map) => {
        for id in ids {
          if !map.contains_key(&**id) {
            map.insert(id.to_string(), Value::Bool(true));
            added = true;
          }
        }
      }
      Value::Array(items) => {
        for id in ids {
          if !items.iter().any(|item| item.as_str() == Some(&**id)) {
            items.push(Value::from(&**id));
            added = true;
          }
        }
      }
      _ => {}
    }

    if added {
      state.notify(&doc.collection, Some(&*doc.id));
    }
    Ok(())
  }

  async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
    let mut state = self.state();
    state.count_request(collection);
    State::check(filter)?;
    state.snapshot(collection, filter)
  }

  fn subscribe(&self, collection: &str, filter: Filter) -> Result<Subscription, StoreError> {
    let mut state = self.state();
    state.count_request(collection);
    State::check(&filter)?;

    let (sender, subscription) = Subscription::channel();
    sender.deliver(state.snapshot(collection, &filter));
    state.listeners.push(Listener {
      collection: Arc::from(collection),
      filter,
      sender,
    });
    Ok(subscription)
  }
}
