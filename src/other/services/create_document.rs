//! Creation of watchlists, categories and rooms from their blank templates.

use anyhow::{bail, Context};
use chrono::{SecondsFormat, Utc};
use repositories::{membership, DocRef, DocumentStore, SetMode};
use serde_json::{json, Value};
use tracing::{event, Level};
use types::{entities::Visibility, Fields};
use utils::{
  constants::{CATEGORIES, ROOMS, WATCHLISTS},
  Id,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
  Watchlist,
  Category,
  Room,
}
impl Template {
  #[must_use]
  pub const fn collection(self) -> &'static str {
    match self {
      Self::Watchlist => WATCHLISTS,
      Self::Category => CATEGORIES,
      Self::Room => ROOMS,
    }
  }

  /// The fields a new document starts with before the author fills them in.
  #[must_use]
  pub fn defaults(self) -> Fields {
    let blank = match self {
      Self::Watchlist => json!({
        "title": "",
        "description": "",
        "titles": [],
        "visibility": Visibility::default().as_str(),
      }),
      Self::Category => json!({ "name": "", "description": "" }),
      Self::Room => json!({ "name": "", "members": [], "description": "" }),
    };
    match blank {
      Value::Object(fields) => fields,
      _ => Fields::new(),
    }
  }
}

/// Stores a new document built from `template` and `input`, then lists it
/// among the author's own documents of that kind.
///
/// `input` is laid over the template's defaults. `createdBy` and `createdAt`
/// are always stamped here, whatever `input` says.
///
/// # Returns
/// The id of the new document.
///
/// # Errors
/// When nobody is signed in, or when either write fails. A failed membership
/// write leaves the document stored but unlisted.
pub async fn act<S: DocumentStore>(
  store: &S,
  author: Option<&Id>,
  template: Template,
  input: Fields,
) -> anyhow::Result<Id> {
  let Some(author) = author else {
    bail!("You must be logged in to perform this action");
  };

  let mut fields = template.defaults();
  fields.extend(input);
  fields.insert("createdBy".into(), Value::from(&**author));
  fields.insert(
    "createdAt".into(),
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
  );

  let collection = template.collection();
  let id: Id = Uuid::new_v4().simple().to_string().into();
  let doc = DocRef::new(collection, id.clone());
  store
    .set(&doc, fields, SetMode::Merge)
    .await
    .with_context(|| format!("Failed to create {doc}"))?;
  membership::add(store, author, collection, &id)
    .await
    .with_context(|| format!("Created {doc} but failed to list it for {author}"))?;

  event!(Level::INFO, "{author} created {doc}.");
  Ok(id)
}

#[cfg(test)]
mod tests {
  use repositories::memory::MemoryStore;
  use types::entities::{Category, Room, Watchlist};

  use super::*;

  fn fields(value: Value) -> Fields {
    let Value::Object(fields) = value else {
      unreachable!()
    };
    fields
  }

  async fn stored(store: &MemoryStore, collection: &str, id: &Id) -> Fields {
    store
      .get(&DocRef::new(collection, id.clone()))
      .await
      .ok()
      .flatten()
      .map(|d| d.fields)
      .unwrap_or_else(|| panic!("{collection}/{id} was not stored"))
  }

  async fn listed(store: &MemoryStore, uid: &Id, collection: &str) -> Vec<Id> {
    store
      .get(&membership::doc_ref(uid, collection))
      .await
      .ok()
      .flatten()
      .map(|d| membership::ids_of(&d, collection))
      .unwrap_or_default()
  }

  #[tokio::test]
  async fn creates_and_lists_a_watchlist() {
    let store = MemoryStore::default();
    let me = Id::from("u1");

    let id = act(
      &store,
      Some(&me),
      Template::Watchlist,
      fields(json!({ "title": "Weekend", "titles": "Alien, Heat" })),
    )
    .await
    .unwrap_or_else(|e| panic!("{e:#}"));

    let watchlist = Watchlist::from_document(id.clone(), &stored(&store, WATCHLISTS, &id).await);
    assert_eq!(watchlist.title, "Weekend");
    assert_eq!(watchlist.titles, ["Alien", "Heat"]);
    assert_eq!(watchlist.owner_id, Some(me.clone()));
    assert_eq!(watchlist.visibility, Visibility::Private);
    assert!(watchlist.created_at.is_some());
    assert_eq!(listed(&store, &me, WATCHLISTS).await, [id]);
  }

  #[tokio::test]
  async fn stamps_author_over_input() {
    let store = MemoryStore::default();
    let me = Id::from("u1");

    let id = act(
      &store,
      Some(&me),
      Template::Room,
      fields(json!({ "name": "Film club", "members": ["u2"], "createdBy": "someone-else" })),
    )
    .await
    .unwrap_or_else(|e| panic!("{e:#}"));

    let room = Room::from_document(id.clone(), &stored(&store, ROOMS, &id).await);
    assert_eq!(room.name, "Film club");
    assert_eq!(room.members, [Id::from("u2")]);
    assert_eq!(room.created_by, Some(me));
  }

  #[tokio::test]
  async fn appends_to_existing_membership() {
    let store = MemoryStore::default();
    let me = Id::from("u1");

    let first = act(&store, Some(&me), Template::Category, Fields::new())
      .await
      .unwrap_or_else(|e| panic!("{e:#}"));
    let second = act(&store, Some(&me), Template::Category, Fields::new())
      .await
      .unwrap_or_else(|e| panic!("{e:#}"));

    assert_ne!(first, second);
    assert_eq!(listed(&store, &me, CATEGORIES).await, [first.clone(), second]);
    let category = Category::from_document(first.clone(), &stored(&store, CATEGORIES, &first).await);
    assert_eq!(category.name, "");
  }

  #[tokio::test]
  async fn requires_a_signed_in_author() {
    let store = MemoryStore::default();

    let result = act(&store, None, Template::Watchlist, Fields::new()).await;

    assert!(result.is_err());
    assert_eq!(store.requests(WATCHLISTS), 0);
  }
}
