//! Per-user membership documents: `users/{uid}/private/{collection}` lists
//! the ids of the documents of `collection` the user owns, under a field
//! named after the collection.

mod add;
pub use add::*;

use types::normalize;
use utils::{
  constants::{PRIVATE, USERS},
  Id,
};

use crate::{DocRef, Document};

#[must_use]
pub fn doc_ref(uid: &Id, collection: &str) -> DocRef {
  DocRef::new(format!("{USERS}/{uid}/{PRIVATE}"), collection)
}

/// The ids a membership document lists for `collection`, each once.
#[must_use]
pub fn ids_of(document: &Document, collection: &str) -> Vec<Id> {
  normalize::unique(normalize::membership_ids(document.fields.get(collection)))
}
