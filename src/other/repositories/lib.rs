pub mod membership;
pub mod memory;
pub mod user;

mod document;
pub use document::*;

mod subscription;
pub use subscription::*;

mod query_by_id_set;
pub use query_by_id_set::*;

mod watch_id_set;
pub use watch_id_set::*;

use std::future::Future;

use thiserror::Error as ThisError;
use utils::Id;

/// # Loadable<T>
/// Represents the type of a T that can be loaded from the
/// store, where the read can either fail, resolve to None
/// or resolve to Some(T).
///
/// ## Variants
/// - Err(e)           read failed
/// - Ok(None)         T not found
/// - Ok(Some(T))      T found
pub type Loadable<T> = Result<Option<T>, StoreError>;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
  #[error("document not found")]
  NotFound,
  #[error("permission denied")]
  PermissionDenied,
  #[error("store unavailable: {0}")]
  Unavailable(String),
  #[error("invalid argument: {0}")]
  InvalidArgument(String),
  #[error("malformed document: {0}")]
  Malformed(String),
}
impl StoreError {
  /// Errors after which the requested documents are simply not there as far
  /// as the caller is concerned.
  #[must_use]
  pub const fn is_absence(&self) -> bool {
    matches!(self, Self::NotFound | Self::PermissionDenied)
  }
}

/// A remote document database.
///
/// Documents live in collections addressed by slash separated paths
/// (`users`, `users/{uid}/private`, ...). Live subscriptions deliver the
/// complete set of matching documents on every change, never deltas.
pub trait DocumentStore: Send + Sync + 'static {
  /// Point read by key.
  fn get(&self, doc: &DocRef) -> impl Future<Output = Loadable<Document>> + Send;

  /// Point write by key.
  fn set(
    &self,
    doc: &DocRef,
    fields: types::Fields,
    mode: SetMode,
  ) -> impl Future<Output = Result<(), StoreError>> + Send;

  /// Atomically adds every id of `ids` that `field` does not list yet,
  /// creating the document or the field as needed. A field holding a map
  /// gains the missing ids as keys; any other field becomes a sequence.
  fn array_union(
    &self,
    doc: &DocRef,
    field: &str,
    ids: &[Id],
  ) -> impl Future<Output = Result<(), StoreError>> + Send;

  /// One-shot query. An id-set filter naming no ids, or more than
  /// [`utils::constants::MAX_IDS_PER_QUERY`], is rejected; use
  /// [`query_by_id_set`] to chunk.
  fn query(
    &self,
    collection: &str,
    filter: &Filter,
  ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

  /// Opens a live subscription. The first snapshot is delivered as soon as
  /// the store has it. Dropping the [`Subscription`] unsubscribes.
  ///
  /// # Errors
  /// Fails on filters [`DocumentStore::query`] would reject.
  fn subscribe(&self, collection: &str, filter: Filter) -> Result<Subscription, StoreError>;
}
