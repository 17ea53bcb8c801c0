use std::{fmt, sync::Arc};

use types::Fields;
use utils::Id;

/// One stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id: Id,
  pub fields: Fields,
}

/// Address of a document: its collection path and its id within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocRef {
  pub collection: Arc<str>,
  pub id: Id,
}
impl DocRef {
  #[must_use]
  pub fn new(collection: impl Into<Arc<str>>, id: impl Into<Id>) -> Self {
    Self {
      collection: collection.into(),
      id: id.into(),
    }
  }
}
impl fmt::Display for DocRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.collection, self.id)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
  All,
  /// Documents whose id is one of these.
  IdIn(Vec<Id>),
}
impl Filter {
  #[must_use]
  pub fn matches(&self, id: &str) -> bool {
    match self {
      Self::All => true,
      Self::IdIn(ids) => ids.iter().any(|candidate| &**candidate == id),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
  /// Overwrite the whole document.
  Replace,
  /// Overwrite only the given top-level fields, creating the document if
  /// needed.
  Merge,
}
