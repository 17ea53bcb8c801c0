use utils::Id;

use crate::{normalize, Fields};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
  pub id: Id,
  pub name: String,
  pub description: String,
}
impl Category {
  #[must_use]
  pub fn from_document(id: Id, fields: &Fields) -> Self {
    Self {
      id,
      name: normalize::text(fields, "name").unwrap_or_default(),
      description: normalize::text(fields, "description").unwrap_or_default(),
    }
  }
}
