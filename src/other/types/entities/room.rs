use chrono::{DateTime, Utc};
use utils::Id;

use crate::{normalize, Fields};

/// A group of users sharing watchlists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
  pub id: Id,
  pub name: String,
  pub description: String,
  pub members: Vec<Id>,
  pub created_by: Option<Id>,
  pub created_at: Option<DateTime<Utc>>,
}
impl Room {
  #[must_use]
  pub fn from_document(id: Id, fields: &Fields) -> Self {
    Self {
      id,
      name: normalize::text(fields, "name").unwrap_or_default(),
      description: normalize::text(fields, "description").unwrap_or_default(),
      members: normalize::unique(normalize::ids(fields.get("members"))),
      created_by: normalize::text(fields, "createdBy").map(Id::from),
      created_at: normalize::timestamp(fields, "createdAt"),
    }
  }
}
