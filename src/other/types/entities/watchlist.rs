use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{event, Level};
use utils::Id;

use crate::{normalize, Fields};

/// Shown in place of a missing watchlist title.
pub const UNTITLED: &str = "Untitled";

/// Who may see a watchlist besides its owner. Enforced by the store's access
/// rules, never here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  #[default]
  Private,
  Public,
  Friends,
}
impl Visibility {
  fn from_value(value: Option<&Value>) -> Self {
    match value {
      None | Some(Value::Null) => Self::default(),
      Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
        event!(
          Level::WARN,
          "(Notice) Unknown visibility {raw}, assuming private. ({e})"
        );
        Self::default()
      }),
    }
  }

  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Private => "private",
      Self::Public => "public",
      Self::Friends => "friends",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
  pub id: Id, // PK
  pub title: String,
  pub description: String,
  pub titles: Vec<String>,
  /// `createdBy` of the stored document.
  pub owner_id: Option<Id>,
  pub visibility: Visibility,
  pub created_at: Option<DateTime<Utc>>,
}
impl Watchlist {
  #[must_use]
  pub fn from_document(id: Id, fields: &Fields) -> Self {
    Self {
      id,
      title: normalize::text(fields, "title").unwrap_or_else(|| UNTITLED.to_string()),
      description: normalize::text(fields, "description").unwrap_or_default(),
      titles: normalize::titles(fields.get("titles")),
      owner_id: normalize::text(fields, "createdBy").map(Id::from),
      visibility: Visibility::from_value(fields.get("visibility")),
      created_at: normalize::timestamp(fields, "createdAt"),
    }
  }
}
