use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::{event, Level};
use utils::Id;

use crate::{normalize, Fields};

/// One entry of a user's friends list: who the friend is, and which of the
/// friend's watchlists this user chose to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendEntry {
  pub friend_id: Id,
  pub watchlist_ids: Vec<Id>,
}
impl FriendEntry {
  fn to_value(&self) -> Value {
    let watchlists: Vec<&str> = self.watchlist_ids.iter().map(|id| &**id).collect();
    json!({ "uid": &*self.friend_id, "watchlists": watchlists })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
  pub id: Id, // PK
  pub display_name: Option<String>,
  pub email: Option<String>,
  pub avatar_url: Option<String>,
  /// Unique by `friend_id`.
  pub friends: Vec<FriendEntry>,
}
impl UserProfile {
  #[must_use]
  pub const fn new(id: Id) -> Self {
    Self {
      id,
      display_name: None,
      email: None,
      avatar_url: None,
      friends: Vec::new(),
    }
  }

  #[must_use]
  pub fn from_document(id: Id, fields: &Fields) -> Self {
    Self {
      id,
      display_name: normalize::text(fields, "displayName"),
      email: normalize::text(fields, "email"),
      avatar_url: normalize::text(fields, "photoURL"),
      friends: friends(fields.get("friends")),
    }
  }

  /// The stored shape of this profile.
  #[must_use]
  pub fn to_fields(&self) -> Fields {
    let optional = |v: &Option<String>| v.clone().map_or(Value::Null, Value::String);

    let mut fields = Fields::new();
    fields.insert("uid".into(), Value::from(&*self.id));
    fields.insert("displayName".into(), optional(&self.display_name));
    fields.insert("email".into(), optional(&self.email));
    fields.insert("photoURL".into(), optional(&self.avatar_url));
    fields.insert(
      "friends".into(),
      Value::Array(self.friends.iter().map(FriendEntry::to_value).collect()),
    );
    fields
  }

  pub fn friend_ids(&self) -> impl Iterator<Item = &Id> + '_ {
    self.friends.iter().map(|f| &f.friend_id)
  }

  #[must_use]
  pub const fn friend_count(&self) -> usize {
    self.friends.len()
  }

  /// Every watchlist id followed through any friend, without repeats.
  #[must_use]
  pub fn friends_watchlist_ids(&self) -> Vec<Id> {
    normalize::unique(
      self
        .friends
        .iter()
        .flat_map(|f| f.watchlist_ids.iter().cloned()),
    )
  }
}

fn friends(value: Option<&Value>) -> Vec<FriendEntry> {
  let mut entries = Vec::new();
  if let Some(value) = value {
    collect_entries(value, &mut entries);
  }
  merge_duplicates(entries)
}

fn collect_entries(value: &Value, out: &mut Vec<FriendEntry>) {
  match value {
    Value::Array(items) => {
      for item in items {
        collect_entries(item, out);
      }
    }
    Value::Object(entry) => {
      let friend_ids = normalize::ids(entry.get("friendId").or_else(|| entry.get("uid")));
      if friend_ids.is_empty() {
        event!(Level::WARN, "(Notice) Friend entry without an id: {value}");
        return;
      }
      let watchlist_ids =
        normalize::ids(entry.get("watchlists").or_else(|| entry.get("watchlistIds")));
      out.extend(friend_ids.into_iter().map(|friend_id| FriendEntry {
        friend_id,
        watchlist_ids: watchlist_ids.clone(),
      }));
    }
    Value::String(id) if !id.is_empty() => out.push(FriendEntry {
      friend_id: Id::from(id.as_str()),
      watchlist_ids: Vec::new(),
    }),
    Value::Null => {}
    other => event!(Level::WARN, "(Notice) Ignoring malformed friend entry: {other}"),
  }
}

/// A friend listed more than once keeps its first position and the watchlists
/// of its last listing.
fn merge_duplicates(entries: Vec<FriendEntry>) -> Vec<FriendEntry> {
  let mut positions: HashMap<Id, usize> = HashMap::with_capacity(entries.len());
  let mut merged: Vec<FriendEntry> = Vec::with_capacity(entries.len());
  for entry in entries {
    if let Some(&at) = positions.get(&entry.friend_id) {
      event!(
        Level::DEBUG,
        "Friend {} is listed more than once, merging.",
        entry.friend_id
      );
      merged[at].watchlist_ids = entry.watchlist_ids;
    } else {
      positions.insert(entry.friend_id.clone(), merged.len());
      merged.push(entry);
    }
  }
  merged
}
