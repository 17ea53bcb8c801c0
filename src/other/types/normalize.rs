//! Field readers shared by every entity. None of them fail: a field of the
//! wrong shape is reported and replaced by its empty value.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{event, Level};
use utils::Id;

use crate::Fields;

/// Reads an optional text field. Blank strings count as absent.
#[must_use]
pub fn text(fields: &Fields, key: &str) -> Option<String> {
  match fields.get(key) {
    None | Some(Value::Null) => None,
    Some(Value::String(s)) if s.trim().is_empty() => None,
    Some(Value::String(s)) => Some(s.clone()),
    Some(other) => {
      event!(
        Level::WARN,
        "(Notice) Expected text in field {key}, got: {other}"
      );
      None
    }
  }
}

/// Normalizes the show/movie names of a watchlist.
///
/// A comma separated string is split into trimmed entries, a sequence is kept
/// as is, and anything else (including a missing field) yields no titles.
#[must_use]
pub fn titles(value: Option<&Value>) -> Vec<String> {
  match value {
    None | Some(Value::Null) => Vec::new(),
    Some(Value::String(joined)) => joined
      .split(',')
      .map(str::trim)
      .filter(|title| !title.is_empty())
      .map(String::from)
      .collect(),
    Some(Value::Array(items)) => items
      .iter()
      .filter_map(|item| match item {
        Value::String(title) => Some(title.clone()),
        Value::Number(n) => Some(n.to_string()),
        other => {
          event!(Level::WARN, "(Notice) Dropping unexpected title: {other}");
          None
        }
      })
      .collect(),
    Some(other) => {
      event!(
        Level::WARN,
        "(Notice) Titles are neither text nor a sequence: {other}"
      );
      Vec::new()
    }
  }
}

/// Collects every id found in `value`, flattening nested sequences.
#[must_use]
pub fn ids(value: Option<&Value>) -> Vec<Id> {
  let mut out = Vec::new();
  if let Some(value) = value {
    collect_ids(value, &mut out);
  }
  out
}

fn collect_ids(value: &Value, out: &mut Vec<Id>) {
  match value {
    Value::String(id) if id.is_empty() => {}
    Value::String(id) => out.push(Id::from(id.as_str())),
    Value::Array(items) => {
      for item in items {
        collect_ids(item, out);
      }
    }
    Value::Null => {}
    other => event!(Level::WARN, "(Notice) Ignoring non-id value: {other}"),
  }
}

/// Reads the ids listed by a membership document, which are stored either as
/// a sequence of ids or as a map keyed by id.
#[must_use]
pub fn membership_ids(value: Option<&Value>) -> Vec<Id> {
  match value {
    Some(Value::Object(map)) => map.keys().map(|id| Id::from(id.as_str())).collect(),
    Some(Value::Array(_)) => ids(value),
    None | Some(Value::Null) => Vec::new(),
    Some(other) => {
      event!(
        Level::WARN,
        "(Notice) Membership is neither a sequence nor a map: {other}"
      );
      Vec::new()
    }
  }
}

/// Reads an RFC 3339 timestamp.
#[must_use]
pub fn timestamp(fields: &Fields, key: &str) -> Option<DateTime<Utc>> {
  let raw = text(fields, key)?;
  match DateTime::parse_from_rfc3339(&raw) {
    Ok(parsed) => Some(parsed.with_timezone(&Utc)),
    Err(e) => {
      event!(
        Level::WARN,
        "(Notice) Invalid timestamp in field {key}: {raw:?} ({e})"
      );
      None
    }
  }
}

/// Drops repeated ids, keeping the first occurrence of each.
#[must_use]
pub fn unique(ids: impl IntoIterator<Item = Id>) -> Vec<Id> {
  let mut seen = HashSet::new();
  ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
