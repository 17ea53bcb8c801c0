use serde_json::Value;

use super::MemoryStore;
use crate::{DocRef, StoreError};

impl MemoryStore {
  /// Builds a store from `{ "<collection path>": { "<id>": { fields } } }`.
  ///
  /// # Errors
  /// When the seed does not have that shape.
  pub fn from_seed(seed: &Value) -> Result<Self, StoreError> {
    let Value::Object(collections) = seed else {
      return Err(StoreError::Malformed(
        "a seed must map collection paths to documents".to_string(),
      ));
    };

    let store = Self::default();
    for (collection, documents) in collections {
      let Value::Object(documents) = documents else {
        return Err(StoreError::Malformed(format!(
          "collection {collection} must map ids to documents"
        )));
      };
      for (id, fields) in documents {
        if !fields.is_object() {
          return Err(StoreError::Malformed(format!(
            "{collection}/{id} is not an object"
          )));
        }
        store.insert(&DocRef::new(collection.as_str(), id.as_str()), fields.clone());
      }
    }
    Ok(store)
  }
}
