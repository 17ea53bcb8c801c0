use std::collections::{hash_set, HashSet};

use utils::Id;

/// The current user's friends, for constant time membership tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendSet(HashSet<Id>);
impl FriendSet {
  #[must_use]
  pub fn contains(&self, candidate: &str) -> bool {
    self.0.contains(candidate)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> hash_set::Iter<'_, Id> {
    self.0.iter()
  }
}
impl<'a> IntoIterator for &'a FriendSet {
  type Item = &'a Id;
  type IntoIter = hash_set::Iter<'a, Id>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}
impl FromIterator<Id> for FriendSet {
  fn from_iter<I: IntoIterator<Item = Id>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}
