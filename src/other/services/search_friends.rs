use types::entities::UserProfile;

/// Friends whose display name or email contains `query`, ignoring case. A
/// blank query matches everybody.
#[must_use]
pub fn act<'a>(profiles: &'a [UserProfile], query: &str) -> Vec<&'a UserProfile> {
  let query = query.trim().to_lowercase();
  if query.is_empty() {
    return profiles.iter().collect();
  }

  let matches = |field: Option<&String>| field.is_some_and(|f| f.to_lowercase().contains(&query));
  profiles
    .iter()
    .filter(|p| matches(p.display_name.as_ref()) || matches(p.email.as_ref()))
    .collect()
}
