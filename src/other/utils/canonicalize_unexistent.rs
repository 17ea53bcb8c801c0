use std::path::{Path, PathBuf};

/// Canonicalizes the deepest existing ancestor of `path` and re-appends the
/// part that does not exist yet, so log directories can be created later.
#[must_use]
pub fn canonicalize_unexistent(path: &Path) -> Option<PathBuf> {
  path.ancestors().find_map(|ancestor| {
    let canonical = ancestor.canonicalize().ok()?;
    let missing = path.strip_prefix(ancestor).ok()?;
    Some(canonical.join(missing))
  })
}
