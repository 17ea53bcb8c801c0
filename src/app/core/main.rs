mod on_shutdown;
mod reporter;

use std::sync::Arc;

use environment::{
  SEED_FILE, SIGN_IN_AS, SIGN_IN_DISPLAY_NAME, SIGN_IN_EMAIL, SIGN_IN_PHOTO_URL, WORKSPACE_DIR,
};
use on_shutdown::with_graceful_shutdown;
use repositories::memory::MemoryStore;
use services::jobs::session_watcher::Session;
use session::{IdentityProvider, LocalIdentity};
use tracing::{event, Level};
use types::entities::AuthUser;
use utils::Id;

#[cfg(unix)]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[tokio::main]
async fn main() {
  dotenv::from_filename(WORKSPACE_DIR.join(".env")).ok();
  // Logging - The variables are needed for the lifetime of the program
  let _log_guards = utils::init_logging().await;

  let store = Arc::new(load_store().await);
  let directory = services::list_users::act(&*store).await;
  event!(
    Level::INFO,
    "Application starting with {} known users!",
    directory.len()
  );

  let identity = LocalIdentity::new(Some(AuthUser {
    display_name: SIGN_IN_DISPLAY_NAME.map(String::from),
    email: SIGN_IN_EMAIL.map(String::from),
    photo_url: SIGN_IN_PHOTO_URL.map(String::from),
    ..AuthUser::new(Id::from(*SIGN_IN_AS))
  }));
  let session = Session::begin(store, &identity);
  tokio::spawn(reporter::act(session.watch()));

  if let Err(e) = identity.sign_in().await {
    event!(Level::ERROR, "Failed to sign in! Error: {e}");
  }

  with_graceful_shutdown(&identity, &session).await;
}

/// # Panics
///
/// When the seed file is missing or malformed.
async fn load_store() -> MemoryStore {
  let path = *SEED_FILE;
  event!(Level::INFO, "Loading documents from {}...", path.display());

  let raw = tokio::fs::read_to_string(path)
    .await
    .unwrap_or_else(|e| panic!("Failed to read {}! Error: {e}", path.display()));
  let seed: serde_json::Value = serde_json::from_str(&raw)
    .unwrap_or_else(|e| panic!("{} is not valid JSON! Error: {e}", path.display()));
  MemoryStore::from_seed(&seed)
    .unwrap_or_else(|e| panic!("Failed to seed the store! Error: {e}"))
}
