use services::jobs::session_watcher::Session;
use session::IdentityProvider;
use tokio::signal;
use tracing::{event, Level};

async fn before_shutdown<P: IdentityProvider>(identity: &P, session: &Session) {
  event!(
    Level::INFO,
    "The app is shutting down! Running shutdown routines..."
  );
  if let Err(e) = identity.sign_out().await {
    event!(Level::WARN, "(Notice) Failed to sign out: {e}");
  }
  session.shutdown();
}

pub async fn with_graceful_shutdown<P: IdentityProvider>(identity: &P, session: &Session) {
  shutdown_signal().await;
  before_shutdown(identity, session).await;
}

/// # Panics
///
/// Will panic if fails to install any of the signal handlers.
async fn shutdown_signal() {
  let ctrl_c = async {
    signal::ctrl_c()
      .await
      .unwrap_or_else(|e| panic!("Failed to install Ctrl+C handler! {e}"));
  };

  #[cfg(unix)]
  let term_or_int = async {
    signal::unix::signal(signal::unix::SignalKind::terminate())
      .unwrap_or_else(|e| panic!("Failed to install SIGTERM handler! {e}"))
      .recv()
      .await;
  };

  #[cfg(windows)]
  let term_or_int = async {
    signal::windows::ctrl_close()
      .unwrap_or_else(|e| panic!("Failed to install Windows SIGINT handler! {e}"))
      .recv()
      .await;
  };

  tokio::select! {
    () = ctrl_c => {},
    () = term_or_int => {},
  }
}
