use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use tracing::level_filters::LevelFilter;

use crate::{owned_var_or, try_leak, var, var_opt, var_or_else};

lazy_static! {
  pub static ref STDOUT_LOG_SEVERITY: LevelFilter =
    owned_var_or("STDOUT_LOG_SEVERITY", LevelFilter::WARN);
  pub static ref LOG_DIRECTORY: &'static Path =
    var_or_else("LOG_DIRECTORY", || PathBuf::from("/var/log/watchlists"));
  pub static ref SEED_FILE: &'static Path =
    var_or_else("SEED_FILE", || WORKSPACE_DIR.join("seed.json"));
}

// Identity the binary signs in with. The display fields stand in for what a
// real identity provider would hand over on sign-in.
lazy_static! {
  pub static ref SIGN_IN_AS: &'static str = var::<String, _>("SIGN_IN_AS");
  pub static ref SIGN_IN_DISPLAY_NAME: Option<&'static str> =
    var_opt::<String, _>("SIGN_IN_DISPLAY_NAME");
  pub static ref SIGN_IN_EMAIL: Option<&'static str> = var_opt::<String, _>("SIGN_IN_EMAIL");
  pub static ref SIGN_IN_PHOTO_URL: Option<&'static str> =
    var_opt::<String, _>("SIGN_IN_PHOTO_URL");
}

#[cfg(debug_assertions)]
lazy_static! {
  pub static ref WORKSPACE_DIR: &'static Path = {
    let output = std::process::Command::new(env!("CARGO"))
      .arg("locate-project")
      .arg("--workspace")
      .arg("--message-format=plain")
      .output()
      .unwrap_or_else(|e| panic!("Failed to locate the workspace! Error: {e}"))
      .stdout;
    let cargo_path = Path::new(
      std::str::from_utf8(&output).unwrap_or_else(|e| panic!("Non UTF-8 workspace path: {e}")).trim(),
    );
    let workspace = cargo_path
      .parent()
      .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    try_leak(workspace).unwrap_or_else(|| panic!("Failed to leak workspace path!"))
  };
}

#[cfg(not(debug_assertions))]
lazy_static! {
  pub static ref WORKSPACE_DIR: &'static Path =
    try_leak(PathBuf::from(".")).unwrap_or_else(|| panic!("Failed to leak workspace path!"));
}
