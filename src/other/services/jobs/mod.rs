pub mod session_watcher;
