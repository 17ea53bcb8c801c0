use std::sync::Arc;

mod canonicalize_unexistent;
use canonicalize_unexistent::canonicalize_unexistent;

mod init_logging;
pub use init_logging::*;

pub mod constants;

/// Opaque, cheaply clonable identifier of a stored document (user ids,
/// watchlist ids, ...).
pub type Id = Arc<str>;
