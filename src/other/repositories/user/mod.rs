mod get;
pub use get::*;

mod get_all;
pub use get_all::*;

mod save;
pub use save::*;

mod merge_details;
pub use merge_details::*;

use utils::{constants::USERS, Id};

use crate::DocRef;

#[must_use]
pub fn doc_ref(uid: &Id) -> DocRef {
  DocRef::new(USERS, uid.clone())
}
