mod auth_user;
mod category;
mod room;
mod user_profile;
mod watchlist;

pub use auth_user::AuthUser;
pub use category::Category;
pub use room::Room;
pub use user_profile::{FriendEntry, UserProfile};
pub use watchlist::{Visibility, Watchlist, UNTITLED};
