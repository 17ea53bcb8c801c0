pub mod create_document;
pub mod fetch_friends_profiles;
pub mod jobs;
pub mod list_users;
pub mod resolve_friend_ids;
pub mod search_friends;
pub mod subscribe_friends_watchlists;
pub mod subscribe_my_watchlists;
pub mod sync_profile;

mod friend_set;
pub use friend_set::FriendSet;

mod resolver;
pub use resolver::{Resolver, View};

mod subscription;
pub use subscription::SubscriptionHandle;

use repositories::Document;
use types::entities::Watchlist;

fn to_watchlists(documents: Vec<Document>) -> Vec<Watchlist> {
  documents
    .into_iter()
    .map(|d| Watchlist::from_document(d.id, &d.fields))
    .collect()
}
