/// The store refuses id-set queries naming more ids than this.
pub const MAX_IDS_PER_QUERY: usize = 30;

pub const USERS: &str = "users";
pub const WATCHLISTS: &str = "watchlists";
pub const CATEGORIES: &str = "categories";
pub const ROOMS: &str = "rooms";

/// Sub-collection of a user document holding their membership documents.
pub const PRIVATE: &str = "private";
