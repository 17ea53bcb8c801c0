//! Strongly-typed records the watchlist views are built from, and the
//! normalization layer that turns loosely-shaped stored documents into them.

pub mod entities;
pub mod normalize;

/// Raw fields of a stored document, exactly as the store hands them over.
pub type Fields = serde_json::Map<String, serde_json::Value>;
