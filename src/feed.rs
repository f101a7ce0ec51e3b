//! Feed assembly: home feed, trending, and sort modes.
//!
//! Read-only over the follow graph and content store — nothing here is
//! precomputed or materialized; every call queries current state.

use crate::storage::{PostRow, Storage, StorageError};

/// Caller-selectable ordering over the full post collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrder {
    /// Newest first.
    Recent,
    /// Most liked first, recency as tie-break.
    Popular,
}

impl PostOrder {
    /// Parse a `sort` query parameter; anything unrecognized falls back to
    /// recency.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("popular") => PostOrder::Popular,
            _ => PostOrder::Recent,
        }
    }
}

/// The home feed: posts authored by everyone `user_id` follows, newest
/// first.  An empty following set yields an empty feed.
pub fn build_feed(
    storage: &Storage,
    user_id: i64,
    limit: u32,
) -> Result<Vec<PostRow>, StorageError> {
    storage
        .get_user(user_id)?
        .ok_or_else(|| StorageError::NotFound(format!("user {user_id}")))?;
    storage.list_feed_posts(user_id, limit)
}

/// Global ranking by like count, tie-broken by recency.  Ignores the follow
/// graph entirely and needs no caller identity.
pub fn trending(storage: &Storage, limit: u32) -> Result<Vec<PostRow>, StorageError> {
    storage.list_posts_popular(limit)
}

/// The full visible post collection in the requested order.
pub fn list_posts(
    storage: &Storage,
    order: PostOrder,
    limit: u32,
) -> Result<Vec<PostRow>, StorageError> {
    match order {
        PostOrder::Recent => storage.list_posts_recent(limit),
        PostOrder::Popular => storage.list_posts_popular(limit),
    }
}
