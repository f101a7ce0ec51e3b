//! Relationship graph: directed follow edges between profiles.
//!
//! The edge set is one relation read in two directions — "following" is the
//! forward view, "followers" the reverse.  Following is an idempotent
//! toggle: following an already-followed profile unfollows it.  Only edge
//! creation fans out a notification; removal is silent.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::logging;
use crate::notify;
use crate::storage::{Storage, StorageError, UserRow};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Resulting state of a follow toggle, reported back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowToggle {
    Followed,
    Unfollowed,
}

/// Toggle the follow edge from `actor_id` to `target_id`.
///
/// Self-follow is rejected outright.  If the edge exists it is removed;
/// otherwise it is created and the follow notification dispatched.
pub fn toggle_follow(
    storage: &Storage,
    actor_id: i64,
    target_id: i64,
) -> Result<FollowToggle, StorageError> {
    if actor_id == target_id {
        return Err(StorageError::InvalidOperation(
            "cannot follow yourself".to_string(),
        ));
    }

    let actor = storage
        .get_user(actor_id)?
        .ok_or_else(|| StorageError::NotFound(format!("user {actor_id}")))?;
    let target = storage
        .get_user(target_id)?
        .ok_or_else(|| StorageError::NotFound(format!("user {target_id}")))?;

    if storage.has_follow(actor_id, target_id)? {
        storage.delete_follow(actor_id, target_id)?;
        crate::mlog!(
            "follow: {} -> {} removed",
            logging::user_tag(&actor.username),
            logging::user_tag(&target.username)
        );
        Ok(FollowToggle::Unfollowed)
    } else {
        let now = now_secs();
        storage.insert_follow(actor_id, target_id, now)?;
        crate::mlog!(
            "follow: {} -> {} created",
            logging::user_tag(&actor.username),
            logging::user_tag(&target.username)
        );
        notify::follow_created(storage, &actor, &target, now);
        Ok(FollowToggle::Followed)
    }
}

/// Users that `user_id` follows.
pub fn following(storage: &Storage, user_id: i64) -> Result<Vec<UserRow>, StorageError> {
    storage
        .get_user(user_id)?
        .ok_or_else(|| StorageError::NotFound(format!("user {user_id}")))?;
    storage.list_following(user_id)
}

/// Users following `user_id`.
pub fn followers(storage: &Storage, user_id: i64) -> Result<Vec<UserRow>, StorageError> {
    storage
        .get_user(user_id)?
        .ok_or_else(|| StorageError::NotFound(format!("user {user_id}")))?;
    storage.list_followers(user_id)
}
