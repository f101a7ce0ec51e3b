//! Content store: posts, likes, and threaded comments.
//!
//! Posts are owned by their author; only the author may edit or delete
//! them.  Likes are a set (no duplicates) with toggle semantics.  Comments
//! form a reply tree keyed by parent id.  Mutations that warrant fan-out
//! (like added, comment created) invoke the dispatcher as their final step.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::logging;
use crate::notify;
use crate::storage::{CommentRow, PostRow, Storage, StorageError};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn none_if_blank(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

/// Resulting state of a like toggle, reported back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub like_count: u32,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Create a post.  Caption and image reference are both optional.
pub fn create_post(
    storage: &Storage,
    author_id: i64,
    caption: Option<String>,
    image_ref: Option<String>,
) -> Result<PostRow, StorageError> {
    let author = storage
        .get_user(author_id)?
        .ok_or_else(|| StorageError::NotFound(format!("user {author_id}")))?;

    let now = now_secs();
    let mut row = PostRow {
        id: 0,
        author_id,
        caption: none_if_blank(caption),
        image_ref: none_if_blank(image_ref),
        hidden: false,
        created_at: now,
        updated_at: now,
    };
    row.id = storage.insert_post(&row)?;
    crate::mlog!(
        "post: {} created post {}",
        logging::user_tag(&author.username),
        row.id
    );
    Ok(row)
}

/// Update a post's caption.  Author only.
pub fn update_post(
    storage: &Storage,
    post_id: i64,
    actor_id: i64,
    caption: Option<String>,
) -> Result<PostRow, StorageError> {
    let post = storage
        .get_post(post_id)?
        .ok_or_else(|| StorageError::NotFound(format!("post {post_id}")))?;
    if post.author_id != actor_id {
        return Err(StorageError::Forbidden(
            "only the author may edit this post".to_string(),
        ));
    }

    let caption = none_if_blank(caption);
    storage.update_post_caption(post_id, caption.as_deref(), now_secs())?;
    storage
        .get_post(post_id)?
        .ok_or_else(|| StorageError::NotFound(format!("post {post_id}")))
}

/// Delete a post.  Author only.  Comments, likes, and notifications that
/// reference it cascade.
pub fn delete_post(storage: &Storage, post_id: i64, actor_id: i64) -> Result<(), StorageError> {
    let post = storage
        .get_post(post_id)?
        .ok_or_else(|| StorageError::NotFound(format!("post {post_id}")))?;
    if post.author_id != actor_id {
        return Err(StorageError::Forbidden(
            "only the author may delete this post".to_string(),
        ));
    }
    storage.delete_post(post_id)?;
    Ok(())
}

/// Flip the moderation visibility flag on a post.
pub fn set_post_hidden(
    storage: &Storage,
    post_id: i64,
    hidden: bool,
) -> Result<PostRow, StorageError> {
    if !storage.set_post_hidden(post_id, hidden)? {
        return Err(StorageError::NotFound(format!("post {post_id}")));
    }
    crate::mlog!(
        "moderation: post {} {}",
        post_id,
        if hidden { "hidden" } else { "unhidden" }
    );
    storage
        .get_post(post_id)?
        .ok_or_else(|| StorageError::NotFound(format!("post {post_id}")))
}

// ---------------------------------------------------------------------------
// Likes
// ---------------------------------------------------------------------------

/// Toggle a like on a post.  Adding a like dispatches a notification;
/// removing one dispatches nothing and does not retract the earlier
/// notification.
pub fn toggle_like(
    storage: &Storage,
    post_id: i64,
    user_id: i64,
) -> Result<LikeToggle, StorageError> {
    let post = storage
        .get_post(post_id)?
        .ok_or_else(|| StorageError::NotFound(format!("post {post_id}")))?;
    let user = storage
        .get_user(user_id)?
        .ok_or_else(|| StorageError::NotFound(format!("user {user_id}")))?;

    if storage.has_like(post_id, user_id)? {
        storage.delete_like(post_id, user_id)?;
        Ok(LikeToggle {
            liked: false,
            like_count: storage.count_likes(post_id)?,
        })
    } else {
        let now = now_secs();
        storage.insert_like(post_id, user_id, now)?;
        notify::like_added(storage, &post, &user, now);
        Ok(LikeToggle {
            liked: true,
            like_count: storage.count_likes(post_id)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// Create a comment on a post, optionally as a reply to another comment on
/// the same post.  Dispatches a notification to the post author.
pub fn create_comment(
    storage: &Storage,
    post_id: i64,
    author_id: i64,
    body: &str,
    parent_id: Option<i64>,
) -> Result<CommentRow, StorageError> {
    if body.trim().is_empty() {
        return Err(StorageError::InvalidOperation(
            "comment body cannot be empty".to_string(),
        ));
    }

    let post = storage
        .get_post(post_id)?
        .ok_or_else(|| StorageError::NotFound(format!("post {post_id}")))?;
    let author = storage
        .get_user(author_id)?
        .ok_or_else(|| StorageError::NotFound(format!("user {author_id}")))?;

    if let Some(pid) = parent_id {
        let parent = storage
            .get_comment(pid)?
            .ok_or_else(|| StorageError::NotFound(format!("comment {pid}")))?;
        if parent.post_id != post_id {
            return Err(StorageError::InvalidOperation(
                "parent comment belongs to a different post".to_string(),
            ));
        }
    }

    let now = now_secs();
    let mut row = CommentRow {
        id: 0,
        post_id,
        author_id,
        parent_id,
        body: body.trim().to_string(),
        created_at: now,
    };
    row.id = storage.insert_comment(&row)?;
    notify::comment_created(storage, &post, &row, &author, now);
    Ok(row)
}

/// Delete a comment.  Author only.  Child replies cascade.
pub fn delete_comment(
    storage: &Storage,
    comment_id: i64,
    actor_id: i64,
) -> Result<(), StorageError> {
    let comment = storage
        .get_comment(comment_id)?
        .ok_or_else(|| StorageError::NotFound(format!("comment {comment_id}")))?;
    if comment.author_id != actor_id {
        return Err(StorageError::Forbidden(
            "only the author may delete this comment".to_string(),
        ));
    }
    storage.delete_comment(comment_id)?;
    Ok(())
}
