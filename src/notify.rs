//! Notification dispatch and inbox.
//!
//! The dispatch functions are called explicitly at the end of each mutating
//! operation (like added, comment created, follow edge created) — there is
//! no implicit event machinery.  Each one suppresses self-notification and
//! swallows storage failures after logging them: notifications are
//! best-effort and must never fail the mutation that triggered them.
//!
//! The inbox side is the read model: listing, read-flag updates, and the
//! unread counter, always scoped to the recipient.

use crate::logging;
use crate::storage::{CommentRow, NotificationRow, PostRow, Storage, StorageError, UserRow};

/// The fixed set of notification kinds.
///
/// `Mention` is part of the vocabulary but currently has no dispatch
/// trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    Mention,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
            NotificationKind::Follow => "follow",
            NotificationKind::Mention => "mention",
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch (write side)
// ---------------------------------------------------------------------------

/// A like landed on `post`.  Notifies the post author unless they liked
/// their own post.
pub fn like_added(storage: &Storage, post: &PostRow, liker: &UserRow, now: u64) {
    if liker.id == post.author_id {
        return;
    }
    let row = NotificationRow {
        id: 0,
        recipient_id: post.author_id,
        sender_id: Some(liker.id),
        kind: NotificationKind::Like.as_str().to_string(),
        message: format!("{} liked your post", liker.username),
        is_read: false,
        post_id: Some(post.id),
        comment_id: None,
        created_at: now,
    };
    if let Err(e) = storage.insert_notification(&row) {
        crate::mlog!(
            "notify: dropping like notification for post {}: {}",
            post.id,
            e
        );
    }
}

/// A comment landed on `post`.  Notifies the post author unless they
/// commented on their own post.
pub fn comment_created(
    storage: &Storage,
    post: &PostRow,
    comment: &CommentRow,
    author: &UserRow,
    now: u64,
) {
    if author.id == post.author_id {
        return;
    }
    let row = NotificationRow {
        id: 0,
        recipient_id: post.author_id,
        sender_id: Some(author.id),
        kind: NotificationKind::Comment.as_str().to_string(),
        message: format!("{} commented on your post", author.username),
        is_read: false,
        post_id: Some(post.id),
        comment_id: Some(comment.id),
        created_at: now,
    };
    if let Err(e) = storage.insert_notification(&row) {
        crate::mlog!(
            "notify: dropping comment notification for post {}: {}",
            post.id,
            e
        );
    }
}

/// A follow edge was created.  Notifies the target.  The self-follow guard
/// upstream makes actor == target unreachable here, but the suppression
/// rule is applied uniformly anyway.
pub fn follow_created(storage: &Storage, actor: &UserRow, target: &UserRow, now: u64) {
    if actor.id == target.id {
        return;
    }
    let row = NotificationRow {
        id: 0,
        recipient_id: target.id,
        sender_id: Some(actor.id),
        kind: NotificationKind::Follow.as_str().to_string(),
        message: format!("{} started following you", actor.username),
        is_read: false,
        post_id: None,
        comment_id: None,
        created_at: now,
    };
    if let Err(e) = storage.insert_notification(&row) {
        crate::mlog!(
            "notify: dropping follow notification for {}: {}",
            logging::user_tag(&target.username),
            e
        );
    }
}

// ---------------------------------------------------------------------------
// Inbox (read side)
// ---------------------------------------------------------------------------

/// A user's notifications, newest first.
pub fn inbox(
    storage: &Storage,
    user_id: i64,
    limit: u32,
) -> Result<Vec<NotificationRow>, StorageError> {
    storage.list_notifications(user_id, limit)
}

/// Mark one notification as read.  A notification that does not exist and
/// one that belongs to another user are indistinguishable to the caller.
pub fn mark_read(storage: &Storage, id: i64, user_id: i64) -> Result<(), StorageError> {
    let row = storage
        .get_notification(id)?
        .ok_or_else(|| StorageError::NotFound(format!("notification {id}")))?;
    if row.recipient_id != user_id {
        return Err(StorageError::NotFound(format!("notification {id}")));
    }
    storage.mark_notification_read(id)?;
    Ok(())
}

/// Mark all of a user's unread notifications as read.  Returns the number
/// of rows affected; calling again immediately affects zero.
pub fn mark_all_read(storage: &Storage, user_id: i64) -> Result<u32, StorageError> {
    storage.mark_all_notifications_read(user_id)
}

pub fn unread_count(storage: &Storage, user_id: i64) -> Result<u32, StorageError> {
    storage.count_unread_notifications(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UserRow;

    fn test_storage() -> Storage {
        Storage::open_in_memory().unwrap()
    }

    fn add_user(storage: &Storage, username: &str) -> UserRow {
        let id = storage
            .insert_user_with_profile(&UserRow {
                id: 0,
                email: format!("{username}@example.com"),
                username: username.to_string(),
                created_at: 1_700_000_000,
            })
            .unwrap();
        storage.get_user(id).unwrap().unwrap()
    }

    fn add_post(storage: &Storage, author: &UserRow) -> PostRow {
        let id = storage
            .insert_post(&crate::storage::PostRow {
                id: 0,
                author_id: author.id,
                caption: Some("pic".to_string()),
                image_ref: None,
                hidden: false,
                created_at: 100,
                updated_at: 100,
            })
            .unwrap();
        storage.get_post(id).unwrap().unwrap()
    }

    #[test]
    fn like_on_own_post_is_suppressed() {
        let storage = test_storage();
        let alice = add_user(&storage, "alice");
        let post = add_post(&storage, &alice);

        like_added(&storage, &post, &alice, 200);
        assert_eq!(unread_count(&storage, alice.id).unwrap(), 0);
    }

    #[test]
    fn like_by_other_user_notifies_author() {
        let storage = test_storage();
        let alice = add_user(&storage, "alice");
        let bob = add_user(&storage, "bob");
        let post = add_post(&storage, &alice);

        like_added(&storage, &post, &bob, 200);

        let inbox = inbox(&storage, alice.id, 50).unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, "like");
        assert_eq!(inbox[0].sender_id, Some(bob.id));
        assert_eq!(inbox[0].post_id, Some(post.id));
        assert_eq!(inbox[0].message, "bob liked your post");
        assert!(!inbox[0].is_read);
        // The liker gets nothing.
        assert_eq!(unread_count(&storage, bob.id).unwrap(), 0);
    }

    #[test]
    fn mark_read_is_recipient_scoped() {
        let storage = test_storage();
        let alice = add_user(&storage, "alice");
        let bob = add_user(&storage, "bob");
        let post = add_post(&storage, &alice);

        like_added(&storage, &post, &bob, 200);
        let id = inbox(&storage, alice.id, 50).unwrap()[0].id;

        // Bob cannot read Alice's notification, and the flag is untouched.
        assert!(matches!(
            mark_read(&storage, id, bob.id),
            Err(StorageError::NotFound(_))
        ));
        assert_eq!(unread_count(&storage, alice.id).unwrap(), 1);

        mark_read(&storage, id, alice.id).unwrap();
        assert_eq!(unread_count(&storage, alice.id).unwrap(), 0);

        assert!(matches!(
            mark_read(&storage, 9999, alice.id),
            Err(StorageError::NotFound(_))
        ));
    }
}
