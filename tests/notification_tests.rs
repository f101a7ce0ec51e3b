use minigram::content;
use minigram::notify;
use minigram::storage::{Storage, StorageError, UserRow};

fn open_storage() -> Storage {
    Storage::open_in_memory().expect("open in-memory storage")
}

fn register(storage: &Storage, username: &str) -> i64 {
    storage
        .insert_user_with_profile(&UserRow {
            id: 0,
            email: format!("{username}@example.com"),
            username: username.to_string(),
            created_at: 1_700_000_000,
        })
        .expect("register user")
}

fn post(storage: &Storage, author_id: i64) -> i64 {
    content::create_post(storage, author_id, Some("pic".to_string()), None)
        .expect("create post")
        .id
}

// ---------------------------------------------------------------------------
// Self-notification suppression
// ---------------------------------------------------------------------------

#[test]
fn liking_own_post_creates_no_notification() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let p = post(&storage, alice);

    let toggle = content::toggle_like(&storage, p, alice).expect("like own post");
    assert!(toggle.liked);
    assert_eq!(toggle.like_count, 1);

    assert!(notify::inbox(&storage, alice, 50).expect("inbox").is_empty());
}

#[test]
fn commenting_on_own_post_creates_no_notification() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let p = post(&storage, alice);

    content::create_comment(&storage, p, alice, "note to self", None).expect("comment");

    assert!(notify::inbox(&storage, alice, 50).expect("inbox").is_empty());
}

// ---------------------------------------------------------------------------
// Like fan-out
// ---------------------------------------------------------------------------

#[test]
fn like_notifies_the_post_author() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let p = post(&storage, alice);

    let toggle = content::toggle_like(&storage, p, bob).expect("like");
    assert!(toggle.liked);

    let inbox = notify::inbox(&storage, alice, 50).expect("inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, "like");
    assert_eq!(inbox[0].sender_id, Some(bob));
    assert_eq!(inbox[0].post_id, Some(p));
    assert_eq!(inbox[0].message, "bob liked your post");
}

#[test]
fn unlike_does_not_retract_the_notification() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let p = post(&storage, alice);

    content::toggle_like(&storage, p, bob).expect("like");
    let toggle = content::toggle_like(&storage, p, bob).expect("unlike");
    assert!(!toggle.liked);
    assert_eq!(toggle.like_count, 0);

    // The like is gone but the notification stays.
    assert_eq!(notify::inbox(&storage, alice, 50).expect("inbox").len(), 1);

    // Liking again fans out a second one.
    content::toggle_like(&storage, p, bob).expect("re-like");
    assert_eq!(notify::inbox(&storage, alice, 50).expect("inbox").len(), 2);
}

// ---------------------------------------------------------------------------
// Comment fan-out
// ---------------------------------------------------------------------------

#[test]
fn comment_notifies_the_post_author() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let p = post(&storage, alice);

    let comment = content::create_comment(&storage, p, bob, "nice shot", None).expect("comment");

    let inbox = notify::inbox(&storage, alice, 50).expect("inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, "comment");
    assert_eq!(inbox[0].sender_id, Some(bob));
    assert_eq!(inbox[0].post_id, Some(p));
    assert_eq!(inbox[0].comment_id, Some(comment.id));
    assert_eq!(inbox[0].message, "bob commented on your post");
}

#[test]
fn reply_also_notifies_the_post_author() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let carol = register(&storage, "carol");
    let p = post(&storage, alice);

    let top = content::create_comment(&storage, p, bob, "first", None).expect("comment");
    content::create_comment(&storage, p, carol, "second", Some(top.id)).expect("reply");

    // Both the comment and the reply land in the post author's inbox.
    let inbox = notify::inbox(&storage, alice, 50).expect("inbox");
    assert_eq!(inbox.len(), 2);
    assert!(inbox.iter().all(|n| n.kind == "comment"));
}

#[test]
fn deleting_a_comment_cascades_to_its_notifications() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let p = post(&storage, alice);

    let top = content::create_comment(&storage, p, bob, "first", None).expect("comment");
    content::create_comment(&storage, p, bob, "again", Some(top.id)).expect("reply");
    assert_eq!(notify::inbox(&storage, alice, 50).expect("inbox").len(), 2);

    // Removing the top comment takes the reply and both notifications along.
    content::delete_comment(&storage, top.id, bob).expect("delete");
    assert!(notify::inbox(&storage, alice, 50).expect("inbox").is_empty());
    assert_eq!(storage.count_comments(p).expect("count"), 0);
}

#[test]
fn only_the_comment_author_may_delete_it() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let p = post(&storage, alice);

    let comment = content::create_comment(&storage, p, bob, "mine", None).expect("comment");

    assert!(matches!(
        content::delete_comment(&storage, comment.id, alice),
        Err(StorageError::Forbidden(_))
    ));
    assert!(storage.get_comment(comment.id).expect("get").is_some());
}

// ---------------------------------------------------------------------------
// Inbox read-side
// ---------------------------------------------------------------------------

#[test]
fn unread_count_tracks_the_unread_rows() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let p = post(&storage, alice);

    assert_eq!(notify::unread_count(&storage, alice).expect("count"), 0);

    content::toggle_like(&storage, p, bob).expect("like");
    content::create_comment(&storage, p, bob, "hey", None).expect("comment");
    assert_eq!(notify::unread_count(&storage, alice).expect("count"), 2);

    let first = notify::inbox(&storage, alice, 50).expect("inbox")[0].id;
    notify::mark_read(&storage, first, alice).expect("mark read");
    assert_eq!(notify::unread_count(&storage, alice).expect("count"), 1);
}

#[test]
fn mark_all_read_is_idempotent() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let p = post(&storage, alice);

    content::toggle_like(&storage, p, bob).expect("like");
    content::create_comment(&storage, p, bob, "hey", None).expect("comment");

    assert_eq!(notify::mark_all_read(&storage, alice).expect("first"), 2);
    assert_eq!(notify::unread_count(&storage, alice).expect("count"), 0);

    // The second pass finds nothing left to flip.
    assert_eq!(notify::mark_all_read(&storage, alice).expect("second"), 0);
    assert_eq!(notify::unread_count(&storage, alice).expect("count"), 0);
}

#[test]
fn cross_user_mark_read_is_denied() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let p = post(&storage, alice);

    content::toggle_like(&storage, p, bob).expect("like");
    let id = notify::inbox(&storage, alice, 50).expect("inbox")[0].id;

    // Bob cannot see that Alice's notification even exists.
    assert!(matches!(
        notify::mark_read(&storage, id, bob),
        Err(StorageError::NotFound(_))
    ));
    // And the flag is untouched.
    let inbox = notify::inbox(&storage, alice, 50).expect("inbox");
    assert!(!inbox[0].is_read);
}

#[test]
fn inbox_is_newest_first_and_scoped_to_the_recipient() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let p = post(&storage, alice);

    content::toggle_like(&storage, p, bob).expect("like");
    content::create_comment(&storage, p, bob, "hey", None).expect("comment");

    let inbox = notify::inbox(&storage, alice, 50).expect("inbox");
    assert_eq!(inbox.len(), 2);
    // Same-second events fall back to insertion order, newest first.
    assert_eq!(inbox[0].kind, "comment");
    assert_eq!(inbox[1].kind, "like");
    assert!(inbox.iter().all(|n| n.recipient_id == alice));

    assert!(notify::inbox(&storage, bob, 50).expect("inbox").is_empty());
}
