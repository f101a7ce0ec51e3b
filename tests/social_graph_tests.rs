use minigram::graph::{self, FollowToggle};
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

// ---------------------------------------------------------------------------
// Self-follow guard
// ---------------------------------------------------------------------------

#[test]
fn self_follow_is_rejected() {
    let storage = open_storage();
    let alice = register(&storage, "alice");

    let result = graph::toggle_follow(&storage, alice, alice);
    assert!(matches!(result, Err(StorageError::InvalidOperation(_))));

    // No edge was created.
    assert!(graph::following(&storage, alice).expect("following").is_empty());
    assert!(graph::followers(&storage, alice).expect("followers").is_empty());
}

#[test]
fn follow_of_missing_user_is_not_found() {
    let storage = open_storage();
    let alice = register(&storage, "alice");

    assert!(matches!(
        graph::toggle_follow(&storage, alice, 9999),
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        graph::toggle_follow(&storage, 9999, alice),
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        graph::following(&storage, 9999),
        Err(StorageError::NotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Toggle semantics
// ---------------------------------------------------------------------------

#[test]
fn follow_toggles_the_edge() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");

    // Odd number of calls: edge exists.
    let first = graph::toggle_follow(&storage, alice, bob).expect("first toggle");
    assert_eq!(first, FollowToggle::Followed);
    let following = graph::following(&storage, alice).expect("following");
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].username, "bob");

    // Even number of calls: no edge.
    let second = graph::toggle_follow(&storage, alice, bob).expect("second toggle");
    assert_eq!(second, FollowToggle::Unfollowed);
    assert!(graph::following(&storage, alice).expect("following").is_empty());

    let third = graph::toggle_follow(&storage, alice, bob).expect("third toggle");
    assert_eq!(third, FollowToggle::Followed);
    assert_eq!(graph::following(&storage, alice).expect("following").len(), 1);
}

#[test]
fn follow_is_directed() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");

    graph::toggle_follow(&storage, alice, bob).expect("follow");

    // Alice follows Bob; Bob does not follow Alice.
    assert_eq!(graph::following(&storage, alice).expect("following").len(), 1);
    assert!(graph::following(&storage, bob).expect("following").is_empty());

    let bobs_followers = graph::followers(&storage, bob).expect("followers");
    assert_eq!(bobs_followers.len(), 1);
    assert_eq!(bobs_followers[0].username, "alice");
    assert!(graph::followers(&storage, alice).expect("followers").is_empty());
}

// ---------------------------------------------------------------------------
// Follow fan-out
// ---------------------------------------------------------------------------

#[test]
fn new_follow_notifies_the_target() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");

    graph::toggle_follow(&storage, alice, bob).expect("follow");

    let inbox = notify::inbox(&storage, bob, 50).expect("inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, "follow");
    assert_eq!(inbox[0].sender_id, Some(alice));
    assert_eq!(inbox[0].message, "alice started following you");
    assert!(!inbox[0].is_read);
    // The actor gets nothing.
    assert_eq!(notify::unread_count(&storage, alice).expect("count"), 0);
}

#[test]
fn unfollow_and_refollow_fan_out() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");

    graph::toggle_follow(&storage, alice, bob).expect("follow");
    // Unfollow is silent; the original notification is not retracted.
    graph::toggle_follow(&storage, alice, bob).expect("unfollow");
    assert_eq!(notify::inbox(&storage, bob, 50).expect("inbox").len(), 1);

    // A fresh follow fans out again.
    graph::toggle_follow(&storage, alice, bob).expect("refollow");
    assert_eq!(notify::inbox(&storage, bob, 50).expect("inbox").len(), 2);
}
