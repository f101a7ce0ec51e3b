use minigram::content;
use minigram::feed::{self, PostOrder};
use minigram::graph;
use minigram::notify;
use minigram::storage::{PostRow, Storage, UserRow};

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

/// Insert a post with an explicit timestamp so ordering is controllable.
fn post_at(storage: &Storage, author_id: i64, caption: &str, created_at: u64) -> i64 {
    storage
        .insert_post(&PostRow {
            id: 0,
            author_id,
            caption: Some(caption.to_string()),
            image_ref: None,
            hidden: false,
            created_at,
            updated_at: created_at,
        })
        .expect("insert post")
}

// ---------------------------------------------------------------------------
// Home feed
// ---------------------------------------------------------------------------

#[test]
fn feed_contains_only_followed_authors() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let carol = register(&storage, "carol");

    graph::toggle_follow(&storage, alice, bob).expect("follow");
    let bobs_post = post_at(&storage, bob, "from bob", 100);
    post_at(&storage, carol, "from carol", 200);

    let feed = feed::build_feed(&storage, alice, 50).expect("feed");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id, bobs_post);
    // Carol is not followed, so her newer post never appears.
    assert!(feed.iter().all(|p| p.author_id != carol));
}

#[test]
fn feed_is_newest_first() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let carol = register(&storage, "carol");

    graph::toggle_follow(&storage, alice, bob).expect("follow bob");
    graph::toggle_follow(&storage, alice, carol).expect("follow carol");

    let oldest = post_at(&storage, bob, "oldest", 100);
    let middle = post_at(&storage, carol, "middle", 200);
    let newest = post_at(&storage, bob, "newest", 300);

    let feed = feed::build_feed(&storage, alice, 50).expect("feed");
    let ids: Vec<i64> = feed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![newest, middle, oldest]);
}

#[test]
fn empty_following_set_yields_empty_feed() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    post_at(&storage, bob, "unseen", 100);

    let feed = feed::build_feed(&storage, alice, 50).expect("feed");
    assert!(feed.is_empty());
}

#[test]
fn own_posts_do_not_appear_in_own_feed() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");

    graph::toggle_follow(&storage, alice, bob).expect("follow");
    post_at(&storage, alice, "mine", 100);
    let bobs = post_at(&storage, bob, "bobs", 200);

    let feed = feed::build_feed(&storage, alice, 50).expect("feed");
    let ids: Vec<i64> = feed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![bobs]);
}

#[test]
fn unfollow_removes_author_from_feed() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");

    graph::toggle_follow(&storage, alice, bob).expect("follow");
    post_at(&storage, bob, "bobs", 100);
    assert_eq!(feed::build_feed(&storage, alice, 50).expect("feed").len(), 1);

    graph::toggle_follow(&storage, alice, bob).expect("unfollow");
    assert!(feed::build_feed(&storage, alice, 50).expect("feed").is_empty());
}

// ---------------------------------------------------------------------------
// Trending and sort modes
// ---------------------------------------------------------------------------

#[test]
fn trending_ranks_by_likes_then_recency() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");
    let carol = register(&storage, "carol");

    let two_likes = post_at(&storage, alice, "two likes", 100);
    let old_one_like = post_at(&storage, alice, "old, one like", 200);
    let new_one_like = post_at(&storage, alice, "new, one like", 300);
    let no_likes = post_at(&storage, alice, "no likes", 400);

    storage.insert_like(two_likes, bob, 500).expect("like");
    storage.insert_like(two_likes, carol, 500).expect("like");
    storage.insert_like(old_one_like, bob, 500).expect("like");
    storage.insert_like(new_one_like, carol, 500).expect("like");

    let trending = feed::trending(&storage, 50).expect("trending");
    let ids: Vec<i64> = trending.iter().map(|p| p.id).collect();
    // Equal like counts tie-break on recency.
    assert_eq!(ids, vec![two_likes, new_one_like, old_one_like, no_likes]);
}

#[test]
fn trending_ignores_the_follow_graph() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");

    // Nobody follows anybody; trending still sees every post.
    post_at(&storage, alice, "a", 100);
    post_at(&storage, bob, "b", 200);

    assert_eq!(feed::trending(&storage, 50).expect("trending").len(), 2);
}

#[test]
fn list_posts_sort_modes() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");

    let old_liked = post_at(&storage, alice, "old but liked", 100);
    let newest = post_at(&storage, alice, "newest", 200);
    storage.insert_like(old_liked, bob, 300).expect("like");

    let recent = feed::list_posts(&storage, PostOrder::Recent, 50).expect("recent");
    let ids: Vec<i64> = recent.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![newest, old_liked]);

    let popular = feed::list_posts(&storage, PostOrder::Popular, 50).expect("popular");
    let ids: Vec<i64> = popular.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![old_liked, newest]);
}

#[test]
fn sort_param_parsing_defaults_to_recent() {
    assert_eq!(PostOrder::from_param(Some("popular")), PostOrder::Popular);
    assert_eq!(PostOrder::from_param(Some("recent")), PostOrder::Recent);
    assert_eq!(PostOrder::from_param(Some("bogus")), PostOrder::Recent);
    assert_eq!(PostOrder::from_param(None), PostOrder::Recent);
}

// ---------------------------------------------------------------------------
// Moderation visibility
// ---------------------------------------------------------------------------

#[test]
fn hidden_posts_drop_out_of_feed_and_trending() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");

    graph::toggle_follow(&storage, alice, bob).expect("follow");
    let p = post_at(&storage, bob, "soon hidden", 100);
    storage.insert_like(p, alice, 200).expect("like");

    assert_eq!(feed::build_feed(&storage, alice, 50).expect("feed").len(), 1);
    assert_eq!(feed::trending(&storage, 50).expect("trending").len(), 1);

    content::set_post_hidden(&storage, p, true).expect("hide");
    assert!(feed::build_feed(&storage, alice, 50).expect("feed").is_empty());
    assert!(feed::trending(&storage, 50).expect("trending").is_empty());
    // The moderation listing still sees it.
    assert_eq!(storage.list_posts_all(50).expect("all").len(), 1);

    // Unhide is reversible, nothing was destroyed.
    content::set_post_hidden(&storage, p, false).expect("unhide");
    assert_eq!(feed::build_feed(&storage, alice, 50).expect("feed").len(), 1);
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn register_follow_post_feed_scenario() {
    let storage = open_storage();
    let alice = register(&storage, "alice");
    let bob = register(&storage, "bob");

    graph::toggle_follow(&storage, alice, bob).expect("alice follows bob");
    content::create_post(&storage, bob, Some("hello".to_string()), None).expect("bob posts");

    let feed = feed::build_feed(&storage, alice, 50).expect("alice's feed");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].caption.as_deref(), Some("hello"));
    assert_eq!(feed[0].author_id, bob);

    // No like or comment happened, so Bob's inbox holds only Alice's follow.
    let inbox = notify::inbox(&storage, bob, 50).expect("bob's inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, "follow");

    // A bystander changes nothing.
    let carol = register(&storage, "carol");
    content::create_post(&storage, carol, Some("noise".to_string()), None).expect("carol posts");
    let feed = feed::build_feed(&storage, alice, 50).expect("alice's feed");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].caption.as_deref(), Some("hello"));
}
