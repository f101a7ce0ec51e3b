//! SQLite storage layer for minigram.
//!
//! Provides the shared database behind the web server and the domain
//! modules.  Handles schema creation and CRUD for users, profiles, follow
//! edges, posts, likes, comments, and notifications.  Ownership cascades
//! (user -> profile/posts/comments/likes/notifications, post -> comments,
//! comment -> replies) are expressed as `ON DELETE CASCADE` foreign keys.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    NotFound(String),
    InvalidOperation(String),
    Forbidden(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Sqlite(e) => write!(f, "sqlite error: {e}"),
            StorageError::NotFound(msg) => write!(f, "not found: {msg}"),
            StorageError::InvalidOperation(msg) => write!(f, "invalid operation: {msg}"),
            StorageError::Forbidden(msg) => write!(f, "forbidden: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Sqlite(e)
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// User account row.  Deleting a user cascades to everything it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub created_at: u64,
}

/// Profile row, 1:1 with a user.  The follow graph hangs off profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub user_id: i64,
    pub bio: Option<String>,
    pub avatar_ref: Option<String>,
    pub created_at: u64,
}

/// Post row.  `image_ref` is an opaque reference into external media
/// storage; this layer never touches image bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRow {
    pub id: i64,
    pub author_id: i64,
    pub caption: Option<String>,
    pub image_ref: Option<String>,
    /// Moderation visibility flag.  Hidden posts stay in the database but
    /// drop out of public listings, feeds, and trending.
    pub hidden: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Comment row.  `parent_id` forms the reply tree; top-level comments have
/// no parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub body: String,
    pub created_at: u64,
}

/// Notification row.  Created only by the dispatcher; clients may only flip
/// the read flag.  `sender_id` is null for system-generated notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRow {
    pub id: i64,
    pub recipient_id: i64,
    pub sender_id: Option<i64>,
    /// "like", "comment", "follow", or "mention"
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub post_id: Option<i64>,
    pub comment_id: Option<i64>,
    pub created_at: u64,
}

// ---------------------------------------------------------------------------
// Storage handle
// ---------------------------------------------------------------------------

/// Main storage handle wrapping a SQLite connection.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create a database at the given path. Creates schema if needed.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let storage = Self { conn };
        storage.create_schema()?;
        Ok(storage)
    }

    /// Create an in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let storage = Self { conn };
        storage.create_schema()?;
        Ok(storage)
    }

    fn create_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                email       TEXT NOT NULL UNIQUE,
                username    TEXT NOT NULL UNIQUE,
                created_at  INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
                user_id     INTEGER PRIMARY KEY
                            REFERENCES users(id) ON DELETE CASCADE,
                bio         TEXT,
                avatar_ref  TEXT,
                created_at  INTEGER NOT NULL
            );

            -- Directed follow edge set over profiles.  One relation, two
            -- views: forward via the primary key, reverse via the index.
            CREATE TABLE IF NOT EXISTS follows (
                follower_id INTEGER NOT NULL
                            REFERENCES profiles(user_id) ON DELETE CASCADE,
                followee_id INTEGER NOT NULL
                            REFERENCES profiles(user_id) ON DELETE CASCADE,
                created_at  INTEGER NOT NULL,
                PRIMARY KEY (follower_id, followee_id)
            );

            CREATE INDEX IF NOT EXISTS idx_follows_followee
                ON follows(followee_id);

            CREATE TABLE IF NOT EXISTS posts (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id   INTEGER NOT NULL
                            REFERENCES users(id) ON DELETE CASCADE,
                caption     TEXT,
                image_ref   TEXT,
                hidden      INTEGER NOT NULL DEFAULT 0,
                created_at  INTEGER NOT NULL,
                updated_at  INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_posts_author
                ON posts(author_id, created_at);

            CREATE TABLE IF NOT EXISTS post_likes (
                post_id     INTEGER NOT NULL
                            REFERENCES posts(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL
                            REFERENCES users(id) ON DELETE CASCADE,
                created_at  INTEGER NOT NULL,
                PRIMARY KEY (post_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS comments (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id     INTEGER NOT NULL
                            REFERENCES posts(id) ON DELETE CASCADE,
                author_id   INTEGER NOT NULL
                            REFERENCES users(id) ON DELETE CASCADE,
                parent_id   INTEGER
                            REFERENCES comments(id) ON DELETE CASCADE,
                body        TEXT NOT NULL,
                created_at  INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_comments_post
                ON comments(post_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_comments_parent
                ON comments(parent_id);

            CREATE TABLE IF NOT EXISTS notifications (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                recipient_id    INTEGER NOT NULL
                                REFERENCES users(id) ON DELETE CASCADE,
                sender_id       INTEGER
                                REFERENCES users(id) ON DELETE CASCADE,
                kind            TEXT NOT NULL,
                message         TEXT NOT NULL,
                is_read         INTEGER NOT NULL DEFAULT 0,
                post_id         INTEGER
                                REFERENCES posts(id) ON DELETE CASCADE,
                comment_id      INTEGER
                                REFERENCES comments(id) ON DELETE CASCADE,
                created_at      INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_notifications_recipient
                ON notifications(recipient_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_notifications_unread
                ON notifications(recipient_id, is_read);
            ",
        )?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Users and profiles
    // -----------------------------------------------------------------------

    /// Insert a new user together with its empty profile, atomically.
    /// Returns the new user id.  Duplicate email or username is rejected.
    pub fn insert_user_with_profile(&self, row: &UserRow) -> Result<i64, StorageError> {
        let clash: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1 OR username = ?2",
            params![row.email, row.username],
            |row| row.get(0),
        )?;
        if clash > 0 {
            return Err(StorageError::InvalidOperation(
                "email or username already taken".to_string(),
            ));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO users (email, username, created_at) VALUES (?1, ?2, ?3)",
            params![row.email, row.username, row.created_at as i64],
        )?;
        let user_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO profiles (user_id, bio, avatar_ref, created_at)
             VALUES (?1, NULL, NULL, ?2)",
            params![user_id, row.created_at as i64],
        )?;
        tx.commit()?;
        Ok(user_id)
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, username, created_at FROM users WHERE id = ?1",
        )?;
        let row = stmt
            .query_row(params![id], |row| {
                Ok(UserRow {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    username: row.get(2)?,
                    created_at: row.get::<_, i64>(3)? as u64,
                })
            })
            .optional()?;
        Ok(row)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, username, created_at FROM users WHERE username = ?1",
        )?;
        let row = stmt
            .query_row(params![username], |row| {
                Ok(UserRow {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    username: row.get(2)?,
                    created_at: row.get::<_, i64>(3)? as u64,
                })
            })
            .optional()?;
        Ok(row)
    }

    /// Delete a user.  Foreign keys cascade the deletion to the profile,
    /// follow edges, posts, likes, comments, and notifications.
    pub fn delete_user(&self, id: i64) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    pub fn get_profile(&self, user_id: i64) -> Result<Option<ProfileRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, bio, avatar_ref, created_at FROM profiles WHERE user_id = ?1",
        )?;
        let row = stmt
            .query_row(params![user_id], |row| {
                Ok(ProfileRow {
                    user_id: row.get(0)?,
                    bio: row.get(1)?,
                    avatar_ref: row.get(2)?,
                    created_at: row.get::<_, i64>(3)? as u64,
                })
            })
            .optional()?;
        Ok(row)
    }

    pub fn update_profile(
        &self,
        user_id: i64,
        bio: Option<&str>,
        avatar_ref: Option<&str>,
    ) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE profiles SET bio = ?1, avatar_ref = ?2 WHERE user_id = ?3",
            params![bio, avatar_ref, user_id],
        )?;
        Ok(affected > 0)
    }

    // -----------------------------------------------------------------------
    // Follow edges
    // -----------------------------------------------------------------------

    pub fn has_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
            params![follower_id, followee_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn insert_follow(
        &self,
        follower_id: i64,
        followee_id: i64,
        now: u64,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO follows (follower_id, followee_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![follower_id, followee_id, now as i64],
        )?;
        Ok(())
    }

    pub fn delete_follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
            params![follower_id, followee_id],
        )?;
        Ok(affected > 0)
    }

    /// Users this user follows (forward view of the edge set).
    pub fn list_following(&self, user_id: i64) -> Result<Vec<UserRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.email, u.username, u.created_at
             FROM follows f JOIN users u ON u.id = f.followee_id
             WHERE f.follower_id = ?1
             ORDER BY f.created_at",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                username: row.get(2)?,
                created_at: row.get::<_, i64>(3)? as u64,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Users following this user (reverse view of the same edge set).
    pub fn list_followers(&self, user_id: i64) -> Result<Vec<UserRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.email, u.username, u.created_at
             FROM follows f JOIN users u ON u.id = f.follower_id
             WHERE f.followee_id = ?1
             ORDER BY f.created_at",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                username: row.get(2)?,
                created_at: row.get::<_, i64>(3)? as u64,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn count_following(&self, user_id: i64) -> Result<u32, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    pub fn count_followers(&self, user_id: i64) -> Result<u32, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE followee_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    // -----------------------------------------------------------------------
    // Posts
    // -----------------------------------------------------------------------

    /// Insert a new post. Returns the new post id.
    pub fn insert_post(&self, row: &PostRow) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO posts (author_id, caption, image_ref, hidden, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row.author_id,
                row.caption,
                row.image_ref,
                row.hidden as i32,
                row.created_at as i64,
                row.updated_at as i64,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, author_id, caption, image_ref, hidden, created_at, updated_at
             FROM posts WHERE id = ?1",
        )?;
        let row = stmt
            .query_row(params![id], |row| {
                Ok(PostRow {
                    id: row.get(0)?,
                    author_id: row.get(1)?,
                    caption: row.get(2)?,
                    image_ref: row.get(3)?,
                    hidden: row.get::<_, i32>(4)? != 0,
                    created_at: row.get::<_, i64>(5)? as u64,
                    updated_at: row.get::<_, i64>(6)? as u64,
                })
            })
            .optional()?;
        Ok(row)
    }

    pub fn update_post_caption(
        &self,
        id: i64,
        caption: Option<&str>,
        updated_at: u64,
    ) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE posts SET caption = ?1, updated_at = ?2 WHERE id = ?3",
            params![caption, updated_at as i64, id],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_post(&self, id: i64) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Flip the moderation visibility flag.
    pub fn set_post_hidden(&self, id: i64, hidden: bool) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE posts SET hidden = ?1 WHERE id = ?2",
            params![hidden as i32, id],
        )?;
        Ok(affected > 0)
    }

    /// Visible posts, newest first.
    pub fn list_posts_recent(&self, limit: u32) -> Result<Vec<PostRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, author_id, caption, image_ref, hidden, created_at, updated_at
             FROM posts WHERE hidden = 0
             ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(PostRow {
                id: row.get(0)?,
                author_id: row.get(1)?,
                caption: row.get(2)?,
                image_ref: row.get(3)?,
                hidden: row.get::<_, i32>(4)? != 0,
                created_at: row.get::<_, i64>(5)? as u64,
                updated_at: row.get::<_, i64>(6)? as u64,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Visible posts ordered by like count, then recency.
    pub fn list_posts_popular(&self, limit: u32) -> Result<Vec<PostRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.author_id, p.caption, p.image_ref, p.hidden,
                    p.created_at, p.updated_at,
                    (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id) AS like_count
             FROM posts p WHERE p.hidden = 0
             ORDER BY like_count DESC, p.created_at DESC, p.id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(PostRow {
                id: row.get(0)?,
                author_id: row.get(1)?,
                caption: row.get(2)?,
                image_ref: row.get(3)?,
                hidden: row.get::<_, i32>(4)? != 0,
                created_at: row.get::<_, i64>(5)? as u64,
                updated_at: row.get::<_, i64>(6)? as u64,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// All posts including hidden ones, newest first.  Moderation view.
    pub fn list_posts_all(&self, limit: u32) -> Result<Vec<PostRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, author_id, caption, image_ref, hidden, created_at, updated_at
             FROM posts
             ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(PostRow {
                id: row.get(0)?,
                author_id: row.get(1)?,
                caption: row.get(2)?,
                image_ref: row.get(3)?,
                hidden: row.get::<_, i32>(4)? != 0,
                created_at: row.get::<_, i64>(5)? as u64,
                updated_at: row.get::<_, i64>(6)? as u64,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Visible posts authored by anyone the given user follows, newest first.
    pub fn list_feed_posts(&self, user_id: i64, limit: u32) -> Result<Vec<PostRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.author_id, p.caption, p.image_ref, p.hidden,
                    p.created_at, p.updated_at
             FROM posts p
             JOIN follows f ON f.followee_id = p.author_id
             WHERE f.follower_id = ?1 AND p.hidden = 0
             ORDER BY p.created_at DESC, p.id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            Ok(PostRow {
                id: row.get(0)?,
                author_id: row.get(1)?,
                caption: row.get(2)?,
                image_ref: row.get(3)?,
                hidden: row.get::<_, i32>(4)? != 0,
                created_at: row.get::<_, i64>(5)? as u64,
                updated_at: row.get::<_, i64>(6)? as u64,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Likes
    // -----------------------------------------------------------------------

    pub fn has_like(&self, post_id: i64, user_id: i64) -> Result<bool, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM post_likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn insert_like(&self, post_id: i64, user_id: i64, now: u64) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO post_likes (post_id, user_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![post_id, user_id, now as i64],
        )?;
        Ok(())
    }

    pub fn delete_like(&self, post_id: i64, user_id: i64) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "DELETE FROM post_likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
        )?;
        Ok(affected > 0)
    }

    pub fn count_likes(&self, post_id: i64) -> Result<u32, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM post_likes WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    /// Insert a new comment. Returns the new comment id.
    pub fn insert_comment(&self, row: &CommentRow) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO comments (post_id, author_id, parent_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                row.post_id,
                row.author_id,
                row.parent_id,
                row.body,
                row.created_at as i64,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_comment(&self, id: i64) -> Result<Option<CommentRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, post_id, author_id, parent_id, body, created_at
             FROM comments WHERE id = ?1",
        )?;
        let row = stmt
            .query_row(params![id], |row| {
                Ok(CommentRow {
                    id: row.get(0)?,
                    post_id: row.get(1)?,
                    author_id: row.get(2)?,
                    parent_id: row.get(3)?,
                    body: row.get(4)?,
                    created_at: row.get::<_, i64>(5)? as u64,
                })
            })
            .optional()?;
        Ok(row)
    }

    /// Delete a comment.  Child replies and referencing notifications
    /// cascade.
    pub fn delete_comment(&self, id: i64) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Top-level comments on a post (no parent), oldest first.
    pub fn list_top_level_comments(&self, post_id: i64) -> Result<Vec<CommentRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, post_id, author_id, parent_id, body, created_at
             FROM comments WHERE post_id = ?1 AND parent_id IS NULL
             ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![post_id], |row| {
            Ok(CommentRow {
                id: row.get(0)?,
                post_id: row.get(1)?,
                author_id: row.get(2)?,
                parent_id: row.get(3)?,
                body: row.get(4)?,
                created_at: row.get::<_, i64>(5)? as u64,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Direct replies to a comment, oldest first.
    pub fn list_replies(&self, parent_id: i64) -> Result<Vec<CommentRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, post_id, author_id, parent_id, body, created_at
             FROM comments WHERE parent_id = ?1
             ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![parent_id], |row| {
            Ok(CommentRow {
                id: row.get(0)?,
                post_id: row.get(1)?,
                author_id: row.get(2)?,
                parent_id: row.get(3)?,
                body: row.get(4)?,
                created_at: row.get::<_, i64>(5)? as u64,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn count_replies(&self, parent_id: i64) -> Result<u32, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE parent_id = ?1",
            params![parent_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    pub fn count_comments(&self, post_id: i64) -> Result<u32, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    /// Insert a new notification. Returns the new notification id.
    pub fn insert_notification(&self, row: &NotificationRow) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO notifications
             (recipient_id, sender_id, kind, message, is_read, post_id, comment_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                row.recipient_id,
                row.sender_id,
                row.kind,
                row.message,
                row.is_read as i32,
                row.post_id,
                row.comment_id,
                row.created_at as i64,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_notification(&self, id: i64) -> Result<Option<NotificationRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recipient_id, sender_id, kind, message, is_read,
                    post_id, comment_id, created_at
             FROM notifications WHERE id = ?1",
        )?;
        let row = stmt
            .query_row(params![id], |row| {
                Ok(NotificationRow {
                    id: row.get(0)?,
                    recipient_id: row.get(1)?,
                    sender_id: row.get(2)?,
                    kind: row.get(3)?,
                    message: row.get(4)?,
                    is_read: row.get::<_, i32>(5)? != 0,
                    post_id: row.get(6)?,
                    comment_id: row.get(7)?,
                    created_at: row.get::<_, i64>(8)? as u64,
                })
            })
            .optional()?;
        Ok(row)
    }

    /// A recipient's notifications, newest first.
    pub fn list_notifications(
        &self,
        recipient_id: i64,
        limit: u32,
    ) -> Result<Vec<NotificationRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recipient_id, sender_id, kind, message, is_read,
                    post_id, comment_id, created_at
             FROM notifications WHERE recipient_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![recipient_id, limit as i64], |row| {
            Ok(NotificationRow {
                id: row.get(0)?,
                recipient_id: row.get(1)?,
                sender_id: row.get(2)?,
                kind: row.get(3)?,
                message: row.get(4)?,
                is_read: row.get::<_, i32>(5)? != 0,
                post_id: row.get(6)?,
                comment_id: row.get(7)?,
                created_at: row.get::<_, i64>(8)? as u64,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Mark a notification as read.
    pub fn mark_notification_read(&self, id: i64) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(affected > 0)
    }

    /// Mark all of a recipient's unread notifications as read.  Returns the
    /// number of rows affected.
    pub fn mark_all_notifications_read(&self, recipient_id: i64) -> Result<u32, StorageError> {
        let affected = self.conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE recipient_id = ?1 AND is_read = 0",
            params![recipient_id],
        )?;
        Ok(affected as u32)
    }

    /// Count a recipient's unread notifications.
    pub fn count_unread_notifications(&self, recipient_id: i64) -> Result<u32, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND is_read = 0",
            params![recipient_id],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
