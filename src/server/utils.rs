//! Shared utility functions for the web server.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::storage::{CommentRow, NotificationRow, PostRow, Storage, StorageError, UserRow};

/// Build a standard JSON error response.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, axum::Json(body)).into_response()
}

/// Current time as seconds since UNIX epoch.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Translate a storage-layer error into its HTTP shape.
pub fn storage_error_response(e: StorageError) -> Response {
    match e {
        StorageError::InvalidOperation(msg) => api_error(StatusCode::BAD_REQUEST, msg),
        StorageError::NotFound(msg) => api_error(StatusCode::NOT_FOUND, msg),
        StorageError::Forbidden(msg) => api_error(StatusCode::FORBIDDEN, msg),
        StorageError::Sqlite(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Resolve the acting user from the `x-username` header.
///
/// The header is the stand-in for the external identity provider: the value
/// is trusted as given.  Missing or unknown identities fail with 401.
pub fn acting_user(headers: &HeaderMap, storage: &Storage) -> Result<UserRow, Response> {
    let username = match headers.get("x-username").and_then(|v| v.to_str().ok()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => {
            return Err(api_error(
                StatusCode::UNAUTHORIZED,
                "x-username header required",
            ))
        }
    };
    match storage.get_user_by_username(&username) {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(api_error(StatusCode::UNAUTHORIZED, "unknown user")),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// Like [`acting_user`] but for endpoints that work anonymously; an absent
/// or unknown identity is simply no viewer.
pub fn maybe_acting_user(headers: &HeaderMap, storage: &Storage) -> Option<UserRow> {
    let username = headers.get("x-username").and_then(|v| v.to_str().ok())?;
    storage.get_user_by_username(username.trim()).ok().flatten()
}

/// Build the JSON representation of a post including author username, like
/// and comment counts, and the viewer's like state when a viewer is known.
pub fn post_to_json(p: &PostRow, storage: &Storage, viewer: Option<i64>) -> serde_json::Value {
    let author = storage
        .get_user(p.author_id)
        .ok()
        .flatten()
        .map(|u| u.username);
    let like_count = storage.count_likes(p.id).unwrap_or(0);
    let comment_count = storage.count_comments(p.id).unwrap_or(0);
    let is_liked = viewer.map(|v| storage.has_like(p.id, v).unwrap_or(false));

    serde_json::json!({
        "id": p.id,
        "author": author,
        "caption": p.caption,
        "image_ref": p.image_ref,
        "hidden": p.hidden,
        "like_count": like_count,
        "comment_count": comment_count,
        "is_liked": is_liked,
        "created_at": p.created_at,
        "updated_at": p.updated_at,
    })
}

/// Build the JSON representation of a comment including its reply count.
pub fn comment_to_json(c: &CommentRow, storage: &Storage) -> serde_json::Value {
    let author = storage
        .get_user(c.author_id)
        .ok()
        .flatten()
        .map(|u| u.username);
    let reply_count = storage.count_replies(c.id).unwrap_or(0);

    serde_json::json!({
        "id": c.id,
        "post_id": c.post_id,
        "author": author,
        "parent_id": c.parent_id,
        "body": c.body,
        "reply_count": reply_count,
        "created_at": c.created_at,
    })
}

pub fn notification_to_json(n: &NotificationRow, storage: &Storage) -> serde_json::Value {
    let sender = n.sender_id.and_then(|id| {
        storage
            .get_user(id)
            .ok()
            .flatten()
            .map(|u| u.username)
    });

    serde_json::json!({
        "id": n.id,
        "kind": n.kind,
        "sender": sender,
        "message": n.message,
        "is_read": n.is_read,
        "post_id": n.post_id,
        "comment_id": n.comment_id,
        "created_at": n.created_at,
    })
}

/// Build the JSON representation of a user's public profile, including the
/// two directional counts over the follow edge set.
pub fn profile_to_json(user: &UserRow, storage: &Storage) -> serde_json::Value {
    let profile = storage.get_profile(user.id).ok().flatten();
    let followers = storage.count_followers(user.id).unwrap_or(0);
    let following = storage.count_following(user.id).unwrap_or(0);
    let (bio, avatar_ref) = profile
        .map(|p| (p.bio, p.avatar_ref))
        .unwrap_or((None, None));

    serde_json::json!({
        "id": user.id,
        "username": user.username,
        "bio": bio,
        "avatar_ref": avatar_ref,
        "followers": followers,
        "following": following,
        "created_at": user.created_at,
    })
}

/// Minimal user representation for follower/following listings.
pub fn user_summary_json(u: &UserRow) -> serde_json::Value {
    serde_json::json!({
        "id": u.id,
        "username": u.username,
    })
}
