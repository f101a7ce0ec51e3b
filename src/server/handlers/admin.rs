//! Moderation handlers.
//!
//! Moderation identity and access control live outside this service; these
//! endpoints trust the caller the same way the rest of the API trusts the
//! identity header.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::content;
use crate::server::config::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use crate::server::state::SharedState;
use crate::server::utils::{post_to_json, storage_error_response};

#[derive(Deserialize)]
pub struct ListQuery {
    limit: Option<u32>,
}

/// GET /api/admin/posts - All posts, hidden ones included.
pub async fn list_all_posts_handler(
    State(state): State<SharedState>,
    Query(params): Query<ListQuery>,
) -> Response {
    let st = state.lock().await;
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    match st.storage.list_posts_all(limit) {
        Ok(posts) => {
            let json: Vec<serde_json::Value> = posts
                .iter()
                .map(|p| post_to_json(p, &st.storage, None))
                .collect();
            (StatusCode::OK, axum::Json(serde_json::json!(json))).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// POST /api/admin/posts/:id/hide - Hide a post from public view.
pub async fn hide_post_handler(State(state): State<SharedState>, Path(id): Path<i64>) -> Response {
    let st = state.lock().await;
    match content::set_post_hidden(&st.storage, id, true) {
        Ok(post) => (
            StatusCode::OK,
            axum::Json(post_to_json(&post, &st.storage, None)),
        )
            .into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// POST /api/admin/posts/:id/unhide - Restore a hidden post.
pub async fn unhide_post_handler(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Response {
    let st = state.lock().await;
    match content::set_post_hidden(&st.storage, id, false) {
        Ok(post) => (
            StatusCode::OK,
            axum::Json(post_to_json(&post, &st.storage, None)),
        )
            .into_response(),
        Err(e) => storage_error_response(e),
    }
}
