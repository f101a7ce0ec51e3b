//! Comment and reply handlers.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::content;
use crate::server::state::SharedState;
use crate::server::utils::{acting_user, api_error, comment_to_json, storage_error_response};

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    body: String,
    parent_id: Option<i64>,
}

/// GET /api/posts/:id/comments - Top-level comments with reply counts.
pub async fn list_comments_handler(
    State(state): State<SharedState>,
    Path(post_id): Path<i64>,
) -> Response {
    let st = state.lock().await;
    match st.storage.get_post(post_id) {
        Ok(Some(post)) if !post.hidden => {}
        Ok(_) => return api_error(StatusCode::NOT_FOUND, "post not found"),
        Err(e) => return storage_error_response(e),
    }
    match st.storage.list_top_level_comments(post_id) {
        Ok(comments) => {
            let json: Vec<serde_json::Value> = comments
                .iter()
                .map(|c| comment_to_json(c, &st.storage))
                .collect();
            (StatusCode::OK, axum::Json(serde_json::json!(json))).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// POST /api/posts/:id/comments - Comment on a post, optionally replying to
/// another comment on the same post.
pub async fn create_comment_handler(
    State(state): State<SharedState>,
    Path(post_id): Path<i64>,
    headers: HeaderMap,
    axum::Json(req): axum::Json<CreateCommentRequest>,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match content::create_comment(&st.storage, post_id, user.id, &req.body, req.parent_id) {
        Ok(comment) => (
            StatusCode::CREATED,
            axum::Json(comment_to_json(&comment, &st.storage)),
        )
            .into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/comments/:id
pub async fn get_comment_handler(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Response {
    let st = state.lock().await;
    match st.storage.get_comment(id) {
        Ok(Some(comment)) => (
            StatusCode::OK,
            axum::Json(comment_to_json(&comment, &st.storage)),
        )
            .into_response(),
        Ok(None) => api_error(StatusCode::NOT_FOUND, "comment not found"),
        Err(e) => storage_error_response(e),
    }
}

/// DELETE /api/comments/:id - Author only; replies cascade.
pub async fn delete_comment_handler(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match content::delete_comment(&st.storage, id, user.id) {
        Ok(()) => {
            let json = serde_json::json!({ "message": "comment deleted" });
            (StatusCode::OK, axum::Json(json)).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/comments/:id/replies - Direct replies to a comment.
pub async fn list_replies_handler(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Response {
    let st = state.lock().await;
    match st.storage.get_comment(id) {
        Ok(Some(_)) => {}
        Ok(None) => return api_error(StatusCode::NOT_FOUND, "comment not found"),
        Err(e) => return storage_error_response(e),
    }
    match st.storage.list_replies(id) {
        Ok(replies) => {
            let json: Vec<serde_json::Value> = replies
                .iter()
                .map(|c| comment_to_json(c, &st.storage))
                .collect();
            (StatusCode::OK, axum::Json(serde_json::json!(json))).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}
