//! Post, like, feed, and trending handlers.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::content;
use crate::feed::{self, PostOrder};
use crate::server::config::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use crate::server::state::SharedState;
use crate::server::utils::{
    acting_user, api_error, maybe_acting_user, post_to_json, storage_error_response,
};

#[derive(Deserialize)]
pub struct ListPostsQuery {
    sort: Option<String>,
    limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    caption: Option<String>,
    image_ref: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePostRequest {
    caption: Option<String>,
}

fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT)
}

/// GET /api/posts - Full post collection, recency or popularity order.
pub async fn list_posts_handler(
    State(state): State<SharedState>,
    Query(params): Query<ListPostsQuery>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let order = PostOrder::from_param(params.sort.as_deref());
    let viewer = maybe_acting_user(&headers, &st.storage).map(|u| u.id);

    match feed::list_posts(&st.storage, order, clamp_limit(params.limit)) {
        Ok(posts) => {
            let json: Vec<serde_json::Value> = posts
                .iter()
                .map(|p| post_to_json(p, &st.storage, viewer))
                .collect();
            (StatusCode::OK, axum::Json(serde_json::json!(json))).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// POST /api/posts - Create a post.
pub async fn create_post_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    axum::Json(req): axum::Json<CreatePostRequest>,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match content::create_post(&st.storage, user.id, req.caption, req.image_ref) {
        Ok(post) => (
            StatusCode::CREATED,
            axum::Json(post_to_json(&post, &st.storage, Some(user.id))),
        )
            .into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/posts/:id
pub async fn get_post_handler(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let viewer = maybe_acting_user(&headers, &st.storage).map(|u| u.id);
    match st.storage.get_post(id) {
        Ok(Some(post)) if !post.hidden => (
            StatusCode::OK,
            axum::Json(post_to_json(&post, &st.storage, viewer)),
        )
            .into_response(),
        Ok(_) => api_error(StatusCode::NOT_FOUND, "post not found"),
        Err(e) => storage_error_response(e),
    }
}

/// PUT /api/posts/:id - Update caption. Author only.
pub async fn update_post_handler(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    axum::Json(req): axum::Json<UpdatePostRequest>,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match content::update_post(&st.storage, id, user.id, req.caption) {
        Ok(post) => (
            StatusCode::OK,
            axum::Json(post_to_json(&post, &st.storage, Some(user.id))),
        )
            .into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// DELETE /api/posts/:id - Author only.
pub async fn delete_post_handler(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match content::delete_post(&st.storage, id, user.id) {
        Ok(()) => {
            let json = serde_json::json!({ "message": "post deleted" });
            (StatusCode::OK, axum::Json(json)).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// POST /api/posts/:id/like - Toggle the acting user's like.
pub async fn like_toggle_handler(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match content::toggle_like(&st.storage, id, user.id) {
        Ok(outcome) => {
            let message = if outcome.liked { "liked" } else { "unliked" };
            let json = serde_json::json!({
                "message": message,
                "is_liked": outcome.liked,
                "like_count": outcome.like_count,
            });
            (StatusCode::OK, axum::Json(json)).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/posts/trending - Global like-count ranking; no identity needed.
pub async fn trending_handler(
    State(state): State<SharedState>,
    Query(params): Query<ListQuery>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let viewer = maybe_acting_user(&headers, &st.storage).map(|u| u.id);
    match feed::trending(&st.storage, clamp_limit(params.limit)) {
        Ok(posts) => {
            let json: Vec<serde_json::Value> = posts
                .iter()
                .map(|p| post_to_json(p, &st.storage, viewer))
                .collect();
            (StatusCode::OK, axum::Json(serde_json::json!(json))).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/feed - The acting user's home feed.
pub async fn feed_handler(
    State(state): State<SharedState>,
    Query(params): Query<ListQuery>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match feed::build_feed(&st.storage, user.id, clamp_limit(params.limit)) {
        Ok(posts) => {
            let json: Vec<serde_json::Value> = posts
                .iter()
                .map(|p| post_to_json(p, &st.storage, Some(user.id)))
                .collect();
            (StatusCode::OK, axum::Json(serde_json::json!(json))).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}
