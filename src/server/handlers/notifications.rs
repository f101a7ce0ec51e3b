//! Notification inbox handlers.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::notify;
use crate::server::config::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use crate::server::state::SharedState;
use crate::server::utils::{acting_user, notification_to_json, storage_error_response};

#[derive(Deserialize)]
pub struct ListNotificationsQuery {
    limit: Option<u32>,
}

/// GET /api/notifications - The acting user's notifications, newest first.
pub async fn list_notifications_handler(
    State(state): State<SharedState>,
    Query(params): Query<ListNotificationsQuery>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);

    match notify::inbox(&st.storage, user.id, limit) {
        Ok(notifications) => {
            let json: Vec<serde_json::Value> = notifications
                .iter()
                .map(|n| notification_to_json(n, &st.storage))
                .collect();
            (StatusCode::OK, axum::Json(serde_json::json!(json))).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// POST /api/notifications/:id/read - Mark one notification as read.
pub async fn mark_read_handler(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match notify::mark_read(&st.storage, id, user.id) {
        Ok(()) => {
            let json = serde_json::json!({
                "message": "notification marked as read",
                "id": id,
            });
            (StatusCode::OK, axum::Json(json)).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// POST /api/notifications/read-all - Mark all unread notifications as read.
pub async fn mark_all_read_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match notify::mark_all_read(&st.storage, user.id) {
        Ok(count) => {
            let json = serde_json::json!({
                "message": "all notifications marked as read",
                "marked_read": count,
            });
            (StatusCode::OK, axum::Json(json)).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/notifications/unread-count
pub async fn unread_count_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match notify::unread_count(&st.storage, user.id) {
        Ok(count) => {
            let json = serde_json::json!({ "unread_count": count });
            (StatusCode::OK, axum::Json(json)).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}
