//! User registration, profiles, and follow handlers.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::graph::{self, FollowToggle};
use crate::server::state::SharedState;
use crate::server::utils::{
    acting_user, api_error, now_secs, profile_to_json, storage_error_response, user_summary_json,
};
use crate::storage::UserRow;

#[derive(Deserialize)]
pub struct RegisterRequest {
    email: String,
    username: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    bio: Option<String>,
    avatar_ref: Option<String>,
}

/// POST /api/users/register - Create a user account with its profile.
pub async fn register_handler(
    State(state): State<SharedState>,
    axum::Json(req): axum::Json<RegisterRequest>,
) -> Response {
    let email = req.email.trim().to_string();
    let username = req.username.trim().to_string();
    if email.is_empty() || username.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "email and username are required");
    }

    let st = state.lock().await;
    let row = UserRow {
        id: 0,
        email,
        username,
        created_at: now_secs(),
    };
    match st.storage.insert_user_with_profile(&row) {
        Ok(id) => {
            crate::mlog!(
                "register: {} (id={})",
                crate::logging::user_tag(&row.username),
                id
            );
            let json = serde_json::json!({
                "id": id,
                "username": row.username,
                "email": row.email,
            });
            (StatusCode::CREATED, axum::Json(json)).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/users/:username - Public profile with follow counts.
pub async fn get_user_profile_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    let st = state.lock().await;
    match st.storage.get_user_by_username(&username) {
        Ok(Some(user)) => (
            StatusCode::OK,
            axum::Json(profile_to_json(&user, &st.storage)),
        )
            .into_response(),
        Ok(None) => api_error(StatusCode::NOT_FOUND, "user not found"),
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/profile - The acting user's own profile.
pub async fn get_own_profile_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    (
        StatusCode::OK,
        axum::Json(profile_to_json(&user, &st.storage)),
    )
        .into_response()
}

/// PUT /api/profile - Update the acting user's bio / avatar reference.
pub async fn update_own_profile_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    axum::Json(req): axum::Json<UpdateProfileRequest>,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match st
        .storage
        .update_profile(user.id, req.bio.as_deref(), req.avatar_ref.as_deref())
    {
        Ok(_) => (
            StatusCode::OK,
            axum::Json(profile_to_json(&user, &st.storage)),
        )
            .into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// DELETE /api/profile - Delete the acting user's account.  Everything the
/// account owns cascades.
pub async fn delete_account_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let user = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match st.storage.delete_user(user.id) {
        Ok(_) => {
            crate::mlog!(
                "account: {} deleted",
                crate::logging::user_tag(&user.username)
            );
            let json = serde_json::json!({ "message": "account deleted" });
            (StatusCode::OK, axum::Json(json)).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// POST /api/users/:username/follow - Toggle the follow edge from the
/// acting user to the named user.
pub async fn follow_toggle_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Response {
    let st = state.lock().await;
    let actor = match acting_user(&headers, &st.storage) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let target = match st.storage.get_user_by_username(&username) {
        Ok(Some(u)) => u,
        Ok(None) => return api_error(StatusCode::NOT_FOUND, "user not found"),
        Err(e) => return storage_error_response(e),
    };

    match graph::toggle_follow(&st.storage, actor.id, target.id) {
        Ok(outcome) => {
            let is_followed = outcome == FollowToggle::Followed;
            let message = if is_followed {
                format!("now following {}", target.username)
            } else {
                format!("unfollowed {}", target.username)
            };
            let json = serde_json::json!({
                "message": message,
                "is_followed": is_followed,
            });
            (StatusCode::OK, axum::Json(json)).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/users/:username/followers
pub async fn list_followers_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    let st = state.lock().await;
    let user = match st.storage.get_user_by_username(&username) {
        Ok(Some(u)) => u,
        Ok(None) => return api_error(StatusCode::NOT_FOUND, "user not found"),
        Err(e) => return storage_error_response(e),
    };
    match graph::followers(&st.storage, user.id) {
        Ok(users) => {
            let json: Vec<serde_json::Value> = users.iter().map(user_summary_json).collect();
            (StatusCode::OK, axum::Json(serde_json::json!(json))).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/users/:username/following
pub async fn list_following_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    let st = state.lock().await;
    let user = match st.storage.get_user_by_username(&username) {
        Ok(Some(u)) => u,
        Ok(None) => return api_error(StatusCode::NOT_FOUND, "user not found"),
        Err(e) => return storage_error_response(e),
    };
    match graph::following(&st.storage, user.id) {
        Ok(users) => {
            let json: Vec<serde_json::Value> = users.iter().map(user_summary_json).collect();
            (StatusCode::OK, axum::Json(serde_json::json!(json))).into_response()
        }
        Err(e) => storage_error_response(e),
    }
}
