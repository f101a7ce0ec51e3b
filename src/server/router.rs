//! Axum router construction.

use axum::routing::{get, post};
use axum::Router;

use crate::server::handlers;
use crate::server::state::SharedState;

/// Build the complete Axum router with all API routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(handlers::health::health_handler))
        // Users API
        .route(
            "/api/users/register",
            post(handlers::users::register_handler),
        )
        .route(
            "/api/users/:username",
            get(handlers::users::get_user_profile_handler),
        )
        .route(
            "/api/users/:username/follow",
            post(handlers::users::follow_toggle_handler),
        )
        .route(
            "/api/users/:username/followers",
            get(handlers::users::list_followers_handler),
        )
        .route(
            "/api/users/:username/following",
            get(handlers::users::list_following_handler),
        )
        .route(
            "/api/profile",
            get(handlers::users::get_own_profile_handler)
                .put(handlers::users::update_own_profile_handler)
                .delete(handlers::users::delete_account_handler),
        )
        // Posts API
        .route(
            "/api/posts",
            get(handlers::posts::list_posts_handler).post(handlers::posts::create_post_handler),
        )
        .route(
            "/api/posts/trending",
            get(handlers::posts::trending_handler),
        )
        .route(
            "/api/posts/:id",
            get(handlers::posts::get_post_handler)
                .put(handlers::posts::update_post_handler)
                .delete(handlers::posts::delete_post_handler),
        )
        .route(
            "/api/posts/:id/like",
            post(handlers::posts::like_toggle_handler),
        )
        .route("/api/feed", get(handlers::posts::feed_handler))
        // Comments API
        .route(
            "/api/posts/:id/comments",
            get(handlers::comments::list_comments_handler)
                .post(handlers::comments::create_comment_handler),
        )
        .route(
            "/api/comments/:id",
            get(handlers::comments::get_comment_handler)
                .delete(handlers::comments::delete_comment_handler),
        )
        .route(
            "/api/comments/:id/replies",
            get(handlers::comments::list_replies_handler),
        )
        // Notifications API
        .route(
            "/api/notifications",
            get(handlers::notifications::list_notifications_handler),
        )
        .route(
            "/api/notifications/unread-count",
            get(handlers::notifications::unread_count_handler),
        )
        .route(
            "/api/notifications/read-all",
            post(handlers::notifications::mark_all_read_handler),
        )
        .route(
            "/api/notifications/:id/read",
            post(handlers::notifications::mark_read_handler),
        )
        // Moderation API
        .route(
            "/api/admin/posts",
            get(handlers::admin::list_all_posts_handler),
        )
        .route(
            "/api/admin/posts/:id/hide",
            post(handlers::admin::hide_post_handler),
        )
        .route(
            "/api/admin/posts/:id/unhide",
            post(handlers::admin::unhide_post_handler),
        )
        .with_state(state)
}
