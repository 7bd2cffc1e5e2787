use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::admin::{
    activate_user, approve_comment, dashboard_stats, deactivate_user, get_user, list_posts,
    list_users, pending_comments, pending_count, reject_comment, user_stats,
};
use crate::presentation::http::handlers::tags::{create_tag, delete_tag, tag_stats, update_tag};
use crate::presentation::http::middleware::admin::require_admin;
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

/// Every route here needs a valid token of an admin account.
pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/stats", get(user_stats))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/activate", post(activate_user))
        .route("/users/{id}/deactivate", post(deactivate_user))
        .route("/posts", get(list_posts))
        .route("/tags", post(create_tag))
        .route("/tags/stats", get(tag_stats))
        .route("/tags/{id}", put(update_tag).delete(delete_tag))
        .route("/comments/pending", get(pending_comments))
        .route("/comments/pending/count", get(pending_count))
        .route("/comments/{id}/approve", post(approve_comment))
        .route("/comments/{id}/reject", post(reject_comment))
        .route("/dashboard/stats", get(dashboard_stats))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
