use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::handlers::health::healthz;

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod posts;
pub(crate) mod tags;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api/auth", auth::router(state.clone()))
        .nest("/api/posts", posts::router(state.clone()))
        .nest("/api/tags", tags::router())
        .nest("/api/comments", comments::router(state.clone()))
        .nest("/api/admin", admin::router(state))
}
