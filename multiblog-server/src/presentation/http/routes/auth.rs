use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::auth::{
    change_password, get_profile, login, refresh, register, update_profile,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    let protected = Router::new()
        .route("/refresh", post(refresh))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/change-password", post(change_password))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
