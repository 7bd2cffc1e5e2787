use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{
    comments_for_post, create_comment, delete_comment, get_comment, my_comments, update_comment,
};
use crate::presentation::http::middleware::auth::{
    jwt_auth_middleware, optional_auth_middleware,
};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/post/{post_id}", get(comments_for_post));

    let optional = Router::new()
        .route("/{id}", get(get_comment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/", post(create_comment))
        .route("/my-comments", get(my_comments))
        .route("/{id}", put(update_comment).delete(delete_comment))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(optional).merge(protected)
}
