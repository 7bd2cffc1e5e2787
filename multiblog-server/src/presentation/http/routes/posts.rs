use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, get_post, get_post_by_slug, list_posts, posts_by_author,
    publish_post, published_posts, search_posts, unpublish_post, update_post,
};
use crate::presentation::http::middleware::auth::{
    jwt_auth_middleware, optional_auth_middleware,
};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/published", get(published_posts))
        .route("/search", get(search_posts))
        .route("/author/{author_id}", get(posts_by_author));

    let optional = Router::new()
        .route("/", get(list_posts))
        .route("/{id}", get(get_post))
        .route("/slug/{slug}", get(get_post_by_slug))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/{id}", put(update_post).delete(delete_post))
        .route("/{id}/publish", post(publish_post))
        .route("/{id}/unpublish", post(unpublish_post))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(optional).merge(protected)
}
