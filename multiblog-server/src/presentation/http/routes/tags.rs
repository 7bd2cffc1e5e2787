use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::handlers::tags::{
    all_tags, get_tag, get_tag_by_slug, list_tags, popular_tags, posts_by_tag,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags))
        .route("/all", get(all_tags))
        .route("/popular", get(popular_tags))
        .route("/slug/{slug}", get(get_tag_by_slug))
        .route("/{id}", get(get_tag))
        .route("/{id}/posts", get(posts_by_tag))
}
