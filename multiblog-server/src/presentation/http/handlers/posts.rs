use std::sync::Arc;

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::pagination::PageRequest;
use crate::domain::post::{CreatePostRequest, PostDetails, PostStatus, UpdatePostRequest};
use crate::presentation::http::app_error::{AppResult, ErrorEnvelope};
use crate::presentation::http::envelope::{
    ApiList, ApiResponse, ListReply, Reply, created, done, list, ok,
};
use crate::presentation::http::extract::{ApiJson, ApiPath, ApiQuery, PageQuery, lenient_number};
use crate::presentation::http::handlers::auth::AuthorDto;
use crate::presentation::http::handlers::tags::TagDto;
use crate::presentation::http::middleware::auth::{AuthenticatedUser, MaybeUser};
use crate::presentation::{AppPostService, AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 5, max = 200))]
    pub(crate) title: String,
    #[validate(length(min = 10))]
    pub(crate) content: String,
    /// Derived from the content when absent.
    #[validate(length(max = 500))]
    pub(crate) excerpt: Option<String>,
    pub(crate) featured_image: Option<String>,
    /// `draft` (default), `published` or `archived`.
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) tag_ids: Vec<i64>,
}

/// Absent fields are left untouched. `tag_ids: []` clears the tags,
/// `featured_image: ""` clears the image.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 5, max = 200))]
    pub(crate) title: Option<String>,
    #[validate(length(min = 10))]
    pub(crate) content: Option<String>,
    #[validate(length(max = 500))]
    pub(crate) excerpt: Option<String>,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) tag_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ListPostsQuery {
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) per_page: Option<u32>,
    /// Honoured for admins and for callers listing their own posts.
    pub(crate) status: Option<String>,
    pub(crate) author_id: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct SearchQuery {
    /// Case-insensitive substring of title, content or excerpt.
    pub(crate) q: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) per_page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) excerpt: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: String,
    pub(crate) view_count: i64,
    /// Approved comments only.
    pub(crate) comment_count: i64,
    pub(crate) author_id: i64,
    pub(crate) author: Option<AuthorDto>,
    pub(crate) tags: Vec<TagDto>,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<PostDetails> for PostDto {
    fn from(details: PostDetails) -> Self {
        let post = details.post;
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            content: post.content,
            excerpt: post.excerpt,
            featured_image: post.featured_image,
            status: post.status.to_string(),
            view_count: post.view_count,
            comment_count: details.comment_count,
            author_id: post.author_id,
            author: details.author.map(AuthorDto::from),
            tags: details.tags.into_iter().map(TagDto::from).collect(),
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

pub(crate) fn parse_status(raw: Option<String>) -> AppResult<Option<PostStatus>> {
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<PostStatus>())
        .transpose()?)
}

/// Counts a view of a published post without delaying the response.
fn spawn_view_increment(service: Arc<AppPostService>, details: &PostDetails) {
    if details.post.status != PostStatus::Published {
        return;
    }
    let post_id = details.post.id;
    tokio::spawn(async move {
        if let Err(err) = service.increment_view_count(post_id).await {
            warn!(post_id, error = %err, "failed to record post view");
        }
    });
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Posts listed, newest first", body = ApiList<PostDto>),
        (status = 400, description = "Validation error", body = ErrorEnvelope)
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    caller: MaybeUser,
    ApiQuery(query): ApiQuery<ListPostsQuery>,
) -> AppResult<ListReply<PostDto>> {
    let status = parse_status(query.status)?;
    let page = PageRequest::new(query.page, query.per_page);

    let result = state
        .post_service
        .list_posts(caller.actor().as_ref(), status, query.author_id, page)
        .await?;
    Ok(list(result))
}

#[utoipa::path(
    get,
    path = "/api/posts/published",
    tag = "posts",
    params(PageQuery),
    responses(
        (status = 200, description = "Published feed, newest publication first", body = ApiList<PostDto>)
    )
)]
pub(crate) async fn published_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<ListReply<PostDto>> {
    let result = state
        .post_service
        .published_posts(query.page_request())
        .await?;
    Ok(list(result))
}

#[utoipa::path(
    get,
    path = "/api/posts/search",
    tag = "posts",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching published posts", body = ApiList<PostDto>),
        (status = 400, description = "Empty query", body = ErrorEnvelope)
    )
)]
pub(crate) async fn search_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> AppResult<ListReply<PostDto>> {
    let page = PageRequest::new(query.page, query.per_page);
    let result = state
        .post_service
        .search_posts(query.q.as_deref().unwrap_or_default(), page)
        .await?;
    Ok(list(result))
}

#[utoipa::path(
    get,
    path = "/api/posts/author/{author_id}",
    tag = "posts",
    params(("author_id" = i64, Path, description = "Author id"), PageQuery),
    responses(
        (status = 200, description = "Published posts of the author", body = ApiList<PostDto>)
    )
)]
pub(crate) async fn posts_by_author(
    State(state): State<AppState>,
    ApiPath(author_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<ListReply<PostDto>> {
    let result = state
        .post_service
        .posts_by_author(author_id, query.page_request())
        .await?;
    Ok(list(result))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post found", body = ApiResponse<PostDto>),
        (status = 404, description = "Post not found or not visible", body = ErrorEnvelope)
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    caller: MaybeUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<PostDto>> {
    let details = state
        .post_service
        .get_post(id, caller.actor().as_ref())
        .await?;
    spawn_view_increment(state.post_service.clone(), &details);
    Ok(ok(details.into()))
}

#[utoipa::path(
    get,
    path = "/api/posts/slug/{slug}",
    tag = "posts",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post found", body = ApiResponse<PostDto>),
        (status = 404, description = "Post not found or not visible", body = ErrorEnvelope)
    )
)]
pub(crate) async fn get_post_by_slug(
    State(state): State<AppState>,
    caller: MaybeUser,
    ApiPath(slug): ApiPath<String>,
) -> AppResult<Reply<PostDto>> {
    let details = state
        .post_service
        .get_post_by_slug(&slug, caller.actor().as_ref())
        .await?;
    spawn_view_increment(state.post_service.clone(), &details);
    Ok(ok(details.into()))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(("bearer_auth" = [])),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = ApiResponse<PostDto>),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope)
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(dto): ApiJson<CreatePostDto>,
) -> AppResult<Reply<PostDto>> {
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
        excerpt: dto.excerpt,
        featured_image: dto.featured_image,
        status: parse_status(dto.status)?.unwrap_or(PostStatus::Draft),
        tag_ids: dto.tag_ids,
    };

    let details = state.post_service.create_post(&auth.actor(), req).await?;
    Ok(created("Post created successfully", details.into()))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<PostDto>),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 403, description = "Not the author", body = ErrorEnvelope),
        (status = 404, description = "Post not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(dto): ApiJson<UpdatePostDto>,
) -> AppResult<Reply<PostDto>> {
    dto.validate()?;
    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
        excerpt: dto.excerpt,
        featured_image: dto.featured_image,
        status: parse_status(dto.status)?,
        tag_ids: dto.tag_ids,
    };

    let details = state
        .post_service
        .update_post(&auth.actor(), id, req)
        .await?;
    Ok(ok(details.into()))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 403, description = "Not the author", body = ErrorEnvelope),
        (status = 404, description = "Post not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<()>> {
    state.post_service.delete_post(&auth.actor(), id).await?;
    Ok(done("Post deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/publish",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post published", body = ApiResponse<PostDto>),
        (status = 403, description = "Not the author", body = ErrorEnvelope),
        (status = 404, description = "Post not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn publish_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<PostDto>> {
    let details = state.post_service.publish(&auth.actor(), id).await?;
    Ok(ok(details.into()))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/unpublish",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post moved back to draft", body = ApiResponse<PostDto>),
        (status = 403, description = "Not the author", body = ErrorEnvelope),
        (status = 404, description = "Post not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn unpublish_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<PostDto>> {
    let details = state.post_service.unpublish(&auth.actor(), id).await?;
    Ok(ok(details.into()))
}

#[cfg(test)]
mod tests {
    use super::{UpdatePostDto, parse_status};
    use crate::domain::post::PostStatus;

    #[test]
    fn status_query_is_optional_and_parsed() {
        assert_eq!(parse_status(None).expect("absent"), None);
        assert_eq!(parse_status(Some(" ".to_string())).expect("blank"), None);
        assert_eq!(
            parse_status(Some("Archived".to_string())).expect("valid"),
            Some(PostStatus::Archived)
        );
        assert!(parse_status(Some("deleted".to_string())).is_err());
    }

    #[test]
    fn update_distinguishes_absent_and_empty_tag_ids() {
        let absent: UpdatePostDto = serde_json::from_str(r#"{"title":"New title"}"#).expect("json");
        assert!(absent.tag_ids.is_none());

        let empty: UpdatePostDto = serde_json::from_str(r#"{"tag_ids":[]}"#).expect("json");
        assert_eq!(empty.tag_ids, Some(vec![]));
    }
}
