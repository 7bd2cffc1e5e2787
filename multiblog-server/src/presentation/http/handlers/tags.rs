use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::stats::TagStats;
use crate::domain::tag::{CreateTagRequest, Tag, TagWithCount, UpdateTagRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, ErrorEnvelope};
use crate::presentation::http::envelope::{
    ApiList, ApiResponse, ListReply, Reply, created, done, list, ok,
};
use crate::presentation::http::extract::{ApiJson, ApiPath, ApiQuery, PageQuery};
use crate::presentation::http::handlers::posts::PostDto;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TagDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) color: String,
    /// Published posts carrying the tag; present on listings and single reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) posts_count: Option<i64>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<Tag> for TagDto {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
            description: tag.description,
            color: tag.color,
            posts_count: None,
            created_at: tag.created_at,
            updated_at: tag.updated_at,
        }
    }
}

impl From<TagWithCount> for TagDto {
    fn from(value: TagWithCount) -> Self {
        Self {
            posts_count: Some(value.posts_count),
            ..TagDto::from(value.tag)
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateTagDto {
    #[validate(length(min = 2, max = 50))]
    pub(crate) name: String,
    #[validate(length(max = 200))]
    pub(crate) description: Option<String>,
    /// `#RGB` or `#RRGGBB`, defaults to `#3B82F6`.
    pub(crate) color: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateTagDto {
    #[validate(length(min = 2, max = 50))]
    pub(crate) name: Option<String>,
    /// Empty string clears the description.
    #[validate(length(max = 200))]
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct PopularQuery {
    /// 1..=50, default 10.
    pub(crate) limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TagStatsDto {
    pub(crate) total: i64,
    pub(crate) used: i64,
    pub(crate) unused: i64,
    pub(crate) top: Vec<TagDto>,
}

impl From<TagStats> for TagStatsDto {
    fn from(stats: TagStats) -> Self {
        Self {
            total: stats.total,
            used: stats.used,
            unused: stats.unused,
            top: stats.top.into_iter().map(TagDto::from).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    params(PageQuery),
    responses(
        (status = 200, description = "Tags with published post counts, by name", body = ApiList<TagDto>)
    )
)]
pub(crate) async fn list_tags(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<ListReply<TagDto>> {
    let page = state.tag_service.list_tags(query.page_request()).await?;
    Ok(list(page))
}

#[utoipa::path(
    get,
    path = "/api/tags/all",
    tag = "tags",
    responses(
        (status = 200, description = "Every tag, by name", body = ApiResponse<Vec<TagDto>>)
    )
)]
pub(crate) async fn all_tags(State(state): State<AppState>) -> AppResult<Reply<Vec<TagDto>>> {
    let tags = state.tag_service.all_tags().await?;
    Ok(ok(tags.into_iter().map(TagDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/tags/popular",
    tag = "tags",
    params(PopularQuery),
    responses(
        (status = 200, description = "Most used tags", body = ApiResponse<Vec<TagDto>>),
        (status = 400, description = "Limit out of range", body = ErrorEnvelope)
    )
)]
pub(crate) async fn popular_tags(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PopularQuery>,
) -> AppResult<Reply<Vec<TagDto>>> {
    let tags = state.tag_service.popular_tags(query.limit).await?;
    Ok(ok(tags.into_iter().map(TagDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    tag = "tags",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag found", body = ApiResponse<TagDto>),
        (status = 404, description = "Tag not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn get_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<TagDto>> {
    let tag = state.tag_service.get_tag(id).await?;
    Ok(ok(tag.into()))
}

#[utoipa::path(
    get,
    path = "/api/tags/slug/{slug}",
    tag = "tags",
    params(("slug" = String, Path, description = "Tag slug")),
    responses(
        (status = 200, description = "Tag found", body = ApiResponse<TagDto>),
        (status = 404, description = "Tag not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn get_tag_by_slug(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> AppResult<Reply<TagDto>> {
    let tag = state.tag_service.get_tag_by_slug(&slug).await?;
    Ok(ok(tag.into()))
}

#[utoipa::path(
    get,
    path = "/api/tags/{id}/posts",
    tag = "tags",
    params(("id" = i64, Path, description = "Tag id"), PageQuery),
    responses(
        (status = 200, description = "Published posts with the tag", body = ApiList<PostDto>),
        (status = 404, description = "Tag not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn posts_by_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<ListReply<PostDto>> {
    let page = state
        .post_service
        .posts_by_tag(id, query.page_request())
        .await?;
    Ok(list(page))
}

#[utoipa::path(
    post,
    path = "/api/admin/tags",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateTagDto,
    responses(
        (status = 201, description = "Tag created", body = ApiResponse<TagDto>),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 403, description = "Admin access required", body = ErrorEnvelope),
        (status = 409, description = "Tag name already exists", body = ErrorEnvelope)
    )
)]
pub(crate) async fn create_tag(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<CreateTagDto>,
) -> AppResult<Reply<TagDto>> {
    dto.validate()?;

    let req = CreateTagRequest {
        name: dto.name,
        description: dto.description,
        color: dto.color,
    };

    let tag = state.tag_service.create_tag(req).await?;
    Ok(created("Tag created successfully", tag.into()))
}

#[utoipa::path(
    put,
    path = "/api/admin/tags/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Tag id")),
    request_body = UpdateTagDto,
    responses(
        (status = 200, description = "Tag updated", body = ApiResponse<TagDto>),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 404, description = "Tag not found", body = ErrorEnvelope),
        (status = 409, description = "Tag name already exists", body = ErrorEnvelope)
    )
)]
pub(crate) async fn update_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(dto): ApiJson<UpdateTagDto>,
) -> AppResult<Reply<TagDto>> {
    dto.validate()?;

    let req = UpdateTagRequest {
        name: dto.name,
        description: dto.description,
        color: dto.color,
    };

    let tag = state.tag_service.update_tag(id, req).await?;
    Ok(ok(tag.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag deleted"),
        (status = 404, description = "Tag not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn delete_tag(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<()>> {
    state.tag_service.delete_tag(id).await?;
    Ok(done("Tag deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/api/admin/tags/stats",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tag usage statistics", body = ApiResponse<TagStatsDto>)
    )
)]
pub(crate) async fn tag_stats(State(state): State<AppState>) -> AppResult<Reply<TagStatsDto>> {
    let stats = state.tag_service.tag_stats().await?;
    Ok(ok(stats.into()))
}
