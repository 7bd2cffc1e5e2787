use axum::extract::State;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::pagination::PageRequest;
use crate::domain::stats::{CommentStats, DashboardStats, PostStats, UserStats};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, ErrorEnvelope};
use crate::presentation::http::envelope::{ApiList, ApiResponse, ListReply, Reply, list, ok};
use crate::presentation::http::extract::{ApiPath, ApiQuery, PageQuery};
use crate::presentation::http::handlers::auth::UserDto;
use crate::presentation::http::handlers::comments::CommentDto;
use crate::presentation::http::handlers::posts::{ListPostsQuery, PostDto, parse_status};
use crate::presentation::http::handlers::tags::TagStatsDto;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserStatsDto {
    pub(crate) total: i64,
    pub(crate) active: i64,
    pub(crate) inactive: i64,
    pub(crate) admins: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostStatsDto {
    pub(crate) total: i64,
    pub(crate) drafts: i64,
    pub(crate) published: i64,
    pub(crate) archived: i64,
    pub(crate) total_views: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentStatsDto {
    pub(crate) total: i64,
    pub(crate) pending: i64,
    pub(crate) approved: i64,
    pub(crate) rejected: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DashboardStatsDto {
    pub(crate) users: UserStatsDto,
    pub(crate) posts: PostStatsDto,
    pub(crate) comments: CommentStatsDto,
    pub(crate) tags: TagStatsDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PendingCountDto {
    pub(crate) count: i64,
}

impl From<UserStats> for UserStatsDto {
    fn from(stats: UserStats) -> Self {
        Self {
            total: stats.total,
            active: stats.active,
            inactive: stats.inactive,
            admins: stats.admins,
        }
    }
}

impl From<PostStats> for PostStatsDto {
    fn from(stats: PostStats) -> Self {
        Self {
            total: stats.total,
            drafts: stats.drafts,
            published: stats.published,
            archived: stats.archived,
            total_views: stats.total_views,
        }
    }
}

impl From<CommentStats> for CommentStatsDto {
    fn from(stats: CommentStats) -> Self {
        Self {
            total: stats.total,
            pending: stats.pending,
            approved: stats.approved,
            rejected: stats.rejected,
        }
    }
}

impl From<DashboardStats> for DashboardStatsDto {
    fn from(stats: DashboardStats) -> Self {
        Self {
            users: stats.users.into(),
            posts: stats.posts.into(),
            comments: stats.comments.into(),
            tags: stats.tags.into(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Users, newest first", body = ApiList<UserDto>),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 403, description = "Admin access required", body = ErrorEnvelope)
    )
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<ListReply<UserDto>> {
    let page = state.user_service.list_users(query.page_request()).await?;
    Ok(list(page))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/stats",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User counts", body = ApiResponse<UserStatsDto>),
        (status = 403, description = "Admin access required", body = ErrorEnvelope)
    )
)]
pub(crate) async fn user_stats(State(state): State<AppState>) -> AppResult<Reply<UserStatsDto>> {
    let stats = state.user_service.user_stats().await?;
    Ok(ok(stats.into()))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserDto>),
        (status = 404, description = "User not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<UserDto>> {
    let user = state.user_service.get_user(id).await?;
    Ok(ok(user.into()))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/activate",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User activated", body = ApiResponse<UserDto>),
        (status = 404, description = "User not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn activate_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<UserDto>> {
    let user = state.user_service.activate_user(id).await?;
    Ok(ok(user.into()))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/deactivate",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deactivated", body = ApiResponse<UserDto>),
        (status = 400, description = "Cannot deactivate own account", body = ErrorEnvelope),
        (status = 404, description = "User not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn deactivate_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<UserDto>> {
    let user = state
        .user_service
        .deactivate_user(&auth.actor(), id)
        .await?;
    Ok(ok(user.into()))
}

#[utoipa::path(
    get,
    path = "/api/admin/posts",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Posts in any status, newest first", body = ApiList<PostDto>),
        (status = 403, description = "Admin access required", body = ErrorEnvelope)
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiQuery(query): ApiQuery<ListPostsQuery>,
) -> AppResult<ListReply<PostDto>> {
    let status = parse_status(query.status)?;
    let page = PageRequest::new(query.page, query.per_page);

    let result = state
        .post_service
        .list_posts(Some(&auth.actor()), status, query.author_id, page)
        .await?;
    Ok(list(result))
}

#[utoipa::path(
    get,
    path = "/api/admin/comments/pending",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Moderation queue, oldest first", body = ApiList<CommentDto>),
        (status = 403, description = "Admin access required", body = ErrorEnvelope)
    )
)]
pub(crate) async fn pending_comments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<ListReply<CommentDto>> {
    let page = state
        .comment_service
        .pending_comments(query.page_request())
        .await?;
    Ok(list(page))
}

#[utoipa::path(
    get,
    path = "/api/admin/comments/pending/count",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Size of the moderation queue", body = ApiResponse<PendingCountDto>)
    )
)]
pub(crate) async fn pending_count(
    State(state): State<AppState>,
) -> AppResult<Reply<PendingCountDto>> {
    let count = state.comment_service.pending_count().await?;
    Ok(ok(PendingCountDto { count }))
}

#[utoipa::path(
    post,
    path = "/api/admin/comments/{id}/approve",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment approved", body = ApiResponse<CommentDto>),
        (status = 404, description = "Comment not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn approve_comment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<CommentDto>> {
    let thread = state.comment_service.approve_comment(id).await?;
    Ok(ok(thread.into()))
}

#[utoipa::path(
    post,
    path = "/api/admin/comments/{id}/reject",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment rejected", body = ApiResponse<CommentDto>),
        (status = 404, description = "Comment not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn reject_comment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<CommentDto>> {
    let thread = state.comment_service.reject_comment(id).await?;
    Ok(ok(thread.into()))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard/stats",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counts across users, posts, comments and tags", body = ApiResponse<DashboardStatsDto>),
        (status = 403, description = "Admin access required", body = ErrorEnvelope)
    )
)]
pub(crate) async fn dashboard_stats(
    State(state): State<AppState>,
) -> AppResult<Reply<DashboardStatsDto>> {
    let stats = state.admin_service.dashboard_stats().await?;
    Ok(ok(stats.into()))
}
