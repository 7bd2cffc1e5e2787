use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::comment::{CommentStatus, CommentThread, CreateCommentRequest, UpdateCommentRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, ErrorEnvelope};
use crate::presentation::http::envelope::{
    ApiList, ApiResponse, ListReply, Reply, created, done, list, ok,
};
use crate::presentation::http::extract::{ApiJson, ApiPath, ApiQuery, PageQuery};
use crate::presentation::http::handlers::auth::AuthorDto;
use crate::presentation::http::middleware::auth::{AuthenticatedUser, MaybeUser};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCommentDto {
    #[validate(range(min = 1))]
    pub(crate) post_id: i64,
    /// Comment on the same post to reply to.
    #[validate(range(min = 1))]
    pub(crate) parent_id: Option<i64>,
    #[validate(length(min = 1, max = 1000))]
    pub(crate) content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateCommentDto {
    #[validate(length(min = 1, max = 1000))]
    pub(crate) content: Option<String>,
    /// Admins only; ignored for everyone else.
    pub(crate) status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) parent_id: Option<i64>,
    pub(crate) content: String,
    pub(crate) status: String,
    pub(crate) author: Option<AuthorDto>,
    #[schema(no_recursion)]
    pub(crate) replies: Vec<CommentDto>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<CommentThread> for CommentDto {
    fn from(thread: CommentThread) -> Self {
        let comment = thread.comment;
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            parent_id: comment.parent_id,
            content: comment.content,
            status: comment.status.to_string(),
            author: thread.author.map(AuthorDto::from),
            replies: thread.replies.into_iter().map(CommentDto::from).collect(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/comments",
    tag = "comments",
    security(("bearer_auth" = [])),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment submitted for moderation", body = ApiResponse<CommentDto>),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 404, description = "Post or parent comment not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn create_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(dto): ApiJson<CreateCommentDto>,
) -> AppResult<Reply<CommentDto>> {
    dto.validate()?;
    let req = CreateCommentRequest {
        post_id: dto.post_id,
        parent_id: dto.parent_id,
        content: dto.content,
    };

    let thread = state
        .comment_service
        .create_comment(&auth.actor(), req)
        .await?;
    Ok(created(
        "Comment submitted and awaiting moderation",
        thread.into(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/comments/post/{post_id}",
    tag = "comments",
    params(("post_id" = i64, Path, description = "Post id"), PageQuery),
    responses(
        (status = 200, description = "Approved threads, newest root first", body = ApiList<CommentDto>),
        (status = 404, description = "Post not found or not published", body = ErrorEnvelope)
    )
)]
pub(crate) async fn comments_for_post(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<ListReply<CommentDto>> {
    let page = state
        .comment_service
        .comments_for_post(post_id, query.page_request())
        .await?;
    Ok(list(page))
}

#[utoipa::path(
    get,
    path = "/api/comments/my-comments",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's comments in any status, newest first", body = ApiList<CommentDto>),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope)
    )
)]
pub(crate) async fn my_comments(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<ListReply<CommentDto>> {
    let page = state
        .comment_service
        .comments_by_author(auth.user_id, query.page_request())
        .await?;
    Ok(list(page))
}

#[utoipa::path(
    get,
    path = "/api/comments/{id}",
    tag = "comments",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment found", body = ApiResponse<CommentDto>),
        (status = 404, description = "Comment not found or not visible", body = ErrorEnvelope)
    )
)]
pub(crate) async fn get_comment(
    State(state): State<AppState>,
    caller: MaybeUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<CommentDto>> {
    let thread = state
        .comment_service
        .get_comment(id, caller.actor().as_ref())
        .await?;
    Ok(ok(thread.into()))
}

#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Comment id")),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<CommentDto>),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 403, description = "Not the author", body = ErrorEnvelope),
        (status = 404, description = "Comment not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(dto): ApiJson<UpdateCommentDto>,
) -> AppResult<Reply<CommentDto>> {
    dto.validate()?;
    let status = dto
        .status
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<CommentStatus>())
        .transpose()?;
    let req = UpdateCommentRequest {
        content: dto.content,
        status,
    };

    let thread = state
        .comment_service
        .update_comment(&auth.actor(), id, req)
        .await?;
    Ok(ok(thread.into()))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment and its replies deleted"),
        (status = 403, description = "Not the author", body = ErrorEnvelope),
        (status = 404, description = "Comment not found", body = ErrorEnvelope)
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Reply<()>> {
    state
        .comment_service
        .delete_comment(&auth.actor(), id)
        .await?;
    Ok(done("Comment deleted successfully"))
}
