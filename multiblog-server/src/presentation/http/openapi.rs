use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::app_error::{ErrorBody, ErrorEnvelope, FieldError};
use crate::presentation::http::envelope::PaginationMeta;
use crate::presentation::http::handlers::admin::{
    CommentStatsDto, DashboardStatsDto, PendingCountDto, PostStatsDto, UserStatsDto,
};
use crate::presentation::http::handlers::auth::{
    AuthResponseDto, AuthorDto, ChangePasswordDto, LoginDto, RegisterDto, UpdateProfileDto,
    UserDto,
};
use crate::presentation::http::handlers::comments::{
    CommentDto, CreateCommentDto, UpdateCommentDto,
};
use crate::presentation::http::handlers::health::HealthDto;
use crate::presentation::http::handlers::posts::{CreatePostDto, PostDto, UpdatePostDto};
use crate::presentation::http::handlers::tags::{CreateTagDto, TagDto, TagStatsDto, UpdateTagDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::health::healthz,
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::auth::refresh,
        crate::presentation::http::handlers::auth::get_profile,
        crate::presentation::http::handlers::auth::update_profile,
        crate::presentation::http::handlers::auth::change_password,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::published_posts,
        crate::presentation::http::handlers::posts::search_posts,
        crate::presentation::http::handlers::posts::posts_by_author,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::get_post_by_slug,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::posts::publish_post,
        crate::presentation::http::handlers::posts::unpublish_post,
        crate::presentation::http::handlers::tags::list_tags,
        crate::presentation::http::handlers::tags::all_tags,
        crate::presentation::http::handlers::tags::popular_tags,
        crate::presentation::http::handlers::tags::get_tag,
        crate::presentation::http::handlers::tags::get_tag_by_slug,
        crate::presentation::http::handlers::tags::posts_by_tag,
        crate::presentation::http::handlers::tags::create_tag,
        crate::presentation::http::handlers::tags::update_tag,
        crate::presentation::http::handlers::tags::delete_tag,
        crate::presentation::http::handlers::tags::tag_stats,
        crate::presentation::http::handlers::comments::create_comment,
        crate::presentation::http::handlers::comments::comments_for_post,
        crate::presentation::http::handlers::comments::my_comments,
        crate::presentation::http::handlers::comments::get_comment,
        crate::presentation::http::handlers::comments::update_comment,
        crate::presentation::http::handlers::comments::delete_comment,
        crate::presentation::http::handlers::admin::list_users,
        crate::presentation::http::handlers::admin::user_stats,
        crate::presentation::http::handlers::admin::get_user,
        crate::presentation::http::handlers::admin::activate_user,
        crate::presentation::http::handlers::admin::deactivate_user,
        crate::presentation::http::handlers::admin::list_posts,
        crate::presentation::http::handlers::admin::pending_comments,
        crate::presentation::http::handlers::admin::pending_count,
        crate::presentation::http::handlers::admin::approve_comment,
        crate::presentation::http::handlers::admin::reject_comment,
        crate::presentation::http::handlers::admin::dashboard_stats
    ),
    components(
        schemas(
            ErrorEnvelope,
            ErrorBody,
            FieldError,
            PaginationMeta,
            HealthDto,
            RegisterDto,
            LoginDto,
            UpdateProfileDto,
            ChangePasswordDto,
            AuthResponseDto,
            UserDto,
            AuthorDto,
            CreatePostDto,
            UpdatePostDto,
            PostDto,
            CreateTagDto,
            UpdateTagDto,
            TagDto,
            TagStatsDto,
            CreateCommentDto,
            UpdateCommentDto,
            CommentDto,
            UserStatsDto,
            PostStatsDto,
            CommentStatsDto,
            DashboardStatsDto,
            PendingCountDto
        )
    ),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "auth", description = "Registration, login and the caller's profile"),
        (name = "posts", description = "Posts and the published feed"),
        (name = "tags", description = "Tag catalogue"),
        (name = "comments", description = "Threaded comments"),
        (name = "admin", description = "User management, moderation and statistics")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
