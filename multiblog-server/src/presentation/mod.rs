use sqlx::PgPool;
use std::sync::Arc;

use crate::application::admin_service::AdminService;
use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::application::tag_service::TagService;
use crate::application::user_service::UserService;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::tag_repository::PostgresTagRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::domain::tag::TagAssignmentPolicy;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod http;

pub(crate) type AppAuthService = AuthService<PostgresUserRepository>;
pub(crate) type AppUserService = UserService<PostgresUserRepository>;
pub(crate) type AppPostService = PostService<
    PostgresPostRepository,
    PostgresTagRepository,
    PostgresCommentRepository,
    PostgresUserRepository,
>;
pub(crate) type AppTagService = TagService<PostgresTagRepository>;
pub(crate) type AppCommentService =
    CommentService<PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository>;
pub(crate) type AppAdminService = AdminService<
    PostgresUserRepository,
    PostgresPostRepository,
    PostgresCommentRepository,
    PostgresTagRepository,
>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AppAuthService>,
    pub(crate) user_service: Arc<AppUserService>,
    pub(crate) post_service: Arc<AppPostService>,
    pub(crate) tag_service: Arc<AppTagService>,
    pub(crate) comment_service: Arc<AppCommentService>,
    pub(crate) admin_service: Arc<AppAdminService>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    /// Wires every service onto repositories sharing one pool.
    pub(crate) fn new(pool: PgPool, jwt: JwtService, tag_policy: TagAssignmentPolicy) -> Self {
        let users = PostgresUserRepository::new(pool.clone());
        let posts = PostgresPostRepository::new(pool.clone());
        let tags = PostgresTagRepository::new(pool.clone());
        let comments = PostgresCommentRepository::new(pool);

        Self {
            auth_service: Arc::new(AuthService::new(users.clone(), jwt.clone())),
            user_service: Arc::new(UserService::new(users.clone())),
            post_service: Arc::new(PostService::new(
                posts.clone(),
                tags.clone(),
                comments.clone(),
                users.clone(),
                tag_policy,
            )),
            tag_service: Arc::new(TagService::new(tags.clone())),
            comment_service: Arc::new(CommentService::new(
                comments.clone(),
                posts.clone(),
                users.clone(),
            )),
            admin_service: Arc::new(AdminService::new(users, posts, comments, tags)),
            jwt: Arc::new(jwt),
        }
    }
}
