use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::tag_repository::TagRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::stats::DashboardStats;

pub(crate) struct AdminService<U, P, C, T>
where
    U: UserRepository,
    P: PostRepository,
    C: CommentRepository,
    T: TagRepository,
{
    users: U,
    posts: P,
    comments: C,
    tags: T,
}

impl<U, P, C, T> AdminService<U, P, C, T>
where
    U: UserRepository,
    P: PostRepository,
    C: CommentRepository,
    T: TagRepository,
{
    pub(crate) fn new(users: U, posts: P, comments: C, tags: T) -> Self {
        Self {
            users,
            posts,
            comments,
            tags,
        }
    }

    pub(crate) async fn dashboard_stats(&self) -> Result<DashboardStats, DomainError> {
        let (users, posts, comments, tags) = tokio::try_join!(
            self.users.stats(),
            self.posts.stats(),
            self.comments.stats(),
            self.tags.stats(),
        )?;

        Ok(DashboardStats {
            users,
            posts,
            comments,
            tags,
        })
    }
}
