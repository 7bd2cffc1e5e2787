use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::pagination::PageRequest;
use crate::domain::post::{Post, PostStatus};
use crate::domain::stats::PostStats;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) excerpt: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
}

/// Full writable state of a post; the service resolves every field before
/// calling the repository.
#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) excerpt: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum PostOrder {
    #[default]
    CreatedDesc,
    PublishedDesc,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PostFilter {
    pub(crate) status: Option<PostStatus>,
    /// `status = published AND published_at <= now()`; overrides `status`.
    pub(crate) live_only: bool,
    pub(crate) author_id: Option<i64>,
    pub(crate) tag_id: Option<i64>,
    /// Case-insensitive substring over title, content and excerpt.
    pub(crate) search: Option<String>,
    pub(crate) order: PostOrder,
}

impl PostFilter {
    pub(crate) fn live() -> Self {
        Self {
            live_only: true,
            order: PostOrder::PublishedDesc,
            ..Self::default()
        }
    }
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError>;
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, DomainError>;
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Vec<Post>, DomainError>;
    async fn count_posts(&self, filter: &PostFilter) -> Result<i64, DomainError>;
    async fn increment_view_count(&self, id: i64) -> Result<(), DomainError>;
    async fn stats(&self) -> Result<PostStats, DomainError>;
}
