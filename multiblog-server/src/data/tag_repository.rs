use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::pagination::PageRequest;
use crate::domain::stats::TagStats;
use crate::domain::tag::{Tag, TagWithCount};

#[derive(Debug, Clone)]
pub(crate) struct NewTag {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) color: String,
}

#[derive(Debug, Clone)]
pub(crate) struct TagPatch {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) color: String,
}

#[async_trait]
pub(crate) trait TagRepository: Send + Sync {
    async fn create_tag(&self, input: NewTag) -> Result<Tag, DomainError>;
    async fn get_tag(&self, id: i64) -> Result<Option<Tag>, DomainError>;
    async fn get_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError>;
    /// Case-insensitive.
    async fn name_taken(&self, name: &str, exclude_id: Option<i64>) -> Result<bool, DomainError>;
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, DomainError>;
    async fn update_tag(&self, id: i64, patch: TagPatch) -> Result<Option<Tag>, DomainError>;
    /// Removes the tag together with its post associations.
    async fn delete_tag(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_tags(&self, page: PageRequest) -> Result<Vec<TagWithCount>, DomainError>;
    async fn count_tags(&self) -> Result<i64, DomainError>;
    async fn all_tags(&self) -> Result<Vec<Tag>, DomainError>;
    async fn popular_tags(&self, limit: i64) -> Result<Vec<TagWithCount>, DomainError>;
    async fn published_post_count(&self, tag_id: i64) -> Result<i64, DomainError>;
    /// Subset of `ids` that exist.
    async fn existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>, DomainError>;
    /// Makes `tag_ids` the complete tag set of the post.
    async fn replace_post_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<(), DomainError>;
    /// `(post_id, tag)` pairs for all given posts.
    async fn tags_for_posts(&self, post_ids: &[i64]) -> Result<Vec<(i64, Tag)>, DomainError>;
    async fn stats(&self) -> Result<TagStats, DomainError>;
}
