use async_trait::async_trait;

use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::error::DomainError;
use crate::domain::pagination::PageRequest;
use crate::domain::stats::CommentStats;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) parent_id: Option<i64>,
    pub(crate) content: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CommentPatch {
    pub(crate) content: String,
    pub(crate) status: CommentStatus,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    /// Always stored as pending.
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;
    async fn update_comment(
        &self,
        id: i64,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, DomainError>;
    /// Deletes the comment and every reply below it.
    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError>;
    async fn set_status(
        &self,
        id: i64,
        status: CommentStatus,
    ) -> Result<Option<Comment>, DomainError>;
    /// Approved top-level comments of a post, newest first.
    async fn approved_roots(
        &self,
        post_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Comment>, DomainError>;
    async fn count_approved_roots(&self, post_id: i64) -> Result<i64, DomainError>;
    /// Approved replies at any depth below the given comments, reached only
    /// through approved parents.
    async fn approved_descendants(&self, root_ids: &[i64]) -> Result<Vec<Comment>, DomainError>;
    async fn by_author(&self, author_id: i64, page: PageRequest)
    -> Result<Vec<Comment>, DomainError>;
    async fn count_by_author(&self, author_id: i64) -> Result<i64, DomainError>;
    /// Oldest first.
    async fn pending(&self, page: PageRequest) -> Result<Vec<Comment>, DomainError>;
    async fn count_pending(&self) -> Result<i64, DomainError>;
    /// `(post_id, approved comment count)` for the given posts; posts without
    /// approved comments may be missing.
    async fn approved_counts(&self, post_ids: &[i64]) -> Result<Vec<(i64, i64)>, DomainError>;
    async fn stats(&self) -> Result<CommentStats, DomainError>;
}
