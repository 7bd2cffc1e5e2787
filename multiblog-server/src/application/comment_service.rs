use std::collections::HashMap;

use tracing::info;

use crate::data::comment_repository::{CommentPatch, CommentRepository, NewComment};
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::{
    Comment, CommentStatus, CommentThread, CreateCommentRequest, UpdateCommentRequest,
    build_threads, status_after_update,
};
use crate::domain::error::DomainError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::post::PostStatus;
use crate::domain::user::{Actor, AuthorSummary};

pub(crate) struct CommentService<C, P, U>
where
    C: CommentRepository,
    P: PostRepository,
    U: UserRepository,
{
    comments: C,
    posts: P,
    users: U,
}

impl<C, P, U> CommentService<C, P, U>
where
    C: CommentRepository,
    P: PostRepository,
    U: UserRepository,
{
    pub(crate) fn new(comments: C, posts: P, users: U) -> Self {
        Self {
            comments,
            posts,
            users,
        }
    }

    /// New comments always wait for moderation, admins included.
    pub(crate) async fn create_comment(
        &self,
        actor: &Actor,
        req: CreateCommentRequest,
    ) -> Result<CommentThread, DomainError> {
        let req = req.validate()?;

        match self.posts.get_post(req.post_id).await? {
            Some(post) if post.is_visible_to(Some(actor)) => {}
            _ => return Err(DomainError::NotFound(format!("post id: {}", req.post_id))),
        }
        if let Some(parent_id) = req.parent_id {
            let parent = self
                .comments
                .get_comment(parent_id)
                .await?
                .ok_or_else(|| DomainError::NotFound(format!("parent comment id: {parent_id}")))?;
            parent.accepts_reply_on(req.post_id)?;
        }

        let comment = self
            .comments
            .create_comment(NewComment {
                post_id: req.post_id,
                author_id: actor.user_id,
                parent_id: req.parent_id,
                content: req.content,
            })
            .await?;

        info!(
            comment_id = comment.id,
            post_id = comment.post_id,
            parent_id = ?comment.parent_id,
            "comment created"
        );
        self.with_author(comment).await
    }

    /// Comments still in moderation are visible only to their author and
    /// admins.
    pub(crate) async fn get_comment(
        &self,
        id: i64,
        actor: Option<&Actor>,
    ) -> Result<CommentThread, DomainError> {
        let comment = self
            .comments
            .get_comment(id)
            .await?
            .filter(|c| {
                c.status == CommentStatus::Approved
                    || actor.is_some_and(|actor| actor.can_modify(c.author_id))
            })
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))?;
        self.with_author(comment).await
    }

    pub(crate) async fn update_comment(
        &self,
        actor: &Actor,
        id: i64,
        req: UpdateCommentRequest,
    ) -> Result<CommentThread, DomainError> {
        let req = req.validate()?;
        let current = self.owned_comment(actor, id).await?;

        let content_edited = req.content.is_some();
        let content = req.content.unwrap_or_else(|| current.content.clone());
        let status = status_after_update(actor, current.status, content_edited, req.status);

        let comment = self
            .comments
            .update_comment(id, CommentPatch { content, status })
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))?;

        info!(comment_id = id, status = %comment.status, "comment updated");
        self.with_author(comment).await
    }

    /// Replies below the comment go with it.
    pub(crate) async fn delete_comment(&self, actor: &Actor, id: i64) -> Result<(), DomainError> {
        self.owned_comment(actor, id).await?;

        if !self.comments.delete_comment(id).await? {
            return Err(DomainError::NotFound(format!("comment id: {id}")));
        }
        info!(comment_id = id, user_id = actor.user_id, "comment deleted");
        Ok(())
    }

    /// Approved top-level comments of a published post with their approved
    /// replies nested at any depth.
    pub(crate) async fn comments_for_post(
        &self,
        post_id: i64,
        page: PageRequest,
    ) -> Result<Page<CommentThread>, DomainError> {
        match self.posts.get_post(post_id).await? {
            Some(post) if post.status == PostStatus::Published => {}
            _ => return Err(DomainError::NotFound(format!("post id: {post_id}"))),
        }

        let roots = self.comments.approved_roots(post_id, page).await?;
        let total = self.comments.count_approved_roots(post_id).await?;
        let root_ids: Vec<i64> = roots.iter().map(|c| c.id).collect();
        let descendants = if root_ids.is_empty() {
            Vec::new()
        } else {
            self.comments.approved_descendants(&root_ids).await?
        };

        let authors = self
            .authors(roots.iter().chain(descendants.iter()))
            .await?;
        Ok(Page::new(
            build_threads(roots, descendants, &authors),
            page,
            total,
        ))
    }

    pub(crate) async fn comments_by_author(
        &self,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Page<CommentThread>, DomainError> {
        let comments = self.comments.by_author(author_id, page).await?;
        let total = self.comments.count_by_author(author_id).await?;
        let items = self.flat(comments).await?;
        Ok(Page::new(items, page, total))
    }

    /// Moderation queue, oldest first.
    pub(crate) async fn pending_comments(
        &self,
        page: PageRequest,
    ) -> Result<Page<CommentThread>, DomainError> {
        let comments = self.comments.pending(page).await?;
        let total = self.comments.count_pending().await?;
        let items = self.flat(comments).await?;
        Ok(Page::new(items, page, total))
    }

    pub(crate) async fn approve_comment(&self, id: i64) -> Result<CommentThread, DomainError> {
        self.moderate(id, CommentStatus::Approved).await
    }

    pub(crate) async fn reject_comment(&self, id: i64) -> Result<CommentThread, DomainError> {
        self.moderate(id, CommentStatus::Rejected).await
    }

    pub(crate) async fn pending_count(&self) -> Result<i64, DomainError> {
        self.comments.count_pending().await
    }

    async fn moderate(&self, id: i64, status: CommentStatus) -> Result<CommentThread, DomainError> {
        let comment = self
            .comments
            .set_status(id, status)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))?;

        info!(comment_id = id, %status, "comment moderated");
        self.with_author(comment).await
    }

    async fn owned_comment(&self, actor: &Actor, id: i64) -> Result<Comment, DomainError> {
        let comment = self
            .comments
            .get_comment(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))?;
        comment.ensure_modifiable_by(actor)?;
        Ok(comment)
    }

    async fn with_author(&self, comment: Comment) -> Result<CommentThread, DomainError> {
        let mut authors = self.authors(std::iter::once(&comment)).await?;
        let author = authors.remove(&comment.author_id);
        Ok(CommentThread::leaf(comment, author))
    }

    async fn flat(&self, comments: Vec<Comment>) -> Result<Vec<CommentThread>, DomainError> {
        let authors = self.authors(comments.iter()).await?;
        Ok(comments
            .into_iter()
            .map(|comment| {
                let author = authors.get(&comment.author_id).cloned();
                CommentThread::leaf(comment, author)
            })
            .collect())
    }

    async fn authors<'a>(
        &self,
        comments: impl Iterator<Item = &'a Comment>,
    ) -> Result<HashMap<i64, AuthorSummary>, DomainError> {
        let mut ids: Vec<i64> = comments.map(|c| c.author_id).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        ids.sort_unstable();
        ids.dedup();

        Ok(self
            .users
            .summaries(&ids)
            .await?
            .into_iter()
            .map(|author| (author.id, author))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::CommentService;
    use crate::data::post_repository::{NewPost, PostRepository};
    use crate::data::repositories::memory::MemoryStore;
    use crate::domain::comment::{CommentStatus, CreateCommentRequest, UpdateCommentRequest};
    use crate::domain::error::DomainError;
    use crate::domain::pagination::PageRequest;
    use crate::domain::post::{Post, PostStatus};
    use crate::domain::user::Actor;

    type Service = CommentService<MemoryStore, MemoryStore, MemoryStore>;

    struct Fixture {
        store: MemoryStore,
        service: Service,
        author: Actor,
        reader: Actor,
        admin: Actor,
        post: Post,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let author = store.seed_user("alice", false).actor();
        let reader = store.seed_user("bob", false).actor();
        let admin = store.seed_user("admin", true).actor();
        let post = seed_post(&store, author.user_id, "discussion", PostStatus::Published).await;
        let service = CommentService::new(store.clone(), store.clone(), store.clone());
        Fixture {
            store,
            service,
            author,
            reader,
            admin,
            post,
        }
    }

    async fn seed_post(store: &MemoryStore, author_id: i64, slug: &str, status: PostStatus) -> Post {
        store
            .create_post(NewPost {
                author_id,
                title: format!("Post {slug}"),
                slug: slug.to_string(),
                content: "Body of the post".to_string(),
                excerpt: "Body of the post".to_string(),
                featured_image: None,
                status,
                published_at: (status == PostStatus::Published).then(chrono::Utc::now),
            })
            .await
            .expect("post must be created")
    }

    fn on_post(post_id: i64, parent_id: Option<i64>, content: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            post_id,
            parent_id,
            content: content.to_string(),
        }
    }

    async fn add(f: &Fixture, parent: Option<i64>, text: &str, approve: bool) -> i64 {
        let created = f
            .service
            .create_comment(&f.reader, on_post(f.post.id, parent, text))
            .await
            .expect("create");
        if approve {
            f.service
                .approve_comment(created.comment.id)
                .await
                .expect("approve");
        }
        created.comment.id
    }

    #[tokio::test]
    async fn comments_start_pending_even_for_admins() {
        let f = fixture().await;

        let by_reader = f
            .service
            .create_comment(&f.reader, on_post(f.post.id, None, "Nice post"))
            .await
            .expect("create must succeed");
        let by_admin = f
            .service
            .create_comment(&f.admin, on_post(f.post.id, None, "Thanks"))
            .await
            .expect("create must succeed");

        assert_eq!(by_reader.comment.status, CommentStatus::Pending);
        assert_eq!(by_admin.comment.status, CommentStatus::Pending);
        assert_eq!(by_reader.author.map(|a| a.username), Some("bob".to_string()));
        assert_eq!(f.service.pending_count().await.expect("count"), 2);
    }

    #[tokio::test]
    async fn reply_parent_must_exist_on_same_post() {
        let f = fixture().await;
        let other = seed_post(&f.store, f.author.user_id, "other", PostStatus::Published).await;
        let parent = f
            .service
            .create_comment(&f.reader, on_post(other.id, None, "Elsewhere"))
            .await
            .expect("create must succeed");

        let err = f
            .service
            .create_comment(&f.reader, on_post(f.post.id, Some(parent.comment.id), "Reply"))
            .await
            .expect_err("parent on another post");
        assert!(matches!(err, DomainError::Validation { field: "parent_id", .. }));

        let err = f
            .service
            .create_comment(&f.reader, on_post(f.post.id, Some(9999), "Reply"))
            .await
            .expect_err("missing parent");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn cannot_comment_on_hidden_post() {
        let f = fixture().await;
        let draft = seed_post(&f.store, f.author.user_id, "draft", PostStatus::Draft).await;

        let err = f
            .service
            .create_comment(&f.reader, on_post(draft.id, None, "Early bird"))
            .await
            .expect_err("draft is hidden");
        assert!(matches!(err, DomainError::NotFound(_)));

        f.service
            .create_comment(&f.author, on_post(draft.id, None, "Note to self"))
            .await
            .expect("author sees own draft");
    }

    #[tokio::test]
    async fn non_admin_edit_resets_approved_comment_to_pending() {
        let f = fixture().await;
        let created = f
            .service
            .create_comment(&f.reader, on_post(f.post.id, None, "First version"))
            .await
            .expect("create");
        let id = created.comment.id;
        f.service.approve_comment(id).await.expect("approve");

        let updated = f
            .service
            .update_comment(
                &f.reader,
                id,
                UpdateCommentRequest {
                    content: Some("Second version".to_string()),
                    status: Some(CommentStatus::Approved),
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.comment.content, "Second version");
        assert_eq!(updated.comment.status, CommentStatus::Pending);
    }

    #[tokio::test]
    async fn resubmitting_same_content_still_resets_to_pending() {
        let f = fixture().await;
        let id = add(&f, None, "Same text", true).await;

        let updated = f
            .service
            .update_comment(
                &f.reader,
                id,
                UpdateCommentRequest {
                    content: Some("  Same text ".to_string()),
                    status: None,
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.comment.content, "Same text");
        assert_eq!(updated.comment.status, CommentStatus::Pending);
    }

    #[tokio::test]
    async fn admin_edit_keeps_or_sets_status() {
        let f = fixture().await;
        let created = f
            .service
            .create_comment(&f.reader, on_post(f.post.id, None, "Needs a fix"))
            .await
            .expect("create");
        let id = created.comment.id;
        f.service.approve_comment(id).await.expect("approve");

        let edited = f
            .service
            .update_comment(
                &f.admin,
                id,
                UpdateCommentRequest {
                    content: Some("Fixed by admin".to_string()),
                    status: None,
                },
            )
            .await
            .expect("admin edit");
        assert_eq!(edited.comment.status, CommentStatus::Approved);

        let rejected = f
            .service
            .update_comment(
                &f.admin,
                id,
                UpdateCommentRequest {
                    content: None,
                    status: Some(CommentStatus::Rejected),
                },
            )
            .await
            .expect("admin status change");
        assert_eq!(rejected.comment.status, CommentStatus::Rejected);
    }

    #[tokio::test]
    async fn only_author_or_admin_can_modify() {
        let f = fixture().await;
        let created = f
            .service
            .create_comment(&f.reader, on_post(f.post.id, None, "Mine"))
            .await
            .expect("create");
        let id = created.comment.id;

        let err = f
            .service
            .update_comment(
                &f.author,
                id,
                UpdateCommentRequest {
                    content: Some("Not yours".to_string()),
                    status: None,
                },
            )
            .await
            .expect_err("post author is not comment author");
        assert!(matches!(err, DomainError::Forbidden(_)));
        let err = f
            .service
            .delete_comment(&f.author, id)
            .await
            .expect_err("delete by stranger");
        assert!(matches!(err, DomainError::Forbidden(_)));

        f.service
            .delete_comment(&f.admin, id)
            .await
            .expect("admin delete");
    }

    #[tokio::test]
    async fn deleting_comment_removes_replies() {
        let f = fixture().await;
        let root = f
            .service
            .create_comment(&f.reader, on_post(f.post.id, None, "Root"))
            .await
            .expect("root");
        let reply = f
            .service
            .create_comment(&f.author, on_post(f.post.id, Some(root.comment.id), "Reply"))
            .await
            .expect("reply");
        let nested = f
            .service
            .create_comment(&f.reader, on_post(f.post.id, Some(reply.comment.id), "Nested"))
            .await
            .expect("nested");

        f.service
            .delete_comment(&f.reader, root.comment.id)
            .await
            .expect("delete");

        for id in [reply.comment.id, nested.comment.id] {
            let err = f
                .service
                .get_comment(id, Some(&f.admin))
                .await
                .expect_err("reply must be gone");
            assert!(matches!(err, DomainError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn thread_contains_only_approved_comments_nested() {
        let f = fixture().await;
        let root = add(&f, None, "root", true).await;
        let reply = add(&f, Some(root), "reply", true).await;
        add(&f, Some(reply), "deep reply", true).await;
        let hidden = add(&f, Some(root), "pending reply", false).await;
        add(&f, Some(hidden), "under pending", true).await;
        add(&f, None, "pending root", false).await;

        let page = f
            .service
            .comments_for_post(f.post.id, PageRequest::default())
            .await
            .expect("list");
        assert_eq!(page.total, 1);
        let thread = &page.items[0];
        assert_eq!(thread.comment.id, root);
        assert_eq!(thread.replies.len(), 1);
        assert_eq!(thread.replies[0].comment.content, "reply");
        assert_eq!(thread.replies[0].replies.len(), 1);
        assert_eq!(thread.replies[0].replies[0].comment.content, "deep reply");
    }

    #[tokio::test]
    async fn pending_comment_is_hidden_from_strangers() {
        let f = fixture().await;
        let created = f
            .service
            .create_comment(&f.reader, on_post(f.post.id, None, "Waiting"))
            .await
            .expect("create");
        let id = created.comment.id;

        assert!(matches!(
            f.service.get_comment(id, None).await,
            Err(DomainError::NotFound(_))
        ));
        f.service
            .get_comment(id, Some(&f.reader))
            .await
            .expect("author sees own pending comment");

        f.service.approve_comment(id).await.expect("approve");
        f.service.get_comment(id, None).await.expect("approved is public");
    }

    #[tokio::test]
    async fn moderation_queue_and_author_listing() {
        let f = fixture().await;
        for text in ["one", "two", "three"] {
            f.service
                .create_comment(&f.reader, on_post(f.post.id, None, text))
                .await
                .expect("create");
        }
        let first = f
            .service
            .pending_comments(PageRequest::default())
            .await
            .expect("queue");
        assert_eq!(first.total, 3);
        assert_eq!(first.items[0].comment.content, "one");

        f.service
            .reject_comment(first.items[0].comment.id)
            .await
            .expect("reject");
        assert_eq!(f.service.pending_count().await.expect("count"), 2);

        let mine = f
            .service
            .comments_by_author(f.reader.user_id, PageRequest::default())
            .await
            .expect("by author");
        assert_eq!(mine.total, 3);

        let err = f
            .service
            .approve_comment(4242)
            .await
            .expect_err("unknown comment");
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
