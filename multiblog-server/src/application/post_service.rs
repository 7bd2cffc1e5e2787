use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::{NewPost, PostFilter, PostOrder, PostPatch, PostRepository};
use crate::data::tag_repository::TagRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::post::{
    CreatePostRequest, Post, PostDetails, PostStatus, UpdatePostRequest, published_at_after,
};
use crate::domain::slug::{MAX_SLUG_ATTEMPTS, candidate, derive_base};
use crate::domain::tag::{Tag, TagAssignmentPolicy};
use crate::domain::text::{EXCERPT_LEN, extract_excerpt};
use crate::domain::user::Actor;

pub(crate) struct PostService<P, T, C, U>
where
    P: PostRepository,
    T: TagRepository,
    C: CommentRepository,
    U: UserRepository,
{
    posts: P,
    tags: T,
    comments: C,
    users: U,
    tag_policy: TagAssignmentPolicy,
}

impl<P, T, C, U> PostService<P, T, C, U>
where
    P: PostRepository,
    T: TagRepository,
    C: CommentRepository,
    U: UserRepository,
{
    pub(crate) fn new(posts: P, tags: T, comments: C, users: U, tag_policy: TagAssignmentPolicy) -> Self {
        Self {
            posts,
            tags,
            comments,
            users,
            tag_policy,
        }
    }

    pub(crate) async fn create_post(
        &self,
        actor: &Actor,
        req: CreatePostRequest,
    ) -> Result<PostDetails, DomainError> {
        let req = req.validate()?;
        let tag_ids = self.resolve_tag_ids(req.tag_ids).await?;

        let slug = self.unique_slug(&derive_base(&req.title, "post")).await?;
        let post = self
            .posts
            .create_post(NewPost {
                author_id: actor.user_id,
                title: req.title,
                slug,
                content: req.content,
                excerpt: req.excerpt.unwrap_or_default(),
                featured_image: req.featured_image,
                status: req.status,
                published_at: published_at_after(req.status, None, Utc::now()),
            })
            .await?;

        if !tag_ids.is_empty()
            && let Err(err) = self.assign_tags(post.id, &tag_ids).await
        {
            if let Err(undo) = self.posts.delete_post(post.id).await {
                warn!(post_id = post.id, error = %undo, "failed to discard untagged post");
            }
            return Err(err);
        }

        info!(post_id = post.id, slug = %post.slug, status = %post.status, "post created");
        self.enrich_one(post).await
    }

    /// Drafts and archived posts are reported missing to anyone but their
    /// author and admins.
    pub(crate) async fn get_post(
        &self,
        id: i64,
        actor: Option<&Actor>,
    ) -> Result<PostDetails, DomainError> {
        let post = self.posts.get_post(id).await?;
        self.visible(post, actor, || format!("post id: {id}")).await
    }

    pub(crate) async fn get_post_by_slug(
        &self,
        slug: &str,
        actor: Option<&Actor>,
    ) -> Result<PostDetails, DomainError> {
        let post = self.posts.get_post_by_slug(slug).await?;
        self.visible(post, actor, || format!("post slug: {slug}")).await
    }

    pub(crate) async fn update_post(
        &self,
        actor: &Actor,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostDetails, DomainError> {
        let req = req.validate()?;
        let current = self.owned_post(actor, id).await?;
        let tag_ids = match req.tag_ids {
            Some(ids) => Some(self.resolve_tag_ids(ids).await?),
            None => None,
        };

        let mut patch = PostPatch {
            title: current.title.clone(),
            slug: current.slug.clone(),
            content: current.content.clone(),
            excerpt: current.excerpt.clone(),
            featured_image: current.featured_image.clone(),
            status: current.status,
            published_at: current.published_at,
        };
        let previous = patch.clone();

        if let Some(title) = req.title
            && title != current.title
        {
            let derived = derive_base(&title, "post");
            if derived != current.slug {
                if self.posts.slug_exists(&derived, Some(id)).await? {
                    info!(post_id = id, slug = %derived, "derived slug taken, keeping current slug");
                } else {
                    patch.slug = derived;
                }
            }
            patch.title = title;
        }

        let content_changed = req.content.as_ref().is_some_and(|c| *c != current.content);
        if let Some(content) = req.content {
            patch.content = content;
        }
        match req.excerpt {
            Some(excerpt) => patch.excerpt = excerpt,
            None if content_changed => patch.excerpt = extract_excerpt(&patch.content, EXCERPT_LEN),
            None => {}
        }
        if let Some(image) = req.featured_image {
            patch.featured_image = (!image.is_empty()).then_some(image);
        }
        if let Some(status) = req.status {
            patch.status = status;
            patch.published_at = published_at_after(status, current.published_at, Utc::now());
        }

        let post = self
            .posts
            .update_post(id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;

        if let Some(tag_ids) = tag_ids
            && let Err(err) = self.assign_tags(post.id, &tag_ids).await
        {
            if let Err(undo) = self.posts.update_post(id, previous).await {
                warn!(post_id = id, error = %undo, "failed to restore post after tag failure");
            }
            return Err(err);
        }

        info!(post_id = post.id, status = %post.status, "post updated");
        self.enrich_one(post).await
    }

    pub(crate) async fn delete_post(&self, actor: &Actor, id: i64) -> Result<(), DomainError> {
        self.owned_post(actor, id).await?;

        if !self.posts.delete_post(id).await? {
            return Err(DomainError::NotFound(format!("post id: {id}")));
        }
        info!(post_id = id, user_id = actor.user_id, "post deleted");
        Ok(())
    }

    pub(crate) async fn publish(&self, actor: &Actor, id: i64) -> Result<PostDetails, DomainError> {
        self.transition(actor, id, PostStatus::Published).await
    }

    /// Back to draft; `published_at` keeps the first publication time.
    pub(crate) async fn unpublish(&self, actor: &Actor, id: i64) -> Result<PostDetails, DomainError> {
        self.transition(actor, id, PostStatus::Draft).await
    }

    /// General listing. Without admin rights only published posts are
    /// returned, unless the caller filters on their own posts.
    pub(crate) async fn list_posts(
        &self,
        actor: Option<&Actor>,
        status: Option<PostStatus>,
        author_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, DomainError> {
        let sees_everything = actor.is_some_and(|actor| {
            actor.is_admin || author_id.is_some_and(|author| author == actor.user_id)
        });
        let filter = PostFilter {
            status: if sees_everything {
                status
            } else {
                Some(PostStatus::Published)
            },
            author_id,
            order: PostOrder::CreatedDesc,
            ..PostFilter::default()
        };
        self.page_of(filter, page).await
    }

    pub(crate) async fn published_posts(
        &self,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, DomainError> {
        self.page_of(PostFilter::live(), page).await
    }

    pub(crate) async fn posts_by_author(
        &self,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, DomainError> {
        let filter = PostFilter {
            author_id: Some(author_id),
            ..PostFilter::live()
        };
        self.page_of(filter, page).await
    }

    pub(crate) async fn posts_by_tag(
        &self,
        tag_id: i64,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, DomainError> {
        if self.tags.get_tag(tag_id).await?.is_none() {
            return Err(DomainError::NotFound(format!("tag id: {tag_id}")));
        }
        let filter = PostFilter {
            tag_id: Some(tag_id),
            ..PostFilter::live()
        };
        self.page_of(filter, page).await
    }

    pub(crate) async fn search_posts(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::validation("q", "must not be empty"));
        }
        if query.chars().count() > 100 {
            return Err(DomainError::validation("q", "must be at most 100 chars"));
        }
        let filter = PostFilter {
            search: Some(query.to_string()),
            ..PostFilter::live()
        };
        self.page_of(filter, page).await
    }

    pub(crate) async fn increment_view_count(&self, id: i64) -> Result<(), DomainError> {
        self.posts.increment_view_count(id).await
    }

    async fn transition(
        &self,
        actor: &Actor,
        id: i64,
        next: PostStatus,
    ) -> Result<PostDetails, DomainError> {
        let current = self.owned_post(actor, id).await?;
        let published_at = published_at_after(next, current.published_at, Utc::now());

        let post = self
            .posts
            .update_post(
                id,
                PostPatch {
                    title: current.title,
                    slug: current.slug,
                    content: current.content,
                    excerpt: current.excerpt,
                    featured_image: current.featured_image,
                    status: next,
                    published_at,
                },
            )
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;

        info!(post_id = id, from = %current.status, to = %next, "post status changed");
        self.enrich_one(post).await
    }

    async fn owned_post(&self, actor: &Actor, id: i64) -> Result<Post, DomainError> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;
        post.ensure_modifiable_by(actor)?;
        Ok(post)
    }

    async fn visible(
        &self,
        post: Option<Post>,
        actor: Option<&Actor>,
        what: impl FnOnce() -> String,
    ) -> Result<PostDetails, DomainError> {
        match post {
            Some(post) if post.is_visible_to(actor) => self.enrich_one(post).await,
            _ => Err(DomainError::NotFound(what())),
        }
    }

    async fn page_of(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostDetails>, DomainError> {
        let posts = self.posts.list_posts(&filter, page).await?;
        let total = self.posts.count_posts(&filter).await?;
        let items = self.enrich(posts).await?;
        Ok(Page::new(items, page, total))
    }

    async fn unique_slug(&self, base: &str) -> Result<String, DomainError> {
        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let slug = candidate(base, attempt);
            if !self.posts.slug_exists(&slug, None).await? {
                return Ok(slug);
            }
        }
        Err(DomainError::AlreadyExists("post slug".to_string()))
    }

    /// Tag ids to store for a post. Strict mode rejects unknown ids before
    /// anything is written; best-effort mode drops them.
    async fn resolve_tag_ids(&self, requested: Vec<i64>) -> Result<Vec<i64>, DomainError> {
        if requested.is_empty() {
            return Ok(requested);
        }

        let existing = match self.tags.existing_ids(&requested).await {
            Ok(existing) => existing,
            Err(err) if self.tag_policy == TagAssignmentPolicy::BestEffort => {
                warn!(error = %err, "tag lookup failed, post is saved without tags");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };
        if existing.len() == requested.len() {
            return Ok(existing);
        }

        let unknown: Vec<i64> = requested
            .iter()
            .copied()
            .filter(|id| !existing.contains(id))
            .collect();
        match self.tag_policy {
            TagAssignmentPolicy::Strict => {
                Err(DomainError::validation("tag_ids", "contains unknown tag ids"))
            }
            TagAssignmentPolicy::BestEffort => {
                warn!(?unknown, "dropping unknown tag ids");
                Ok(existing)
            }
        }
    }

    /// Only fails under the strict policy; callers undo the post write then.
    async fn assign_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<(), DomainError> {
        match self.tags.replace_post_tags(post_id, tag_ids).await {
            Ok(()) => Ok(()),
            Err(err) if self.tag_policy == TagAssignmentPolicy::BestEffort => {
                warn!(post_id, error = %err, "failed to update post tags");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn enrich_one(&self, post: Post) -> Result<PostDetails, DomainError> {
        let mut details = self.enrich(vec![post]).await?;
        details
            .pop()
            .ok_or_else(|| DomainError::Unexpected("post enrichment lost the post".to_string()))
    }

    /// Attaches authors, tags and approved comment counts with one query per
    /// relation for the whole batch.
    async fn enrich(&self, posts: Vec<Post>) -> Result<Vec<PostDetails>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let mut author_ids: Vec<i64> = posts.iter().map(|p| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for (post_id, tag) in self.tags.tags_for_posts(&post_ids).await? {
            tags.entry(post_id).or_default().push(tag);
        }
        let counts: HashMap<i64, i64> = self
            .comments
            .approved_counts(&post_ids)
            .await?
            .into_iter()
            .collect();
        let authors: HashMap<i64, _> = self
            .users
            .summaries(&author_ids)
            .await?
            .into_iter()
            .map(|author| (author.id, author))
            .collect();

        Ok(posts
            .into_iter()
            .map(|post| PostDetails {
                author: authors.get(&post.author_id).cloned(),
                tags: tags.remove(&post.id).unwrap_or_default(),
                comment_count: counts.get(&post.id).copied().unwrap_or(0),
                post,
            })
            .collect())
    }
}
