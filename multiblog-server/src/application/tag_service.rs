use tracing::info;

use crate::data::tag_repository::{NewTag, TagPatch, TagRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::slug::{MAX_SLUG_ATTEMPTS, candidate, derive_base};
use crate::domain::stats::TagStats;
use crate::domain::tag::{CreateTagRequest, DEFAULT_TAG_COLOR, Tag, TagWithCount, UpdateTagRequest};

pub(crate) const DEFAULT_POPULAR_LIMIT: i64 = 10;
pub(crate) const MAX_POPULAR_LIMIT: i64 = 50;

pub(crate) struct TagService<T: TagRepository> {
    repo: T,
}

impl<T: TagRepository> TagService<T> {
    pub(crate) fn new(repo: T) -> Self {
        Self { repo }
    }

    pub(crate) async fn create_tag(&self, req: CreateTagRequest) -> Result<Tag, DomainError> {
        let req = req.validate()?;

        if self.repo.name_taken(&req.name, None).await? {
            return Err(DomainError::AlreadyExists("tag name".to_string()));
        }
        let slug = self.unique_slug(&derive_base(&req.name, "tag")).await?;

        let tag = self
            .repo
            .create_tag(NewTag {
                name: req.name,
                slug,
                description: req.description,
                color: req.color.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string()),
            })
            .await?;

        info!(tag_id = tag.id, slug = %tag.slug, "tag created");
        Ok(tag)
    }

    pub(crate) async fn get_tag(&self, id: i64) -> Result<TagWithCount, DomainError> {
        let tag = self
            .repo
            .get_tag(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("tag id: {id}")))?;
        self.with_count(tag).await
    }

    pub(crate) async fn get_tag_by_slug(&self, slug: &str) -> Result<TagWithCount, DomainError> {
        let tag = self
            .repo
            .get_tag_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("tag slug: {slug}")))?;
        self.with_count(tag).await
    }

    pub(crate) async fn update_tag(&self, id: i64, req: UpdateTagRequest) -> Result<Tag, DomainError> {
        let req = req.validate()?;
        let current = self
            .repo
            .get_tag(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("tag id: {id}")))?;

        let mut patch = TagPatch {
            name: current.name.clone(),
            slug: current.slug.clone(),
            description: current.description.clone(),
            color: current.color.clone(),
        };

        if let Some(name) = req.name
            && name != current.name
        {
            if self.repo.name_taken(&name, Some(id)).await? {
                return Err(DomainError::AlreadyExists("tag name".to_string()));
            }
            let derived = derive_base(&name, "tag");
            if derived != current.slug {
                if self.repo.slug_exists(&derived, Some(id)).await? {
                    info!(tag_id = id, slug = %derived, "derived slug taken, keeping current slug");
                } else {
                    patch.slug = derived;
                }
            }
            patch.name = name;
        }
        if let Some(description) = req.description {
            patch.description = (!description.is_empty()).then_some(description);
        }
        if let Some(color) = req.color {
            patch.color = color;
        }

        let tag = self
            .repo
            .update_tag(id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("tag id: {id}")))?;

        info!(tag_id = tag.id, "tag updated");
        Ok(tag)
    }

    pub(crate) async fn delete_tag(&self, id: i64) -> Result<(), DomainError> {
        if !self.repo.delete_tag(id).await? {
            return Err(DomainError::NotFound(format!("tag id: {id}")));
        }
        info!(tag_id = id, "tag deleted");
        Ok(())
    }

    pub(crate) async fn list_tags(
        &self,
        page: PageRequest,
    ) -> Result<Page<TagWithCount>, DomainError> {
        let tags = self.repo.list_tags(page).await?;
        let total = self.repo.count_tags().await?;
        Ok(Page::new(tags, page, total))
    }

    pub(crate) async fn all_tags(&self) -> Result<Vec<Tag>, DomainError> {
        self.repo.all_tags().await
    }

    pub(crate) async fn popular_tags(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<TagWithCount>, DomainError> {
        let limit = limit.unwrap_or(DEFAULT_POPULAR_LIMIT);
        if !(1..=MAX_POPULAR_LIMIT).contains(&limit) {
            return Err(DomainError::validation("limit", "must be 1..50"));
        }
        self.repo.popular_tags(limit).await
    }

    pub(crate) async fn tag_stats(&self) -> Result<TagStats, DomainError> {
        self.repo.stats().await
    }

    async fn with_count(&self, tag: Tag) -> Result<TagWithCount, DomainError> {
        let posts_count = self.repo.published_post_count(tag.id).await?;
        Ok(TagWithCount { tag, posts_count })
    }

    async fn unique_slug(&self, base: &str) -> Result<String, DomainError> {
        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let slug = candidate(base, attempt);
            if !self.repo.slug_exists(&slug, None).await? {
                return Ok(slug);
            }
        }
        Err(DomainError::AlreadyExists("tag slug".to_string()))
    }
}
