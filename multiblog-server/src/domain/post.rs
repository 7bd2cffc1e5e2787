use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::tag::Tag;
use super::text::{EXCERPT_LEN, extract_excerpt, sanitize_text};
use super::user::{Actor, AuthorSummary, normalize_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            _ => Err(DomainError::validation(
                "status",
                "must be one of: draft, published, archived",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) excerpt: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) view_count: i64,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    /// Published and not scheduled into the future.
    pub(crate) fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Published && self.published_at.is_some_and(|at| at <= now)
    }

    /// Drafts and archived posts are only visible to their author and admins.
    pub(crate) fn is_visible_to(&self, actor: Option<&Actor>) -> bool {
        self.status == PostStatus::Published
            || actor.is_some_and(|actor| actor.can_modify(self.author_id))
    }

    pub(crate) fn ensure_modifiable_by(&self, actor: &Actor) -> Result<(), DomainError> {
        if actor.can_modify(self.author_id) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "only the author or an admin may modify this post",
            ))
        }
    }
}

/// `published_at` after moving into `next`: stamped the first time a post is
/// published and never cleared afterwards.
pub(crate) fn published_at_after(
    next: PostStatus,
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (next, published_at) {
        (PostStatus::Published, None) => Some(now),
        (_, current) => current,
    }
}

/// A post as returned to readers: tags, author and the live count of approved
/// comments are resolved at read time.
#[derive(Debug, Clone)]
pub(crate) struct PostDetails {
    pub(crate) post: Post,
    pub(crate) author: Option<AuthorSummary>,
    pub(crate) tags: Vec<Tag>,
    pub(crate) comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) tag_ids: Vec<i64>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let content = normalize_content(&self.content)?;
        let excerpt = match self.excerpt {
            Some(excerpt) => normalize_excerpt(&excerpt)?,
            None => None,
        };
        Ok(Self {
            title: normalize_title(&self.title)?,
            excerpt: Some(excerpt.unwrap_or_else(|| extract_excerpt(&content, EXCERPT_LEN))),
            content,
            featured_image: match self.featured_image {
                Some(url) => normalize_url("featured_image", &url)?,
                None => None,
            },
            status: self.status,
            tag_ids: normalize_tag_ids(self.tag_ids)?,
        })
    }
}

/// Partial update. `tag_ids: None` leaves tags untouched, `Some(vec![])`
/// clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) tag_ids: Option<Vec<i64>>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: self.title.map(|v| normalize_title(&v)).transpose()?,
            content: self.content.map(|v| normalize_content(&v)).transpose()?,
            excerpt: match self.excerpt {
                // blank excerpt means "derive it again"
                Some(excerpt) => normalize_excerpt(&excerpt)?,
                None => None,
            },
            featured_image: match self.featured_image {
                Some(url) => Some(normalize_url("featured_image", &url)?.unwrap_or_default()),
                None => None,
            },
            status: self.status,
            tag_ids: self.tag_ids.map(normalize_tag_ids).transpose()?,
        })
    }
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = sanitize_text(title);
    let len = title.chars().count();
    if !(5..=200).contains(&len) {
        return Err(DomainError::validation("title", "must be 5..200 chars"));
    }
    Ok(title)
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.chars().count() < 10 {
        return Err(DomainError::validation("content", "must be at least 10 chars"));
    }
    Ok(content.to_string())
}

fn normalize_excerpt(excerpt: &str) -> Result<Option<String>, DomainError> {
    let excerpt = sanitize_text(excerpt);
    if excerpt.chars().count() > 500 {
        return Err(DomainError::validation("excerpt", "must be at most 500 chars"));
    }
    Ok((!excerpt.is_empty()).then_some(excerpt))
}

fn normalize_tag_ids(mut ids: Vec<i64>) -> Result<Vec<i64>, DomainError> {
    if ids.iter().any(|id| *id <= 0) {
        return Err(DomainError::validation("tag_ids", "must contain positive ids"));
    }
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}
