use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::text::sanitize_text;
use super::user::{Actor, AuthorSummary};

pub(crate) const MAX_COMMENT_LEN: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "rejected" => Ok(CommentStatus::Rejected),
            _ => Err(DomainError::validation(
                "status",
                "must be one of: pending, approved, rejected",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) parent_id: Option<i64>,
    pub(crate) content: String,
    pub(crate) status: CommentStatus,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Comment {
    pub(crate) fn ensure_modifiable_by(&self, actor: &Actor) -> Result<(), DomainError> {
        if actor.can_modify(self.author_id) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "only the author or an admin may modify this comment",
            ))
        }
    }

    /// A reply must target an existing comment of the same post.
    pub(crate) fn accepts_reply_on(&self, post_id: i64) -> Result<(), DomainError> {
        if self.post_id != post_id {
            return Err(DomainError::validation(
                "parent_id",
                "must reference a comment on the same post",
            ));
        }
        Ok(())
    }
}

/// Moderation status after an update.
///
/// Admins keep the current status unless they set one explicitly. A content
/// edit by anyone else sends the comment back to review; a status supplied by
/// a non-admin is ignored.
pub(crate) fn status_after_update(
    actor: &Actor,
    current: CommentStatus,
    content_edited: bool,
    requested: Option<CommentStatus>,
) -> CommentStatus {
    if actor.is_admin {
        return requested.unwrap_or(current);
    }
    if content_edited {
        CommentStatus::Pending
    } else {
        current
    }
}

/// A comment with its author and nested replies, oldest reply first.
#[derive(Debug, Clone)]
pub(crate) struct CommentThread {
    pub(crate) comment: Comment,
    pub(crate) author: Option<AuthorSummary>,
    pub(crate) replies: Vec<CommentThread>,
}

impl CommentThread {
    pub(crate) fn leaf(comment: Comment, author: Option<AuthorSummary>) -> Self {
        Self {
            comment,
            author,
            replies: Vec::new(),
        }
    }
}

/// Nests `descendants` under `roots` by `parent_id`.
///
/// Roots keep their order, replies are sorted by creation time. Descendants
/// whose parent is not reachable from a root are dropped, and a comment is
/// never placed twice, so malformed parent chains cannot recurse forever.
pub(crate) fn build_threads(
    roots: Vec<Comment>,
    descendants: Vec<Comment>,
    authors: &HashMap<i64, AuthorSummary>,
) -> Vec<CommentThread> {
    let mut children: HashMap<i64, Vec<Comment>> = HashMap::new();
    for reply in descendants {
        if let Some(parent_id) = reply.parent_id
            && parent_id != reply.id
        {
            children.entry(parent_id).or_default().push(reply);
        }
    }
    for replies in children.values_mut() {
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    }

    let mut placed = HashSet::new();
    roots
        .into_iter()
        .filter_map(|root| attach(root, &mut children, authors, &mut placed))
        .collect()
}

fn attach(
    comment: Comment,
    children: &mut HashMap<i64, Vec<Comment>>,
    authors: &HashMap<i64, AuthorSummary>,
    placed: &mut HashSet<i64>,
) -> Option<CommentThread> {
    if !placed.insert(comment.id) {
        return None;
    }

    let replies = children
        .remove(&comment.id)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|reply| attach(reply, children, authors, placed))
        .collect();
    let author = authors.get(&comment.author_id).cloned();

    Some(CommentThread {
        comment,
        author,
        replies,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateCommentRequest {
    pub(crate) post_id: i64,
    pub(crate) parent_id: Option<i64>,
    pub(crate) content: String,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if self.post_id <= 0 {
            return Err(DomainError::validation("post_id", "must be > 0"));
        }
        if self.parent_id.is_some_and(|id| id <= 0) {
            return Err(DomainError::validation("parent_id", "must be > 0"));
        }
        Ok(Self {
            post_id: self.post_id,
            parent_id: self.parent_id,
            content: normalize_content(&self.content)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct UpdateCommentRequest {
    pub(crate) content: Option<String>,
    pub(crate) status: Option<CommentStatus>,
}

impl UpdateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: self.content.map(|v| normalize_content(&v)).transpose()?,
            status: self.status,
        })
    }
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = sanitize_text(content);
    let len = content.chars().count();
    if len == 0 || len > MAX_COMMENT_LEN {
        return Err(DomainError::validation("content", "must be 1..1000 chars"));
    }
    Ok(content)
}
