use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Account as returned by the profile and auth endpoints.
pub struct User {
    /// User id.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Unique login name.
    pub username: String,
    /// Free-form bio.
    pub bio: Option<String>,
    /// Avatar URL.
    pub avatar: Option<String>,
    /// Deactivated accounts cannot log in.
    pub is_active: bool,
    /// Grants access to `/api/admin`.
    pub is_admin: bool,
    /// Registration time (UTC).
    pub created_at: DateTime<Utc>,
    /// Last profile change (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Public author card embedded in posts and comments.
pub struct Author {
    /// User id.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Avatar URL.
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Successful login or token refresh.
pub struct AuthResponse {
    /// Logged-in account.
    pub user: User,
    /// JWT to send as `Authorization: Bearer <token>`.
    pub token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Tag attached to posts.
pub struct Tag {
    /// Tag id.
    pub id: i64,
    /// Display name, unique ignoring case.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Optional description.
    pub description: Option<String>,
    /// Hex color, `#RRGGBB` or `#RGB`.
    pub color: String,
    /// Published posts carrying the tag, when the endpoint reports it.
    #[serde(default)]
    pub posts_count: Option<i64>,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
    /// Last change (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Post with its author, tags and approved comment count.
pub struct Post {
    /// Post id.
    pub id: i64,
    /// Title.
    pub title: String,
    /// URL slug, unique across posts.
    pub slug: String,
    /// Body text.
    pub content: String,
    /// Short summary.
    pub excerpt: String,
    /// Cover image URL.
    pub featured_image: Option<String>,
    /// `draft`, `published` or `archived`.
    pub status: String,
    /// Reads of the published post.
    pub view_count: i64,
    /// Approved comments.
    pub comment_count: i64,
    /// Author id.
    pub author_id: i64,
    /// Author card, absent when the account is gone.
    pub author: Option<Author>,
    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// First publication time (UTC).
    pub published_at: Option<DateTime<Utc>>,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
    /// Last change (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Comment with nested replies.
pub struct Comment {
    /// Comment id.
    pub id: i64,
    /// Post the comment belongs to.
    pub post_id: i64,
    /// Author id.
    pub author_id: i64,
    /// Comment this one replies to.
    pub parent_id: Option<i64>,
    /// Text.
    pub content: String,
    /// `pending`, `approved` or `rejected`.
    pub status: String,
    /// Author card.
    pub author: Option<Author>,
    /// Approved replies, oldest first.
    #[serde(default)]
    pub replies: Vec<Comment>,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
    /// Last change (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One page of a listing.
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    /// Page size used by the server.
    pub per_page: u32,
    /// Items across all pages.
    pub total: i64,
    /// Number of pages, `0` for an empty listing.
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Input for [`crate::BlogClient::register`].
pub struct RegisterInput {
    /// Given name, 2..50 chars.
    pub first_name: String,
    /// Family name, 2..50 chars.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Login name, 3..30 chars.
    pub username: String,
    /// Password, 8..128 chars.
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Input for [`crate::BlogClient::create_post`].
pub struct NewPost {
    /// Title, 5..200 chars.
    pub title: String,
    /// Body, at least 10 chars.
    pub content: String,
    /// Derived from the content when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Cover image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    /// `draft` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Tags to attach.
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Partial update for [`crate::BlogClient::update_post`]; `None` fields are
/// left untouched.
pub struct PostUpdate {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New excerpt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// New cover image, `""` clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Replacement tag set, `Some(vec![])` clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Input for [`crate::BlogClient::create_tag`].
pub struct NewTag {
    /// Name, 2..50 chars.
    pub name: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Hex color, server default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
