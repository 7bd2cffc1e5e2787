//! Client library for the multiblog REST API.
//!
//! [`BlogClient`] keeps the JWT returned by `login` (and by `register`, which
//! logs the new account in right away) and sends it on every call that needs
//! authentication. Responses are unwrapped from the server's
//! `{success, data}` envelope; error envelopes become [`BlogClientError`].
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{BlogClientError, BlogClientResult};
pub use models::{
    AuthResponse, Author, Comment, NewPost, NewTag, Page, Post, PostUpdate, RegisterInput, Tag,
    User,
};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Typed client for auth, posts, tags, comments and moderation.
pub struct BlogClient {
    http: HttpClient,
    token: Option<String>,
}

impl BlogClient {
    /// Creates a client for a server such as `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Sets the JWT manually, e.g. one persisted by a previous session.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Current JWT, if any.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Forgets the stored JWT.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Registers an account, then logs it in and stores the token.
    pub async fn register(&mut self, input: &RegisterInput) -> BlogClientResult<AuthResponse> {
        self.http.register(input).await?;
        self.login(&input.username, &input.password).await
    }

    /// Logs in by email or username and stores the token.
    pub async fn login(&mut self, login: &str, password: &str) -> BlogClientResult<AuthResponse> {
        let auth = self.http.login(login, password).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// Exchanges the stored token for a fresh one.
    pub async fn refresh(&mut self) -> BlogClientResult<AuthResponse> {
        let auth = self.http.refresh(self.require_token()?).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// Account behind the stored token.
    pub async fn profile(&self) -> BlogClientResult<User> {
        self.http.profile(self.require_token()?).await
    }

    /// Creates a post owned by the logged-in user.
    pub async fn create_post(&self, post: &NewPost) -> BlogClientResult<Post> {
        self.http.create_post(self.require_token()?, post).await
    }

    /// Reads a post by id. Drafts are visible only with the author's or an
    /// admin's token.
    pub async fn get_post(&self, id: i64) -> BlogClientResult<Post> {
        self.http.get_post(self.token.as_deref(), id).await
    }

    /// Reads a post by slug.
    pub async fn get_post_by_slug(&self, slug: &str) -> BlogClientResult<Post> {
        self.http.get_post_by_slug(self.token.as_deref(), slug).await
    }

    /// Applies a partial update to a post.
    pub async fn update_post(&self, id: i64, update: &PostUpdate) -> BlogClientResult<Post> {
        self.http.update_post(self.require_token()?, id, update).await
    }

    /// Deletes a post together with its comments.
    pub async fn delete_post(&self, id: i64) -> BlogClientResult<()> {
        self.http.delete_post(self.require_token()?, id).await
    }

    /// Publishes a post.
    pub async fn publish_post(&self, id: i64) -> BlogClientResult<Post> {
        self.http
            .post_transition(self.require_token()?, id, "publish")
            .await
    }

    /// Moves a post back to draft.
    pub async fn unpublish_post(&self, id: i64) -> BlogClientResult<Post> {
        self.http
            .post_transition(self.require_token()?, id, "unpublish")
            .await
    }

    /// General listing, newest first. With a token the caller also sees
    /// posts the server lets them see beyond the published ones.
    pub async fn list_posts(&self, page: u32, per_page: u32) -> BlogClientResult<Page<Post>> {
        self.http
            .list_posts(self.token.as_deref(), page, per_page)
            .await
    }

    /// Published feed, newest publication first.
    pub async fn published_posts(&self, page: u32, per_page: u32) -> BlogClientResult<Page<Post>> {
        self.http.published_posts(page, per_page).await
    }

    /// Case-insensitive search over published posts.
    pub async fn search_posts(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> BlogClientResult<Page<Post>> {
        self.http.search_posts(query, page, per_page).await
    }

    /// Tags ordered by name, with published post counts.
    pub async fn list_tags(&self, page: u32, per_page: u32) -> BlogClientResult<Page<Tag>> {
        self.http.list_tags(page, per_page).await
    }

    /// Most used tags, `limit` in 1..=50.
    pub async fn popular_tags(&self, limit: u32) -> BlogClientResult<Vec<Tag>> {
        self.http.popular_tags(limit).await
    }

    /// Creates a tag. Admin only.
    pub async fn create_tag(&self, tag: &NewTag) -> BlogClientResult<Tag> {
        self.http.create_tag(self.require_token()?, tag).await
    }

    /// Adds a comment or a reply; it stays pending until moderated.
    pub async fn add_comment(
        &self,
        post_id: i64,
        parent_id: Option<i64>,
        content: &str,
    ) -> BlogClientResult<Comment> {
        self.http
            .add_comment(self.require_token()?, post_id, parent_id, content)
            .await
    }

    /// Approved comment threads of a published post.
    pub async fn comments_for_post(
        &self,
        post_id: i64,
        page: u32,
        per_page: u32,
    ) -> BlogClientResult<Page<Comment>> {
        self.http.comments_for_post(post_id, page, per_page).await
    }

    /// Moderation queue, oldest first. Admin only.
    pub async fn pending_comments(
        &self,
        page: u32,
        per_page: u32,
    ) -> BlogClientResult<Page<Comment>> {
        self.http
            .pending_comments(self.require_token()?, page, per_page)
            .await
    }

    /// Size of the moderation queue. Admin only.
    pub async fn pending_count(&self) -> BlogClientResult<i64> {
        self.http.pending_count(self.require_token()?).await
    }

    /// Approves a comment. Admin only.
    pub async fn approve_comment(&self, id: i64) -> BlogClientResult<Comment> {
        self.http
            .moderate_comment(self.require_token()?, id, "approve")
            .await
    }

    /// Rejects a comment. Admin only.
    pub async fn reject_comment(&self, id: i64) -> BlogClientResult<Comment> {
        self.http
            .moderate_comment(self.require_token()?, id, "reject")
            .await
    }

    fn require_token(&self) -> BlogClientResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| BlogClientError::Unauthorized("no token, log in first".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{BlogClient, BlogClientError};

    #[tokio::test]
    async fn protected_calls_fail_fast_without_token() {
        let client = BlogClient::new("http://127.0.0.1:1").expect("client");
        let err = client.delete_post(1).await.expect_err("no token");
        assert!(matches!(err, BlogClientError::Unauthorized(_)));
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let mut client = BlogClient::new("http://127.0.0.1:1").expect("client");
        assert!(client.get_token().is_none());
        client.set_token("abc");
        assert_eq!(client.get_token(), Some("abc"));
        client.clear_token();
        assert!(client.get_token().is_none());
    }
}
