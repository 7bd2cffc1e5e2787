use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{BlogClientError, BlogClientResult};
use crate::models::{
    AuthResponse, Comment, NewPost, NewTag, Page, Post, PostUpdate, RegisterInput, Tag, User,
};

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    login: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateCommentRequestDto<'a> {
    post_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<i64>,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct PageQuery {
    page: u32,
    per_page: u32,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
    page: u32,
    per_page: u32,
}

#[derive(Debug, Deserialize)]
struct ApiResponseDto<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct PaginationDto {
    page: u32,
    per_page: u32,
    total: i64,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct ApiListDto<T> {
    data: Vec<T>,
    pagination: PaginationDto,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelopeDto {
    error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
struct ErrorBodyDto {
    message: String,
    #[serde(default)]
    fields: Vec<FieldErrorDto>,
}

#[derive(Debug, Deserialize)]
struct FieldErrorDto {
    field: String,
    code: String,
}

#[derive(Debug, Deserialize)]
struct PendingCountDto {
    count: i64,
}

impl<T> From<ApiListDto<T>> for Page<T> {
    fn from(value: ApiListDto<T>) -> Self {
        Self {
            items: value.data,
            page: value.pagination.page,
            per_page: value.pagination.per_page,
            total: value.pagination.total,
            total_pages: value.pagination.total_pages,
        }
    }
}

impl ErrorBodyDto {
    fn describe(&self) -> String {
        if self.fields.is_empty() {
            return self.message.clone();
        }
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{}: {}", f.field, f.code))
            .collect();
        format!("{} ({})", self.message, fields.join(", "))
    }
}

#[derive(Debug, Clone)]
/// REST transport for the multiblog API.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: reqwest::Response) -> BlogClientError {
        let status = response.status();

        let message = match response.json::<ErrorEnvelopeDto>().await {
            Ok(body) => body.error.describe(),
            Err(_) => format!("http status {status}"),
        };
        BlogClientError::from_http_status(status, Some(message))
    }

    async fn execute(request: RequestBuilder) -> BlogClientResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(BlogClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    /// Unwraps `data` of a single-item envelope.
    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> BlogClientResult<T> {
        let envelope = Self::execute(request)
            .await?
            .json::<ApiResponseDto<T>>()
            .await
            .map_err(BlogClientError::from_reqwest)?;
        envelope
            .data
            .ok_or_else(|| BlogClientError::InvalidRequest("response carries no data".to_string()))
    }

    async fn fetch_page<T: DeserializeOwned>(request: RequestBuilder) -> BlogClientResult<Page<T>> {
        let list = Self::execute(request)
            .await?
            .json::<ApiListDto<T>>()
            .await
            .map_err(BlogClientError::from_reqwest)?;
        Ok(list.into())
    }

    pub(crate) async fn register(&self, input: &RegisterInput) -> BlogClientResult<User> {
        Self::fetch(self.request(Method::POST, "/api/auth/register", None).json(input)).await
    }

    pub(crate) async fn login(&self, login: &str, password: &str) -> BlogClientResult<AuthResponse> {
        let payload = LoginRequestDto { login, password };
        Self::fetch(self.request(Method::POST, "/api/auth/login", None).json(&payload)).await
    }

    pub(crate) async fn refresh(&self, token: &str) -> BlogClientResult<AuthResponse> {
        Self::fetch(self.request(Method::POST, "/api/auth/refresh", Some(token))).await
    }

    pub(crate) async fn profile(&self, token: &str) -> BlogClientResult<User> {
        Self::fetch(self.request(Method::GET, "/api/auth/profile", Some(token))).await
    }

    pub(crate) async fn create_post(&self, token: &str, post: &NewPost) -> BlogClientResult<Post> {
        Self::fetch(self.request(Method::POST, "/api/posts", Some(token)).json(post)).await
    }

    pub(crate) async fn get_post(&self, token: Option<&str>, id: i64) -> BlogClientResult<Post> {
        Self::fetch(self.request(Method::GET, &format!("/api/posts/{id}"), token)).await
    }

    pub(crate) async fn get_post_by_slug(
        &self,
        token: Option<&str>,
        slug: &str,
    ) -> BlogClientResult<Post> {
        Self::fetch(self.request(Method::GET, &format!("/api/posts/slug/{slug}"), token)).await
    }

    pub(crate) async fn update_post(
        &self,
        token: &str,
        id: i64,
        update: &PostUpdate,
    ) -> BlogClientResult<Post> {
        Self::fetch(
            self.request(Method::PUT, &format!("/api/posts/{id}"), Some(token))
                .json(update),
        )
        .await
    }

    pub(crate) async fn delete_post(&self, token: &str, id: i64) -> BlogClientResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/api/posts/{id}"), Some(token)))
            .await?;
        Ok(())
    }

    /// `action` is `publish` or `unpublish`.
    pub(crate) async fn post_transition(
        &self,
        token: &str,
        id: i64,
        action: &str,
    ) -> BlogClientResult<Post> {
        Self::fetch(self.request(
            Method::POST,
            &format!("/api/posts/{id}/{action}"),
            Some(token),
        ))
        .await
    }

    pub(crate) async fn list_posts(
        &self,
        token: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> BlogClientResult<Page<Post>> {
        Self::fetch_page(
            self.request(Method::GET, "/api/posts", token)
                .query(&PageQuery { page, per_page }),
        )
        .await
    }

    pub(crate) async fn published_posts(
        &self,
        page: u32,
        per_page: u32,
    ) -> BlogClientResult<Page<Post>> {
        Self::fetch_page(
            self.request(Method::GET, "/api/posts/published", None)
                .query(&PageQuery { page, per_page }),
        )
        .await
    }

    pub(crate) async fn search_posts(
        &self,
        q: &str,
        page: u32,
        per_page: u32,
    ) -> BlogClientResult<Page<Post>> {
        Self::fetch_page(
            self.request(Method::GET, "/api/posts/search", None)
                .query(&SearchQuery { q, page, per_page }),
        )
        .await
    }

    pub(crate) async fn list_tags(&self, page: u32, per_page: u32) -> BlogClientResult<Page<Tag>> {
        Self::fetch_page(
            self.request(Method::GET, "/api/tags", None)
                .query(&PageQuery { page, per_page }),
        )
        .await
    }

    pub(crate) async fn popular_tags(&self, limit: u32) -> BlogClientResult<Vec<Tag>> {
        Self::fetch(
            self.request(Method::GET, "/api/tags/popular", None)
                .query(&[("limit", limit)]),
        )
        .await
    }

    pub(crate) async fn create_tag(&self, token: &str, tag: &NewTag) -> BlogClientResult<Tag> {
        Self::fetch(self.request(Method::POST, "/api/admin/tags", Some(token)).json(tag)).await
    }

    pub(crate) async fn add_comment(
        &self,
        token: &str,
        post_id: i64,
        parent_id: Option<i64>,
        content: &str,
    ) -> BlogClientResult<Comment> {
        let payload = CreateCommentRequestDto {
            post_id,
            parent_id,
            content,
        };
        Self::fetch(
            self.request(Method::POST, "/api/comments", Some(token))
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn comments_for_post(
        &self,
        post_id: i64,
        page: u32,
        per_page: u32,
    ) -> BlogClientResult<Page<Comment>> {
        Self::fetch_page(
            self.request(Method::GET, &format!("/api/comments/post/{post_id}"), None)
                .query(&PageQuery { page, per_page }),
        )
        .await
    }

    pub(crate) async fn pending_comments(
        &self,
        token: &str,
        page: u32,
        per_page: u32,
    ) -> BlogClientResult<Page<Comment>> {
        Self::fetch_page(
            self.request(Method::GET, "/api/admin/comments/pending", Some(token))
                .query(&PageQuery { page, per_page }),
        )
        .await
    }

    pub(crate) async fn pending_count(&self, token: &str) -> BlogClientResult<i64> {
        let dto: PendingCountDto = Self::fetch(self.request(
            Method::GET,
            "/api/admin/comments/pending/count",
            Some(token),
        ))
        .await?;
        Ok(dto.count)
    }

    /// `action` is `approve` or `reject`.
    pub(crate) async fn moderate_comment(
        &self,
        token: &str,
        id: i64,
        action: &str,
    ) -> BlogClientResult<Comment> {
        Self::fetch(self.request(
            Method::POST,
            &format!("/api/admin/comments/{id}/{action}"),
            Some(token),
        ))
        .await
    }
}
