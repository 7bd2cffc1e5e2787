use axum::{Json, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::pagination::Page;

/// `{success, message?, data?}` wrapper shared by every single-item response.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ApiResponse<T> {
    pub(crate) success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub(crate) fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub(crate) fn with_message(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub(crate) fn message(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PaginationMeta {
    pub(crate) page: u32,
    pub(crate) per_page: u32,
    pub(crate) total: i64,
    pub(crate) total_pages: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ApiList<T> {
    pub(crate) success: bool,
    pub(crate) data: Vec<T>,
    pub(crate) pagination: PaginationMeta,
}

impl<T> ApiList<T> {
    pub(crate) fn from_page<D>(page: Page<D>) -> Self
    where
        T: From<D>,
    {
        let pagination = PaginationMeta {
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            total_pages: page.total_pages(),
        };
        Self {
            success: true,
            data: page.items.into_iter().map(T::from).collect(),
            pagination,
        }
    }
}

pub(crate) type Reply<T> = (StatusCode, Json<ApiResponse<T>>);
pub(crate) type ListReply<T> = (StatusCode, Json<ApiList<T>>);

pub(crate) fn ok<T>(data: T) -> Reply<T> {
    (StatusCode::OK, Json(ApiResponse::data(data)))
}

pub(crate) fn created<T>(message: &str, data: T) -> Reply<T> {
    (StatusCode::CREATED, Json(ApiResponse::with_message(message, data)))
}

pub(crate) fn done(message: &str) -> Reply<()> {
    (StatusCode::OK, Json(ApiResponse::message(message)))
}

pub(crate) fn list<T, D>(page: Page<D>) -> ListReply<T>
where
    T: From<D>,
{
    (StatusCode::OK, Json(ApiList::from_page(page)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ApiList, ApiResponse};
    use crate::domain::pagination::{Page, PageRequest};

    #[test]
    fn single_response_omits_empty_parts() {
        let body = serde_json::to_value(ApiResponse::data(42)).expect("serializable");
        assert_eq!(body, json!({"success": true, "data": 42}));

        let body = serde_json::to_value(ApiResponse::message("Post deleted")).expect("serializable");
        assert_eq!(body, json!({"success": true, "message": "Post deleted"}));
    }

    #[test]
    fn list_response_carries_pagination() {
        let page = Page::new(vec![1, 2], PageRequest::new(Some(3), Some(10)), 25);
        let body = serde_json::to_value(ApiList::<i64>::from_page(page)).expect("serializable");
        assert_eq!(
            body,
            json!({
                "success": true,
                "data": [1, 2],
                "pagination": {"page": 3, "per_page": 10, "total": 25, "total_pages": 3}
            })
        );
    }
}
