use axum::extract::{FromRequest, FromRequestParts, Json, Path, Query};
use serde::{Deserialize, Deserializer};
use utoipa::IntoParams;

use crate::domain::pagination::PageRequest;
use crate::presentation::http::app_error::AppError;

/// JSON body whose rejections render as the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub(crate) struct ApiJson<T>(pub(crate) T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub(crate) struct ApiPath<T>(pub(crate) T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub(crate) struct ApiQuery<T>(pub(crate) T);

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct PageQuery {
    /// 1-based page number, 0 or absent means 1.
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) page: Option<u32>,
    /// Items per page, clamped to 1..=100, default 10.
    #[serde(default, deserialize_with = "lenient_number")]
    pub(crate) per_page: Option<u32>,
}

impl PageQuery {
    pub(crate) fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

/// Paging numbers that do not parse (negative, non-numeric, empty) count as
/// absent, so they fall back to the defaults instead of failing the request.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse::<u32>().ok()))
}
