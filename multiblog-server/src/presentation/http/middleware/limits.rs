use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::warn;

use crate::presentation::http::app_error::AppError;

#[derive(Debug, Clone, Copy)]
pub(crate) struct HttpLimits {
    pub(crate) body_limit_bytes: usize,
    pub(crate) concurrency: usize,
    pub(crate) timeout: Duration,
}

pub(crate) fn apply_limits(router: Router, limits: HttpLimits) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_limit_error))
            .layer(TimeoutLayer::new(limits.timeout))
            .layer(ConcurrencyLimitLayer::new(limits.concurrency))
            .layer(RequestBodyLimitLayer::new(limits.body_limit_bytes)),
    )
}

async fn handle_limit_error(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        warn!("request timed out");
        return AppError::Timeout.into_response();
    }
    AppError::Internal(anyhow::anyhow!("middleware failure: {err}")).into_response()
}
