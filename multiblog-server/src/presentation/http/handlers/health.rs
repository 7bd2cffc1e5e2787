use serde::Serialize;
use utoipa::ToSchema;

use crate::presentation::http::envelope::{ApiResponse, Reply, ok};

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthDto {
    pub(crate) status: &'static str,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = ApiResponse<HealthDto>)
    )
)]
pub(crate) async fn healthz() -> Reply<HealthDto> {
    ok(HealthDto { status: "ok" })
}
