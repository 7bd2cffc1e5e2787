use axum::{extract::Request, middleware::Next, response::Response};

use crate::presentation::http::app_error::AppError;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

/// Runs after `jwt_auth_middleware`; rejects callers without the admin flag.
pub(crate) async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or(AppError::Unauthorized)?;
    if !user.is_admin {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
