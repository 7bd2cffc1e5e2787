use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::user::Actor;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

/// Caller resolved from a bearer token. Flags come from the stored account,
/// not from the token claims.
#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) is_admin: bool,
}

impl AuthenticatedUser {
    pub(crate) fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            is_admin: self.is_admin,
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Caller on routes where authentication is optional.
#[derive(Debug, Clone)]
pub(crate) struct MaybeUser(pub(crate) Option<AuthenticatedUser>);

impl MaybeUser {
    pub(crate) fn actor(&self) -> Option<Actor> {
        self.0.as_ref().map(AuthenticatedUser::actor)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_header = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next().ok_or(AppError::Unauthorized)?;
    let token = parts.next().ok_or(AppError::Unauthorized)?;
    if parts.next().is_some() {
        return Err(AppError::Unauthorized);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized);
    }
    if token.trim().is_empty() {
        return Err(AppError::Unauthorized);
    }
    Ok(Some(token.trim()))
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthenticatedUser, AppError> {
    let claims = state
        .jwt
        .verify_token(token)
        .map_err(|_| AppError::Unauthorized)?;
    let user = state.user_service.active_user(claims.user_id).await?;

    Ok(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
        is_admin: user.is_admin,
    })
}

pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?.ok_or(AppError::Unauthorized)?;
    let user = authenticate(&state, token).await?;
    debug!(user_id = user.user_id, username = %user.username, "request authenticated");

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Attaches the caller when a usable token is present; anything else
/// continues anonymously.
pub(crate) async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok()
        .flatten()
        .map(str::to_string);

    if let Some(token) = token {
        match authenticate(&state, &token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(AppError::Domain(DomainError::Unexpected(detail))) => {
                return Err(DomainError::Unexpected(detail).into());
            }
            Err(err) => debug!(error = %err, "ignoring unusable token"),
        }
    }

    Ok(next.run(request).await)
}
