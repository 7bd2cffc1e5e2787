use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::auth_service::AuthResult;
use crate::domain::user::{
    AuthorSummary, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
    User,
};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, ErrorEnvelope};
use crate::presentation::http::envelope::{ApiResponse, Reply, created, done, ok};
use crate::presentation::http::extract::ApiJson;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterDto {
    #[validate(length(min = 2, max = 50))]
    pub(crate) first_name: String,
    #[validate(length(min = 2, max = 50))]
    pub(crate) last_name: String,
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 3, max = 30))]
    pub(crate) username: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    /// Email or username.
    #[serde(alias = "email", alias = "username")]
    #[validate(length(min = 1, max = 100))]
    pub(crate) login: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateProfileDto {
    #[validate(length(min = 2, max = 50))]
    pub(crate) first_name: Option<String>,
    #[validate(length(min = 2, max = 50))]
    pub(crate) last_name: Option<String>,
    #[validate(email)]
    pub(crate) email: Option<String>,
    #[validate(length(min = 3, max = 30))]
    pub(crate) username: Option<String>,
    /// Empty string clears the bio.
    #[validate(length(max = 500))]
    pub(crate) bio: Option<String>,
    /// Empty string clears the avatar.
    pub(crate) avatar: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ChangePasswordDto {
    #[validate(length(min = 1))]
    pub(crate) current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) username: String,
    pub(crate) bio: Option<String>,
    pub(crate) avatar: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) is_admin: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Public author card embedded in posts and comments.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) avatar: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthResponseDto {
    pub(crate) user: UserDto,
    pub(crate) token: String,
    pub(crate) token_type: &'static str,
    pub(crate) expires_in: i64,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            username: user.username,
            bio: user.bio,
            avatar: user.avatar,
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<AuthorSummary> for AuthorDto {
    fn from(author: AuthorSummary) -> Self {
        Self {
            id: author.id,
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
            avatar: author.avatar,
        }
    }
}

impl From<AuthResult> for AuthResponseDto {
    fn from(result: AuthResult) -> Self {
        Self {
            user: result.user.into(),
            token: result.token.token,
            token_type: "Bearer",
            expires_in: result.token.expires_in,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered successfully", body = ApiResponse<UserDto>),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 409, description = "Email or username already taken", body = ErrorEnvelope),
        (status = 500, description = "Internal error", body = ErrorEnvelope)
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<RegisterDto>,
) -> AppResult<Reply<UserDto>> {
    dto.validate()?;

    let req = RegisterRequest {
        first_name: dto.first_name,
        last_name: dto.last_name,
        email: dto.email,
        username: dto.username,
        password: dto.password,
    };

    let user = state.auth_service.register(req).await?;
    Ok(created("User registered successfully", user.into()))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials or deactivated account", body = ErrorEnvelope),
        (status = 500, description = "Internal error", body = ErrorEnvelope)
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<LoginDto>,
) -> AppResult<Reply<AuthResponseDto>> {
    dto.validate()?;

    let req = LoginRequest {
        login: dto.login,
        password: dto.password,
    };

    let result = state.auth_service.login(req).await?;
    Ok(ok(result.into()))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Fresh token issued", body = ApiResponse<AuthResponseDto>),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope)
    )
)]
pub(crate) async fn refresh(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<Reply<AuthResponseDto>> {
    let result = state.auth_service.refresh(auth.user_id).await?;
    Ok(ok(result.into()))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserDto>),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope)
    )
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<Reply<UserDto>> {
    let user = state.user_service.get_profile(auth.user_id).await?;
    Ok(ok(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserDto>),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 409, description = "Email or username already taken", body = ErrorEnvelope)
    )
)]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(dto): ApiJson<UpdateProfileDto>,
) -> AppResult<Reply<UserDto>> {
    dto.validate()?;

    let req = UpdateProfileRequest {
        first_name: dto.first_name,
        last_name: dto.last_name,
        email: dto.email,
        username: dto.username,
        bio: dto.bio,
        avatar: dto.avatar,
    };

    let user = state.user_service.update_profile(auth.user_id, req).await?;
    Ok(ok(user.into()))
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation error", body = ErrorEnvelope),
        (status = 401, description = "Wrong current password", body = ErrorEnvelope)
    )
)]
pub(crate) async fn change_password(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(dto): ApiJson<ChangePasswordDto>,
) -> AppResult<Reply<()>> {
    dto.validate()?;

    let req = ChangePasswordRequest {
        current_password: dto.current_password,
        new_password: dto.new_password,
    };

    state.auth_service.change_password(auth.user_id, req).await?;
    Ok(done("Password changed successfully"))
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::{LoginDto, RegisterDto};

    #[test]
    fn login_accepts_email_or_username_key() {
        let by_email: LoginDto =
            serde_json::from_str(r#"{"email":"a@example.com","password":"secret"}"#)
                .expect("email alias");
        assert_eq!(by_email.login, "a@example.com");

        let by_username: LoginDto =
            serde_json::from_str(r#"{"username":"alice","password":"secret"}"#)
                .expect("username alias");
        assert_eq!(by_username.login, "alice");
    }

    #[test]
    fn register_dto_rejects_bad_email_and_short_password() {
        let dto = RegisterDto {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "nope".to_string(),
            username: "ada".to_string(),
            password: "short".to_string(),
        };
        let errors = dto.validate().expect_err("dto is invalid");
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
