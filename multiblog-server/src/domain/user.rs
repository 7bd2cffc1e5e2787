use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{ValidateEmail, ValidateUrl};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct User {
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

impl User {
    pub(crate) fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            avatar: self.avatar.clone(),
        }
    }

    pub(crate) fn actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            is_admin: self.is_admin,
        }
    }
}

/// Public part of a user attached to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AuthorSummary {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) avatar: Option<String>,
}

/// Caller of an operation, as established by authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Actor {
    pub(crate) user_id: i64,
    pub(crate) is_admin: bool,
}

impl Actor {
    /// Owner of the resource or an admin.
    pub(crate) fn can_modify(&self, owner_id: i64) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) username: String,
    pub(crate) password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        validate_password("password", &self.password)?;
        Ok(Self {
            first_name: normalize_name("first_name", &self.first_name)?,
            last_name: normalize_name("last_name", &self.last_name)?,
            email: normalize_email(&self.email)?,
            username: normalize_username(&self.username)?,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    /// Either the account email or its username.
    pub(crate) login: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let login = self.login.trim();
        if login.is_empty() || login.len() > 100 {
            return Err(DomainError::validation("login", "must be 1..100 chars"));
        }
        if self.password.is_empty() {
            return Err(DomainError::validation("password", "must not be empty"));
        }

        // emails are stored lower-cased
        let login = if login.contains('@') {
            login.to_lowercase()
        } else {
            login.to_string()
        };
        Ok(Self {
            login,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct UpdateProfileRequest {
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) bio: Option<String>,
    pub(crate) avatar: Option<String>,
}

/// Validated profile update. For `bio` and `avatar`, `Some(None)` clears the
/// stored value.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProfileChanges {
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) bio: Option<Option<String>>,
    pub(crate) avatar: Option<Option<String>>,
}

impl UpdateProfileRequest {
    pub(crate) fn validate(self) -> Result<ProfileChanges, DomainError> {
        Ok(ProfileChanges {
            first_name: self
                .first_name
                .map(|v| normalize_name("first_name", &v))
                .transpose()?,
            last_name: self
                .last_name
                .map(|v| normalize_name("last_name", &v))
                .transpose()?,
            email: self.email.map(|v| normalize_email(&v)).transpose()?,
            username: self.username.map(|v| normalize_username(&v)).transpose()?,
            bio: self.bio.map(|v| normalize_bio(&v)).transpose()?,
            avatar: self
                .avatar
                .map(|v| normalize_url("avatar", &v))
                .transpose()?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ChangePasswordRequest {
    pub(crate) current_password: String,
    pub(crate) new_password: String,
}

impl ChangePasswordRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if self.current_password.is_empty() {
            return Err(DomainError::validation("current_password", "must not be empty"));
        }
        validate_password("new_password", &self.new_password)?;
        Ok(self)
    }
}

fn normalize_name(field: &'static str, value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    let len = value.chars().count();
    if !(2..=50).contains(&len) {
        return Err(DomainError::validation(field, "must be 2..50 chars"));
    }
    Ok(value.to_string())
}

pub(crate) fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.len() < 3 || username.len() > 30 {
        return Err(DomainError::validation("username", "must be 3..30 chars"));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DomainError::validation(
            "username",
            "must contain only latin letters and digits",
        ));
    }
    Ok(username.to_string())
}

pub(crate) fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if email.len() > 100 || !email.validate_email() {
        return Err(DomainError::validation("email", "must be a valid email"));
    }
    Ok(email)
}

pub(crate) fn validate_password(field: &'static str, password: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if !(8..=128).contains(&len) {
        return Err(DomainError::validation(field, "must be 8..128 chars"));
    }
    Ok(())
}

fn normalize_bio(bio: &str) -> Result<Option<String>, DomainError> {
    let bio = bio.trim();
    if bio.chars().count() > 500 {
        return Err(DomainError::validation("bio", "must be at most 500 chars"));
    }
    Ok((!bio.is_empty()).then(|| bio.to_string()))
}

/// Empty input clears the value.
pub(crate) fn normalize_url(
    field: &'static str,
    value: &str,
) -> Result<Option<String>, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let has_web_scheme = value.starts_with("http://") || value.starts_with("https://");
    if !has_web_scheme || !value.validate_url() {
        return Err(DomainError::validation(field, "must be an http(s) URL"));
    }
    Ok(Some(value.to_string()))
}
