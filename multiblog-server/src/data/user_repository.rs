use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::pagination::PageRequest;
use crate::domain::stats::UserStats;
use crate::domain::user::{AuthorSummary, ProfileChanges, User};

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) username: String,
    pub(crate) password_hash: String,
    pub(crate) is_admin: bool,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;
    /// Looks the account up by email or by username.
    async fn find_credentials(&self, login: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_credentials_by_id(&self, id: i64)
    -> Result<Option<UserCredentials>, DomainError>;
    async fn email_taken(&self, email: &str, exclude_id: Option<i64>) -> Result<bool, DomainError>;
    async fn username_taken(
        &self,
        username: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DomainError>;
    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<User>, DomainError>;
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, DomainError>;
    async fn set_active(&self, id: i64, is_active: bool) -> Result<Option<User>, DomainError>;
    async fn list_users(&self, page: PageRequest) -> Result<Vec<User>, DomainError>;
    async fn count_users(&self) -> Result<i64, DomainError>;
    async fn summaries(&self, ids: &[i64]) -> Result<Vec<AuthorSummary>, DomainError>;
    async fn stats(&self) -> Result<UserStats, DomainError>;
}
