use tracing::info;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::stats::UserStats;
use crate::domain::user::{Actor, UpdateProfileRequest, User};

pub(crate) struct UserService<U: UserRepository> {
    repo: U,
}

impl<U: UserRepository> UserService<U> {
    pub(crate) fn new(repo: U) -> Self {
        Self { repo }
    }

    pub(crate) async fn get_profile(&self, user_id: i64) -> Result<User, DomainError> {
        self.get_user(user_id).await
    }

    /// Account behind a token; missing or deactivated accounts are no longer
    /// authenticated.
    pub(crate) async fn active_user(&self, user_id: i64) -> Result<User, DomainError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Unauthenticated)?;
        if !user.is_active {
            return Err(DomainError::AccountDisabled);
        }
        Ok(user)
    }

    pub(crate) async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        let changes = req.validate()?;

        if let Some(email) = &changes.email
            && self.repo.email_taken(email, Some(user_id)).await?
        {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }
        if let Some(username) = &changes.username
            && self.repo.username_taken(username, Some(user_id)).await?
        {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }

        let user = self
            .repo
            .update_profile(user_id, changes)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;

        info!(user_id, "profile updated");
        Ok(user)
    }

    pub(crate) async fn list_users(&self, page: PageRequest) -> Result<Page<User>, DomainError> {
        let users = self.repo.list_users(page).await?;
        let total = self.repo.count_users().await?;
        Ok(Page::new(users, page, total))
    }

    pub(crate) async fn get_user(&self, user_id: i64) -> Result<User, DomainError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))
    }

    pub(crate) async fn activate_user(&self, user_id: i64) -> Result<User, DomainError> {
        self.set_active(user_id, true).await
    }

    pub(crate) async fn deactivate_user(
        &self,
        actor: &Actor,
        user_id: i64,
    ) -> Result<User, DomainError> {
        if actor.user_id == user_id {
            return Err(DomainError::validation(
                "id",
                "you cannot deactivate your own account",
            ));
        }
        self.set_active(user_id, false).await
    }

    pub(crate) async fn user_stats(&self) -> Result<UserStats, DomainError> {
        self.repo.stats().await
    }

    async fn set_active(&self, user_id: i64, is_active: bool) -> Result<User, DomainError> {
        let user = self
            .repo
            .set_active(user_id, is_active)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;

        info!(user_id, is_active, "user activation changed");
        Ok(user)
    }
}
