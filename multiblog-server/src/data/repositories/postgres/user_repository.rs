use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::PageRequest;
use crate::domain::stats::UserStats;
use crate::domain::user::{AuthorSummary, ProfileChanges, User};

const USER_COLUMNS: &str = "id, first_name, last_name, email, username, bio, avatar, \
     is_active, is_admin, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    username: String,
    bio: Option<String>,
    avatar: Option<String>,
    is_active: bool,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[derive(sqlx::FromRow)]
struct AuthorSummaryRow {
    id: i64,
    username: String,
    first_name: String,
    last_name: String,
    avatar: Option<String>,
}

#[derive(sqlx::FromRow)]
struct UserStatsRow {
    total: i64,
    active: i64,
    admins: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            username: row.username,
            bio: row.bio,
            avatar: row.avatar,
            is_active: row.is_active,
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<UserCredentialsRow> for UserCredentials {
    fn from(row: UserCredentialsRow) -> Self {
        Self {
            user: row.user.into(),
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, email, username, password_hash, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.email)
        .bind(input.username)
        .bind(input.password_hash)
        .bind(input.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }

    async fn find_credentials(&self, login: &str) -> Result<Option<UserCredentials>, DomainError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}, password_hash
            FROM users
            WHERE email = LOWER($1) OR username = $1
            LIMIT 1
            "#
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(UserCredentials::from))
    }

    async fn find_credentials_by_id(
        &self,
        id: i64,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(UserCredentials::from))
    }

    async fn email_taken(&self, email: &str, exclude_id: Option<i64>) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)
    }

    async fn username_taken(
        &self,
        username: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE username = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(username)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<User>, DomainError> {
        let (set_bio, bio) = split_clearable(changes.bio);
        let (set_avatar, avatar) = split_clearable(changes.avatar);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                username = COALESCE($5, username),
                bio = CASE WHEN $6 THEN $7 ELSE bio END,
                avatar = CASE WHEN $8 THEN $9 ELSE avatar END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.email)
        .bind(changes.username)
        .bind(set_bio)
        .bind(bio)
        .bind(set_avatar)
        .bind(avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }

    async fn list_users(&self, page: PageRequest) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            OFFSET $2
            "#
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn count_users(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_db_error)
    }

    async fn summaries(&self, ids: &[i64]) -> Result<Vec<AuthorSummary>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, AuthorSummaryRow>(
            r#"
            SELECT id, username, first_name, last_name, avatar
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| AuthorSummary {
                id: row.id,
                username: row.username,
                first_name: row.first_name,
                last_name: row.last_name,
                avatar: row.avatar,
            })
            .collect())
    }

    async fn stats(&self) -> Result<UserStats, DomainError> {
        let row = sqlx::query_as::<_, UserStatsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_active) AS active,
                COUNT(*) FILTER (WHERE is_admin) AS admins
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(UserStats {
            total: row.total,
            active: row.active,
            inactive: row.total - row.active,
            admins: row.admins,
        })
    }
}

/// `(should_set, value)` pair for nullable columns that may be cleared.
fn split_clearable(value: Option<Option<String>>) -> (bool, Option<String>) {
    match value {
        Some(inner) => (true, inner),
        None => (false, None),
    }
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("users_username_key") => "username",
            Some("users_email_key") => "email",
            _ => "user",
        };
        return DomainError::AlreadyExists(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
