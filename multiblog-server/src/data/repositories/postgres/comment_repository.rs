use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::comment_repository::{CommentPatch, CommentRepository, NewComment};
use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::error::DomainError;
use crate::domain::pagination::PageRequest;
use crate::domain::stats::CommentStats;

const COMMENT_COLUMNS: &str =
    "c.id, c.post_id, c.author_id, c.parent_id, c.content, c.status, c.created_at, c.updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    parent_id: Option<i64>,
    content: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ApprovedCountRow {
    post_id: i64,
    total: i64,
}

#[derive(sqlx::FromRow)]
struct CommentStatsRow {
    total: i64,
    pending: i64,
    approved: i64,
    rejected: i64,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            INSERT INTO comments AS c (post_id, author_id, parent_id, content, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(input.post_id)
        .bind(input.author_id)
        .bind(input.parent_id)
        .bind(input.content)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        map_row_to_comment(row)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        row.map(map_row_to_comment).transpose()
    }

    async fn update_comment(
        &self,
        id: i64,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            UPDATE comments AS c
            SET content = $2, status = $3, updated_at = NOW()
            WHERE c.id = $1
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.content)
        .bind(patch.status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        row.map(map_row_to_comment).transpose()
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        // replies go with their parent through comments_parent_fkey
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_status(
        &self,
        id: i64,
        status: CommentStatus,
    ) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            UPDATE comments AS c
            SET status = $2, updated_at = NOW()
            WHERE c.id = $1
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        row.map(map_row_to_comment).transpose()
    }

    async fn approved_roots(
        &self,
        post_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            WHERE c.post_id = $1 AND c.parent_id IS NULL AND c.status = 'approved'
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2
            OFFSET $3
            "#
        ))
        .bind(post_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        rows.into_iter().map(map_row_to_comment).collect()
    }

    async fn count_approved_roots(&self, post_id: i64) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM comments
            WHERE post_id = $1 AND parent_id IS NULL AND status = 'approved'
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)
    }

    async fn approved_descendants(&self, root_ids: &[i64]) -> Result<Vec<Comment>, DomainError> {
        if root_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            WITH RECURSIVE thread AS (
                SELECT c.*
                FROM comments c
                WHERE c.parent_id = ANY($1) AND c.status = 'approved'
                UNION
                SELECT c.*
                FROM comments c
                JOIN thread t ON c.parent_id = t.id
                WHERE c.status = 'approved'
            )
            SELECT {COMMENT_COLUMNS}
            FROM thread c
            ORDER BY c.created_at ASC, c.id ASC
            "#
        ))
        .bind(root_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        rows.into_iter().map(map_row_to_comment).collect()
    }

    async fn by_author(
        &self,
        author_id: i64,
        page: PageRequest,
    ) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            WHERE c.author_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2
            OFFSET $3
            "#
        ))
        .bind(author_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        rows.into_iter().map(map_row_to_comment).collect()
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_comment_db_error)
    }

    async fn pending(&self, page: PageRequest) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            WHERE c.status = 'pending'
            ORDER BY c.created_at ASC, c.id ASC
            LIMIT $1
            OFFSET $2
            "#
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        rows.into_iter().map(map_row_to_comment).collect()
    }

    async fn count_pending(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE status = 'pending'")
            .fetch_one(&self.pool)
            .await
            .map_err(map_comment_db_error)
    }

    async fn approved_counts(&self, post_ids: &[i64]) -> Result<Vec<(i64, i64)>, DomainError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ApprovedCountRow>(
            r#"
            SELECT post_id, COUNT(*) AS total
            FROM comments
            WHERE post_id = ANY($1) AND status = 'approved'
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(rows.into_iter().map(|row| (row.post_id, row.total)).collect())
    }

    async fn stats(&self) -> Result<CommentStats, DomainError> {
        let row = sqlx::query_as::<_, CommentStatsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
            FROM comments
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(CommentStats {
            total: row.total,
            pending: row.pending,
            approved: row.approved,
            rejected: row.rejected,
        })
    }
}

fn map_row_to_comment(row: CommentRow) -> Result<Comment, DomainError> {
    let status = row
        .status
        .parse::<CommentStatus>()
        .map_err(|_| DomainError::Unexpected(format!("unknown comment status: {}", row.status)))?;

    Ok(Comment {
        id: row.id,
        post_id: row.post_id,
        author_id: row.author_id,
        parent_id: row.parent_id,
        content: row.content,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23503") => {
                let resource = match db_err.constraint() {
                    Some("comments_parent_fkey") => "parent comment",
                    Some("comments_author_id_fkey") => "author",
                    _ => "post",
                };
                return DomainError::NotFound(resource.to_string());
            }
            Some("23514") => {
                return DomainError::validation("parent_id", "a comment cannot reply to itself");
            }
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
