use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::tag_repository::{NewTag, TagPatch, TagRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::PageRequest;
use crate::domain::stats::TagStats;
use crate::domain::tag::{Tag, TagWithCount};

const TAG_COLUMNS: &str = "t.id, t.name, t.slug, t.description, t.color, t.created_at, t.updated_at";

const TOP_TAGS_IN_STATS: i64 = 5;

#[derive(Debug, Clone)]
pub(crate) struct PostgresTagRepository {
    pool: PgPool,
}

impl PostgresTagRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TagRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TagCountRow {
    #[sqlx(flatten)]
    tag: TagRow,
    posts_count: i64,
}

#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: i64,
    #[sqlx(flatten)]
    tag: TagRow,
}

#[derive(sqlx::FromRow)]
struct TagStatsRow {
    total: i64,
    used: i64,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            color: row.color,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<TagCountRow> for TagWithCount {
    fn from(row: TagCountRow) -> Self {
        Self {
            tag: row.tag.into(),
            posts_count: row.posts_count,
        }
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn create_tag(&self, input: NewTag) -> Result<Tag, DomainError> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            r#"
            INSERT INTO tags AS t (name, slug, description, color)
            VALUES ($1, $2, $3, $4)
            RETURNING {TAG_COLUMNS}
            "#
        ))
        .bind(input.name)
        .bind(input.slug)
        .bind(input.description)
        .bind(input.color)
        .fetch_one(&self.pool)
        .await
        .map_err(map_tag_db_error)?;

        Ok(row.into())
    }

    async fn get_tag(&self, id: i64) -> Result<Option<Tag>, DomainError> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags t WHERE t.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_tag_db_error)?;

        Ok(row.map(Tag::from))
    }

    async fn get_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags t WHERE t.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_tag_db_error)?;

        Ok(row.map(Tag::from))
    }

    async fn name_taken(&self, name: &str, exclude_id: Option<i64>) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM tags
                WHERE LOWER(name) = LOWER($1) AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_tag_db_error)
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM tags
                WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_tag_db_error)
    }

    async fn update_tag(&self, id: i64, patch: TagPatch) -> Result<Option<Tag>, DomainError> {
        let row = sqlx::query_as::<_, TagRow>(&format!(
            r#"
            UPDATE tags AS t
            SET name = $2,
                slug = $3,
                description = $4,
                color = $5,
                updated_at = NOW()
            WHERE t.id = $1
            RETURNING {TAG_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.slug)
        .bind(patch.description)
        .bind(patch.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_tag_db_error)?;

        Ok(row.map(Tag::from))
    }

    async fn delete_tag(&self, id: i64) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_tag_db_error)?;

        sqlx::query("DELETE FROM post_tags WHERE tag_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_tag_db_error)?;
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_tag_db_error)?;

        tx.commit().await.map_err(map_tag_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tags(&self, page: PageRequest) -> Result<Vec<TagWithCount>, DomainError> {
        let rows = sqlx::query_as::<_, TagCountRow>(&format!(
            r#"
            SELECT {TAG_COLUMNS}, COUNT(p.id) AS posts_count
            FROM tags t
            LEFT JOIN post_tags pt ON pt.tag_id = t.id
            LEFT JOIN posts p ON p.id = pt.post_id AND p.status = 'published'
            GROUP BY t.id
            ORDER BY t.name ASC
            LIMIT $1
            OFFSET $2
            "#
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_tag_db_error)?;

        Ok(rows.into_iter().map(TagWithCount::from).collect())
    }

    async fn count_tags(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tags")
            .fetch_one(&self.pool)
            .await
            .map_err(map_tag_db_error)
    }

    async fn all_tags(&self) -> Result<Vec<Tag>, DomainError> {
        let rows = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags t ORDER BY t.name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_tag_db_error)?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn popular_tags(&self, limit: i64) -> Result<Vec<TagWithCount>, DomainError> {
        let rows = sqlx::query_as::<_, TagCountRow>(&format!(
            r#"
            SELECT {TAG_COLUMNS}, COUNT(p.id) AS posts_count
            FROM tags t
            JOIN post_tags pt ON pt.tag_id = t.id
            JOIN posts p ON p.id = pt.post_id AND p.status = 'published'
            GROUP BY t.id
            HAVING COUNT(p.id) > 0
            ORDER BY posts_count DESC, t.name ASC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_tag_db_error)?;

        Ok(rows.into_iter().map(TagWithCount::from).collect())
    }

    async fn published_post_count(&self, tag_id: i64) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM post_tags pt
            JOIN posts p ON p.id = pt.post_id
            WHERE pt.tag_id = $1 AND p.status = 'published'
            "#,
        )
        .bind(tag_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_tag_db_error)
    }

    async fn existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_scalar::<_, i64>("SELECT id FROM tags WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_tag_db_error)
    }

    async fn replace_post_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_tag_db_error)?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(map_tag_db_error)?;

        if !tag_ids.is_empty() {
            // ids that vanished since validation are skipped by the join
            sqlx::query(
                r#"
                INSERT INTO post_tags (post_id, tag_id)
                SELECT $1, t.id FROM tags t WHERE t.id = ANY($2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(post_id)
            .bind(tag_ids)
            .execute(&mut *tx)
            .await
            .map_err(map_tag_db_error)?;
        }

        tx.commit().await.map_err(map_tag_db_error)?;
        Ok(())
    }

    async fn tags_for_posts(&self, post_ids: &[i64]) -> Result<Vec<(i64, Tag)>, DomainError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PostTagRow>(&format!(
            r#"
            SELECT pt.post_id, {TAG_COLUMNS}
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY t.name ASC
            "#
        ))
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_tag_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.post_id, row.tag.into()))
            .collect())
    }

    async fn stats(&self) -> Result<TagStats, DomainError> {
        let row = sqlx::query_as::<_, TagStatsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM tags) AS total,
                (SELECT COUNT(DISTINCT tag_id) FROM post_tags) AS used
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_tag_db_error)?;
        let top = self.popular_tags(TOP_TAGS_IN_STATS).await?;

        Ok(TagStats {
            total: row.total,
            used: row.used,
            unused: row.total - row.used,
            top,
        })
    }
}

fn map_tag_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("tags_slug_key") => "tag slug",
            Some("tags_name_lower_key") => "tag name",
            _ => "tag",
        };
        return DomainError::AlreadyExists(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
