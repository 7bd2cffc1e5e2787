use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::escape_like;
use crate::data::post_repository::{NewPost, PostFilter, PostOrder, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::PageRequest;
use crate::domain::post::{Post, PostStatus};
use crate::domain::stats::PostStats;

const POST_COLUMNS: &str = "p.id, p.author_id, p.title, p.slug, p.content, p.excerpt, \
     p.featured_image, p.status, p.view_count, p.published_at, p.created_at, p.updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    author_id: i64,
    title: String,
    slug: String,
    content: String,
    excerpt: String,
    featured_image: Option<String>,
    status: String,
    view_count: i64,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostStatsRow {
    total: i64,
    drafts: i64,
    published: i64,
    archived: i64,
    total_views: i64,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO posts AS p
                (author_id, title, slug, content, excerpt, featured_image, status, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(input.author_id)
        .bind(input.title)
        .bind(input.slug)
        .bind(input.content)
        .bind(input.excerpt)
        .bind(input.featured_image)
        .bind(input.status.as_str())
        .bind(input.published_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM posts
                WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE posts AS p
            SET title = $2,
                slug = $3,
                content = $4,
                excerpt = $5,
                featured_image = $6,
                status = $7,
                published_at = $8,
                updated_at = NOW()
            WHERE p.id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.slug)
        .bind(patch.content)
        .bind(patch.excerpt)
        .bind(patch.featured_image)
        .bind(patch.status.as_str())
        .bind(patch.published_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Vec<Post>, DomainError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {POST_COLUMNS} FROM posts p"));
        push_filter(&mut builder, filter);
        builder.push(match filter.order {
            PostOrder::CreatedDesc => " ORDER BY p.created_at DESC, p.id DESC",
            PostOrder::PublishedDesc => " ORDER BY p.published_at DESC NULLS LAST, p.id DESC",
        });
        builder.push(" LIMIT ").push_bind(page.limit());
        builder.push(" OFFSET ").push_bind(page.offset());

        let rows = builder
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_posts(&self, filter: &PostFilter) -> Result<i64, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        push_filter(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn increment_view_count(&self, id: i64) -> Result<(), DomainError> {
        sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_post_db_error)?;
        Ok(())
    }

    async fn stats(&self) -> Result<PostStats, DomainError> {
        let row = sqlx::query_as::<_, PostStatsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'draft') AS drafts,
                COUNT(*) FILTER (WHERE status = 'published') AS published,
                COUNT(*) FILTER (WHERE status = 'archived') AS archived,
                COALESCE(SUM(view_count), 0)::BIGINT AS total_views
            FROM posts
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(PostStats {
            total: row.total,
            drafts: row.drafts,
            published: row.published,
            archived: row.archived,
            total_views: row.total_views,
        })
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    builder.push(" WHERE TRUE");

    if filter.live_only {
        builder.push(" AND p.status = 'published' AND p.published_at <= NOW()");
    } else if let Some(status) = filter.status {
        builder.push(" AND p.status = ").push_bind(status.as_str());
    }
    if let Some(author_id) = filter.author_id {
        builder.push(" AND p.author_id = ").push_bind(author_id);
    }
    if let Some(tag_id) = filter.tag_id {
        builder
            .push(" AND EXISTS (SELECT 1 FROM post_tags pt WHERE pt.post_id = p.id AND pt.tag_id = ")
            .push_bind(tag_id)
            .push(")");
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.content ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.excerpt ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let status = row
        .status
        .parse::<PostStatus>()
        .map_err(|_| DomainError::Unexpected(format!("unknown post status: {}", row.status)))?;

    Ok(Post {
        id: row.id,
        author_id: row.author_id,
        title: row.title,
        slug: row.slug,
        content: row.content,
        excerpt: row.excerpt,
        featured_image: row.featured_image,
        status,
        view_count: row.view_count,
        published_at: row.published_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") if db_err.constraint() == Some("posts_slug_key") => {
                return DomainError::AlreadyExists("post slug".to_string());
            }
            Some("23503") => return DomainError::NotFound("author".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
