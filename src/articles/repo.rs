use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::articles::dto::UpdateArticleRequest;

/// Article row as stored.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub published_at: String,
    pub read_time: String,
    pub image_url: String,
    pub is_trending: bool,
    pub tags: Vec<String>,
    pub content: String,
    pub author_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Flat row for the article + author projection. Author columns are nullable
/// because of the LEFT JOIN.
#[derive(Debug, Clone, FromRow)]
pub struct ArticleWithAuthorRow {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub published_at: String,
    pub read_time: String,
    pub image_url: String,
    pub is_trending: bool,
    pub tags: Vec<String>,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub author_name: Option<String>,
    pub author_title: Option<String>,
    pub author_avatar: Option<String>,
}

/// Insert payload. Id and published_at are stamped by the service.
#[derive(Debug)]
pub struct NewArticle {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub published_at: String,
    pub read_time: String,
    pub image_url: String,
    pub is_trending: bool,
    pub tags: Vec<String>,
    pub content: String,
    pub author_id: Uuid,
}

const WITH_AUTHOR: &str = r#"
    SELECT a.id, a.title, a.category, a.published_at, a.read_time, a.image_url,
           a.is_trending, a.tags, a.content, a.author_id, a.created_at, a.updated_at,
           u.name AS author_name, u.title AS author_title, u.avatar AS author_avatar
    FROM articles a
    LEFT JOIN users u ON u.id = a.author_id
"#;

pub async fn list(
    db: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ArticleWithAuthorRow>, sqlx::Error> {
    sqlx::query_as::<_, ArticleWithAuthorRow>(&format!(
        "{WITH_AUTHOR} ORDER BY a.created_at DESC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn count_all(db: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
        .fetch_one(db)
        .await
}

pub async fn list_by_category(
    db: &PgPool,
    category: &str,
) -> Result<Vec<ArticleWithAuthorRow>, sqlx::Error> {
    sqlx::query_as::<_, ArticleWithAuthorRow>(&format!(
        "{WITH_AUTHOR} WHERE a.category = $1 ORDER BY a.created_at DESC"
    ))
    .bind(category)
    .fetch_all(db)
    .await
}

pub async fn find_by_id(
    db: &PgPool,
    id: Uuid,
) -> Result<Option<ArticleWithAuthorRow>, sqlx::Error> {
    sqlx::query_as::<_, ArticleWithAuthorRow>(&format!("{WITH_AUTHOR} WHERE a.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_trending(db: &PgPool) -> Result<Vec<ArticleWithAuthorRow>, sqlx::Error> {
    sqlx::query_as::<_, ArticleWithAuthorRow>(&format!(
        "{WITH_AUTHOR} WHERE a.is_trending = TRUE ORDER BY a.created_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn list_by_author(
    db: &PgPool,
    author_id: Uuid,
) -> Result<Vec<ArticleWithAuthorRow>, sqlx::Error> {
    sqlx::query_as::<_, ArticleWithAuthorRow>(&format!(
        "{WITH_AUTHOR} WHERE a.author_id = $1 ORDER BY a.created_at DESC"
    ))
    .bind(author_id)
    .fetch_all(db)
    .await
}

pub async fn list_saved(
    db: &PgPool,
    user_id: Uuid,
) -> Result<Vec<ArticleWithAuthorRow>, sqlx::Error> {
    sqlx::query_as::<_, ArticleWithAuthorRow>(
        r#"
        SELECT a.id, a.title, a.category, a.published_at, a.read_time, a.image_url,
               a.is_trending, a.tags, a.content, a.author_id, a.created_at, a.updated_at,
               u.name AS author_name, u.title AS author_title, u.avatar AS author_avatar
        FROM saved_articles s
        INNER JOIN articles a ON a.id = s.article_id
        LEFT JOIN users u ON u.id = a.author_id
        WHERE s.user_id = $1
        ORDER BY s.saved_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn insert(db: &PgPool, article: &NewArticle) -> Result<Article, sqlx::Error> {
    sqlx::query_as::<_, Article>(
        r#"
        INSERT INTO articles
            (id, title, category, published_at, read_time, image_url,
             is_trending, tags, content, author_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, title, category, published_at, read_time, image_url,
                  is_trending, tags, content, author_id, created_at, updated_at
        "#,
    )
    .bind(article.id)
    .bind(&article.title)
    .bind(&article.category)
    .bind(&article.published_at)
    .bind(&article.read_time)
    .bind(&article.image_url)
    .bind(article.is_trending)
    .bind(&article.tags)
    .bind(&article.content)
    .bind(article.author_id)
    .fetch_one(db)
    .await
}

/// Partial update. Unset fields keep their current value; updated_at is
/// always stamped.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: &UpdateArticleRequest,
) -> Result<Option<Article>, sqlx::Error> {
    sqlx::query_as::<_, Article>(
        r#"
        UPDATE articles SET
            title = COALESCE($2, title),
            category = COALESCE($3, category),
            read_time = COALESCE($4, read_time),
            image_url = COALESCE($5, image_url),
            content = COALESCE($6, content),
            tags = COALESCE($7, tags),
            is_trending = COALESCE($8, is_trending),
            updated_at = now()
        WHERE id = $1
        RETURNING id, title, category, published_at, read_time, image_url,
                  is_trending, tags, content, author_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.category)
    .bind(&changes.read_time)
    .bind(&changes.image_url)
    .bind(&changes.content)
    .bind(&changes.tags)
    .bind(changes.is_trending)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn exists(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM articles WHERE id = $1)")
        .bind(id)
        .fetch_one(db)
        .await
}

/// Idempotent: re-saving an already saved pair is a no-op.
pub async fn save(db: &PgPool, user_id: Uuid, article_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO saved_articles (user_id, article_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, article_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(article_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn unsave(db: &PgPool, user_id: Uuid, article_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM saved_articles WHERE user_id = $1 AND article_id = $2")
        .bind(user_id)
        .bind(article_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_saved(db: &PgPool, user_id: Uuid, article_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM saved_articles WHERE user_id = $1 AND article_id = $2)",
    )
    .bind(user_id)
    .bind(article_id)
    .fetch_one(db)
    .await
}
