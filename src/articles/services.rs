use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::articles::dto::{ArticleWithAuthor, CreateArticleRequest, UpdateArticleRequest};
use crate::articles::repo::{self, Article, NewArticle};
use crate::error::ApiError;

#[derive(Debug)]
pub struct ArticlePage {
    pub articles: Vec<ArticleWithAuthor>,
    pub total: i64,
    pub has_more: bool,
}

fn page_has_more(total: i64, offset: i64, limit: i64) -> bool {
    total > offset.saturating_add(limit)
}

/// Short month names for the id-ID display format.
const MONTHS_ID: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Display string stamped at creation time. Cosmetic, not a sortable key.
pub(crate) fn format_published_at(at: OffsetDateTime) -> String {
    format!(
        "{} {} {}",
        at.day(),
        MONTHS_ID[at.month() as usize - 1],
        at.year()
    )
}

pub async fn list_all(db: &PgPool, page: i64, limit: i64) -> Result<ArticlePage, ApiError> {
    let offset = (page - 1).saturating_mul(limit);
    let rows = repo::list(db, limit, offset)
        .await
        .map_err(|e| ApiError::persistence("Failed to retrieve articles", e))?;
    // Unscoped count: total ignores any filter, so it only lines up with
    // the unfiltered listing. Known inconsistency, kept deliberately.
    let total = repo::count_all(db)
        .await
        .map_err(|e| ApiError::persistence("Failed to retrieve articles", e))?;
    Ok(ArticlePage {
        articles: rows.into_iter().map(Into::into).collect(),
        total,
        has_more: page_has_more(total, offset, limit),
    })
}

/// Category filtering bypasses pagination: the full matching set is returned
/// and has_more is always false. A distinct query mode, not a pagination
/// feature.
pub async fn list_by_category(db: &PgPool, category: &str) -> Result<ArticlePage, ApiError> {
    let rows = repo::list_by_category(db, category)
        .await
        .map_err(|e| ApiError::persistence("Failed to retrieve articles", e))?;
    let total = rows.len() as i64;
    Ok(ArticlePage {
        articles: rows.into_iter().map(Into::into).collect(),
        total,
        has_more: false,
    })
}

pub async fn get_by_id(db: &PgPool, id: Uuid) -> Result<Option<ArticleWithAuthor>, ApiError> {
    let row = repo::find_by_id(db, id)
        .await
        .map_err(|e| ApiError::persistence("Failed to fetch article", e))?;
    Ok(row.map(Into::into))
}

pub async fn get_trending(db: &PgPool) -> Result<Vec<ArticleWithAuthor>, ApiError> {
    let rows = repo::list_trending(db)
        .await
        .map_err(|e| ApiError::persistence("Failed to retrieve trending articles", e))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn get_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<ArticleWithAuthor>, ApiError> {
    let rows = repo::list_by_author(db, user_id)
        .await
        .map_err(|e| ApiError::persistence("Failed to retrieve user articles", e))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn get_saved(db: &PgPool, user_id: Uuid) -> Result<Vec<ArticleWithAuthor>, ApiError> {
    let rows = repo::list_saved(db, user_id)
        .await
        .map_err(|e| ApiError::persistence("Failed to retrieve saved articles", e))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Create an article owned by `author_id`. The server stamps the id and the
/// published_at display string.
pub async fn create(
    db: &PgPool,
    author_id: Uuid,
    input: CreateArticleRequest,
) -> Result<Article, ApiError> {
    let article = NewArticle {
        id: Uuid::new_v4(),
        title: input.title,
        category: input.category,
        published_at: format_published_at(OffsetDateTime::now_utc()),
        read_time: input.read_time,
        image_url: input.image_url,
        is_trending: input.is_trending,
        tags: input.tags,
        content: input.content,
        author_id,
    };
    repo::insert(db, &article)
        .await
        .map_err(|e| ApiError::persistence("Failed to create article", e))
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: &UpdateArticleRequest,
) -> Result<Option<Article>, ApiError> {
    repo::update(db, id, changes)
        .await
        .map_err(|e| ApiError::persistence("Failed to update article", e))
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, ApiError> {
    repo::delete(db, id)
        .await
        .map_err(|e| ApiError::persistence("Failed to delete article", e))
}

/// Bookmark an article. No-op success if already saved; NotFound if the
/// article does not exist.
pub async fn save(db: &PgPool, user_id: Uuid, article_id: Uuid) -> Result<(), ApiError> {
    let exists = repo::exists(db, article_id)
        .await
        .map_err(|e| ApiError::persistence("Failed to save article", e))?;
    if !exists {
        return Err(ApiError::NotFound("Article not found".into()));
    }
    repo::save(db, user_id, article_id)
        .await
        .map_err(|e| ApiError::persistence("Failed to save article", e))
}

pub async fn unsave(db: &PgPool, user_id: Uuid, article_id: Uuid) -> Result<bool, ApiError> {
    repo::unsave(db, user_id, article_id)
        .await
        .map_err(|e| ApiError::persistence("Failed to unsave article", e))
}

pub async fn is_saved(db: &PgPool, user_id: Uuid, article_id: Uuid) -> Result<bool, ApiError> {
    repo::is_saved(db, user_id, article_id)
        .await
        .map_err(|e| ApiError::persistence("Failed to check saved status", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn published_at_uses_short_indonesian_months() {
        assert_eq!(
            format_published_at(datetime!(2025-08-05 10:30 UTC)),
            "5 Agu 2025"
        );
        assert_eq!(
            format_published_at(datetime!(2024-01-31 00:00 UTC)),
            "31 Jan 2024"
        );
        assert_eq!(
            format_published_at(datetime!(2023-12-01 23:59 UTC)),
            "1 Des 2023"
        );
    }

    #[test]
    fn has_more_is_true_only_past_the_current_window() {
        // 25 articles, page 1 of 10: more remain.
        assert!(page_has_more(25, 0, 10));
        // page 2 (offset 10): 25 > 20, still more.
        assert!(page_has_more(25, 10, 10));
        // page 3 (offset 20): 25 <= 30, last page.
        assert!(!page_has_more(25, 20, 10));
        // Exactly one full page.
        assert!(!page_has_more(10, 0, 10));
        // Saturates instead of overflowing on an absurd offset.
        assert!(!page_has_more(5, i64::MAX, 10));
    }
}
