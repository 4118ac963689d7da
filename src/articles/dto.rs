use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::articles::repo::ArticleWithAuthorRow;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
}

/// Normalized paging parameters: page >= 1, limit > 0, defaults 1/10.
/// Non-numeric input falls back to the defaults rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let limit = limit
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(10);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        // Saturates so absurd page/limit values cannot overflow into a
        // negative OFFSET.
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: String,
    pub category: String,
    pub read_time: String,
    pub image_url: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_trending: bool,
}

impl CreateArticleRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("title", &self.title),
            ("category", &self.category),
            ("readTime", &self.read_time),
            ("imageUrl", &self.image_url),
            ("content", &self.content),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::Validation(format!("{field} is required")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub read_time: Option<String>,
    pub image_url: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_trending: Option<bool>,
}

impl UpdateArticleRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("title", &self.title),
            ("category", &self.category),
            ("readTime", &self.read_time),
            ("imageUrl", &self.image_url),
            ("content", &self.content),
        ] {
            if let Some(v) = value {
                if v.trim().is_empty() {
                    return Err(ApiError::Validation(format!("{field} must not be empty")));
                }
            }
        }
        Ok(())
    }
}

/// Author summary embedded in the article projection.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    pub name: String,
    pub title: Option<String>,
    pub avatar: Option<String>,
}

/// Article joined with its author summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleWithAuthor {
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
    pub author: Option<AuthorSummary>,
}

impl From<ArticleWithAuthorRow> for ArticleWithAuthor {
    fn from(r: ArticleWithAuthorRow) -> Self {
        let author = r.author_name.map(|name| AuthorSummary {
            name,
            title: r.author_title,
            avatar: r.author_avatar,
        });
        Self {
            id: r.id,
            title: r.title,
            category: r.category,
            published_at: r.published_at,
            read_time: r.read_time,
            image_url: r.image_url,
            is_trending: r.is_trending,
            tags: r.tags,
            content: r.content,
            author_id: r.author_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
            author,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct ArticleListData {
    pub articles: Vec<ArticleWithAuthor>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedStatus {
    pub is_saved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_when_absent() {
        let p = Pagination::from_query(None, None);
        assert_eq!(p, Pagination { page: 1, limit: 10 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn pagination_defaults_on_non_numeric_input() {
        let p = Pagination::from_query(Some("abc"), Some("-"));
        assert_eq!(p, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn pagination_rejects_out_of_range_values() {
        let p = Pagination::from_query(Some("0"), Some("-5"));
        assert_eq!(p, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn pagination_offset_saturates_on_huge_page() {
        let p = Pagination::from_query(Some("9223372036854775807"), Some("10"));
        assert_eq!(p.page, i64::MAX);
        let offset = p.offset();
        assert!(offset >= 0);
        assert_eq!(offset, i64::MAX);
    }

    #[test]
    fn pagination_offset_math() {
        let p = Pagination::from_query(Some("3"), Some("25"));
        assert_eq!(p.page, 3);
        assert_eq!(p.limit, 25);
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn create_request_defaults_tags_and_trending() {
        let req: CreateArticleRequest = serde_json::from_str(
            r#"{"title":"A","category":"tech","readTime":"3 min","imageUrl":"http://x","content":"body"}"#,
        )
        .unwrap();
        assert!(req.tags.is_empty());
        assert!(!req.is_trending);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_blank_required_field() {
        let req: CreateArticleRequest = serde_json::from_str(
            r#"{"title":"  ","category":"tech","readTime":"3 min","imageUrl":"http://x","content":"body"}"#,
        )
        .unwrap();
        let err = req.validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("title")));
    }

    #[test]
    fn update_request_accepts_partial_camel_case_body() {
        let req: UpdateArticleRequest =
            serde_json::from_str(r#"{"isTrending":true,"readTime":"5 min"}"#).unwrap();
        assert_eq!(req.is_trending, Some(true));
        assert_eq!(req.read_time.as_deref(), Some("5 min"));
        assert!(req.title.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn article_with_author_serializes_camel_case() {
        let now = OffsetDateTime::now_utc();
        let article = ArticleWithAuthor {
            id: Uuid::new_v4(),
            title: "A".into(),
            category: "tech".into(),
            published_at: "5 Agu 2025".into(),
            read_time: "3 min".into(),
            image_url: "http://x".into(),
            is_trending: false,
            tags: vec!["rust".into()],
            content: "body".into(),
            author_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            author: Some(AuthorSummary {
                name: "N".into(),
                title: Some("T".into()),
                avatar: Some("img".into()),
            }),
        };
        let json = serde_json::to_value(&article).unwrap();
        assert!(json.get("publishedAt").is_some());
        assert!(json.get("readTime").is_some());
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("isTrending").is_some());
        assert!(json.get("authorId").is_some());
        assert_eq!(json["author"]["name"], "N");
    }
}
