use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::articles::dto::{
    ArticleListData, ArticleWithAuthor, CreateArticleRequest, ListQuery, Pagination,
    PaginationMeta, SavedStatus, UpdateArticleRequest,
};
use crate::articles::repo::Article;
use crate::articles::services;
use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::response::Envelope;
use crate::state::AppState;

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/news", get(list_articles).post(create_article))
        .route("/news/trending", get(trending_articles))
        .route("/news/saved", get(saved_articles))
        .route("/news/me", get(my_articles))
        .route(
            "/news/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/news/:id/save", post(save_article).delete(unsave_article))
        .route("/news/:id/saved", get(is_article_saved))
}

/// Ownership gate for mutating operations: only the author may proceed.
fn ensure_owner(author_id: Uuid, caller: Uuid, action: &str) -> Result<(), ApiError> {
    if author_id != caller {
        return Err(ApiError::Authorization(format!(
            "You are not authorized to {action} this article"
        )));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<ArticleListData>>, ApiError> {
    let paging = Pagination::from_query(query.page.as_deref(), query.limit.as_deref());

    let page = match query.category.as_deref().filter(|c| !c.is_empty()) {
        Some(category) => services::list_by_category(&state.db, category).await?,
        None => services::list_all(&state.db, paging.page, paging.limit).await?,
    };

    Ok(Json(Envelope::ok(
        "Articles retrieved successfully",
        ArticleListData {
            articles: page.articles,
            pagination: PaginationMeta {
                page: paging.page,
                limit: paging.limit,
                total: page.total,
                has_more: page.has_more,
            },
        },
    )))
}

#[instrument(skip(state))]
pub async fn trending_articles(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<ArticleWithAuthor>>>, ApiError> {
    let articles = services::get_trending(&state.db).await?;
    Ok(Json(Envelope::ok(
        "Trending articles retrieved successfully",
        articles,
    )))
}

#[instrument(skip(state))]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ArticleWithAuthor>>, ApiError> {
    let article = services::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".into()))?;
    Ok(Json(Envelope::ok(
        "Article retrieved successfully",
        article,
    )))
}

#[instrument(skip(state, payload))]
pub async fn create_article(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<Envelope<Article>>), ApiError> {
    payload.validate()?;

    let article = services::create(&state.db, claims.sub, payload).await?;

    info!(article_id = %article.id, author_id = %claims.sub, "article created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Article created successfully", article)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_article(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateArticleRequest>,
) -> Result<Json<Envelope<Article>>, ApiError> {
    payload.validate()?;

    // Ownership is re-validated against the stored row on every request.
    let existing = services::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".into()))?;
    if let Err(err) = ensure_owner(existing.author_id, claims.sub, "update") {
        warn!(article_id = %id, author_id = %existing.author_id, caller = %claims.sub, "update denied");
        return Err(err);
    }

    let article = services::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".into()))?;

    info!(article_id = %id, author_id = %claims.sub, "article updated");
    Ok(Json(Envelope::ok("Article updated successfully", article)))
}

#[instrument(skip(state))]
pub async fn delete_article(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let existing = services::get_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Article not found".into()))?;
    if let Err(err) = ensure_owner(existing.author_id, claims.sub, "delete") {
        warn!(article_id = %id, author_id = %existing.author_id, caller = %claims.sub, "delete denied");
        return Err(err);
    }

    services::delete(&state.db, id).await?;

    info!(article_id = %id, author_id = %claims.sub, "article deleted");
    Ok(Json(Envelope::message("Article deleted successfully")))
}

#[instrument(skip(state))]
pub async fn my_articles(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Envelope<Vec<ArticleWithAuthor>>>, ApiError> {
    let articles = services::get_by_user(&state.db, claims.sub).await?;
    Ok(Json(Envelope::ok(
        "User articles retrieved successfully",
        articles,
    )))
}

#[instrument(skip(state))]
pub async fn saved_articles(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Envelope<Vec<ArticleWithAuthor>>>, ApiError> {
    let articles = services::get_saved(&state.db, claims.sub).await?;
    Ok(Json(Envelope::ok(
        "Saved articles retrieved successfully",
        articles,
    )))
}

#[instrument(skip(state))]
pub async fn save_article(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    services::save(&state.db, claims.sub, id).await?;
    info!(article_id = %id, user_id = %claims.sub, "article saved");
    Ok(Json(Envelope::message("Article saved successfully")))
}

#[instrument(skip(state))]
pub async fn unsave_article(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    // Removing a bookmark that does not exist is a no-op, mirroring save.
    services::unsave(&state.db, claims.sub, id).await?;
    info!(article_id = %id, user_id = %claims.sub, "article unsaved");
    Ok(Json(Envelope::message("Article removed from saved")))
}

#[instrument(skip(state))]
pub async fn is_article_saved(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<SavedStatus>>, ApiError> {
    let is_saved = services::is_saved(&state.db, claims.sub, id).await?;
    Ok(Json(Envelope::ok(
        "Saved status retrieved successfully",
        SavedStatus { is_saved },
    )))
}
