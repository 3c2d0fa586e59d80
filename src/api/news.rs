//! News API endpoints
//!
//! - GET /api/news - List news, newest first
//! - GET /api/news/{id} - Get one post
//! - POST /api/news - Create (admin)
//! - PUT /api/news/{id} - Partial update (admin)
//! - DELETE /api/news/{id} - Delete (admin)

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::api::common::ListQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin, MessageResponse, Viewer};
use crate::models::{CreateNewsInput, NewsItem, UpdateNewsInput};
use crate::services::news::DEFAULT_NEWS_LIMIT;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_news).post(create_news))
        .route("/{id}", get(get_news).put(update_news).delete(delete_news))
}

async fn list_news(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<NewsItem>>, ApiError> {
    let news = state
        .news_service
        .list(
            query.params(DEFAULT_NEWS_LIMIT),
            viewer.include_hidden(query.include_hidden),
        )
        .await?;
    Ok(Json(news))
}

async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsItem>, ApiError> {
    Ok(Json(state.news_service.get(id).await?))
}

async fn create_news(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Json(body): Json<CreateNewsInput>,
) -> Result<Json<NewsItem>, ApiError> {
    Ok(Json(state.news_service.create(body).await?))
}

async fn update_news(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateNewsInput>,
) -> Result<Json<NewsItem>, ApiError> {
    Ok(Json(state.news_service.update(id, body).await?))
}

async fn delete_news(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.news_service.delete(id).await?;
    Ok(MessageResponse::new("News deleted successfully"))
}
