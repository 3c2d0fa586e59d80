//! Leadership API endpoints
//!
//! - GET /api/leadership - Members ordered by `order`
//! - GET /api/leadership/{id}, POST, PUT, DELETE - CRUD (mutations need admin)

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::api::common::VisibilityQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin, MessageResponse, Viewer};
use crate::models::{CreateLeadershipInput, LeadershipMember, UpdateLeadershipInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_leadership).post(create_member))
        .route("/{id}", get(get_member).put(update_member).delete(delete_member))
}

async fn list_leadership(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Vec<LeadershipMember>>, ApiError> {
    let members = state
        .leadership_service
        .list(viewer.include_hidden(query.include_hidden))
        .await?;
    Ok(Json(members))
}

async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LeadershipMember>, ApiError> {
    Ok(Json(state.leadership_service.get(id).await?))
}

async fn create_member(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Json(body): Json<CreateLeadershipInput>,
) -> Result<Json<LeadershipMember>, ApiError> {
    Ok(Json(state.leadership_service.create(body).await?))
}

async fn update_member(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateLeadershipInput>,
) -> Result<Json<LeadershipMember>, ApiError> {
    Ok(Json(state.leadership_service.update(id, body).await?))
}

async fn delete_member(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.leadership_service.delete(id).await?;
    Ok(MessageResponse::new("Leadership member deleted successfully"))
}
