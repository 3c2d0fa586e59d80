//! Team roster API endpoints
//!
//! - GET /api/team - Members, filterable by `category` and `discipline`
//! - GET /api/team/{id}, POST, PUT, DELETE - CRUD (mutations need admin)

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::lenient_bool;
use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin, MessageResponse, Viewer};
use crate::models::{CreateTeamMemberInput, TeamFilter, TeamMember, UpdateTeamMemberInput};

#[derive(Debug, Deserialize)]
pub struct TeamListQuery {
    pub category: Option<String>,
    pub discipline: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub include_hidden: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_team).post(create_member))
        .route("/{id}", get(get_member).put(update_member).delete(delete_member))
}

async fn list_team(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<TeamListQuery>,
) -> Result<Json<Vec<TeamMember>>, ApiError> {
    let filter = TeamFilter {
        include_hidden: viewer.include_hidden(query.include_hidden),
        category: query.category.filter(|c| !c.is_empty()),
        discipline: query.discipline.filter(|d| !d.is_empty()),
    };
    Ok(Json(state.team_service.list(&filter).await?))
}

async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TeamMember>, ApiError> {
    Ok(Json(state.team_service.get(id).await?))
}

async fn create_member(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Json(body): Json<CreateTeamMemberInput>,
) -> Result<Json<TeamMember>, ApiError> {
    Ok(Json(state.team_service.create(body).await?))
}

async fn update_member(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTeamMemberInput>,
) -> Result<Json<TeamMember>, ApiError> {
    Ok(Json(state.team_service.update(id, body).await?))
}

async fn delete_member(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.team_service.delete(id).await?;
    Ok(MessageResponse::new("Team member deleted successfully"))
}
