//! Event API endpoints
//!
//! - GET /api/events - List events by date, optionally for one month
//! - GET /api/events/upcoming - Visible events from today on
//! - GET /api/events/{id}, POST, PUT, DELETE - CRUD (mutations need admin)

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::lenient_bool;
use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin, MessageResponse, Viewer};
use crate::models::{CreateEventInput, Event, EventFilter, ListParams, UpdateEventInput};
use crate::services::event::{DEFAULT_EVENTS_LIMIT, DEFAULT_UPCOMING_LIMIT};

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub include_hidden: bool,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/upcoming", get(upcoming_events))
        .route("/{id}", get(get_event).put(update_event).delete(delete_event))
}

async fn list_events(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    // A month without a year (or the reverse) is ignored
    let month = match (query.year, query.month) {
        (Some(year), Some(month)) => Some((year, month)),
        _ => None,
    };
    let filter = EventFilter {
        include_hidden: viewer.include_hidden(query.include_hidden),
        month,
    };
    let params = ListParams::new(query.skip, query.limit.unwrap_or(DEFAULT_EVENTS_LIMIT));
    Ok(Json(state.event_service.list(filter, params).await?))
}

async fn upcoming_events(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let today = chrono::Local::now().date_naive();
    let limit = query.limit.unwrap_or(DEFAULT_UPCOMING_LIMIT);
    Ok(Json(state.event_service.upcoming(today, limit).await?))
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.event_service.get(id).await?))
}

async fn create_event(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Json(body): Json<CreateEventInput>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.event_service.create(body).await?))
}

async fn update_event(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateEventInput>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.event_service.update(id, body).await?))
}

async fn delete_event(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.event_service.delete(id).await?;
    Ok(MessageResponse::new("Event deleted successfully"))
}
