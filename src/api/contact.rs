//! Contact form API endpoints
//!
//! - POST /api/contact - Public submission
//! - GET /api/contact - Inbox, newest first (admin)
//! - PUT /api/contact/{id}/read - Mark read (admin)
//! - DELETE /api/contact/{id} - Delete (admin)

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::lenient_bool;
use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin, MessageResponse};
use crate::models::{ContactMessage, CreateContactInput, ListParams};

/// Default page size of the inbox
const DEFAULT_INBOX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub unread_only: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_messages).post(submit_message))
        .route("/{id}/read", put(mark_read))
        .route("/{id}", delete(delete_message))
}

async fn submit_message(
    State(state): State<AppState>,
    Json(body): Json<CreateContactInput>,
) -> Result<Json<ContactMessage>, ApiError> {
    Ok(Json(state.contact_service.submit(body).await?))
}

async fn list_messages(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Query(query): Query<InboxQuery>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    let params = ListParams::new(query.skip, query.limit.unwrap_or(DEFAULT_INBOX_LIMIT));
    Ok(Json(state.contact_service.list(params, query.unread_only).await?))
}

async fn mark_read(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.contact_service.mark_read(id).await?;
    Ok(MessageResponse::new("Message marked as read"))
}

async fn delete_message(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.contact_service.delete(id).await?;
    Ok(MessageResponse::new("Message deleted successfully"))
}
