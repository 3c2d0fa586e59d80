//! Public site information API
//!
//! - GET /api/info - Federation names, disciplines, history and contacts
//! - GET /api/health - Liveness plus a database ping

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::middleware::AppState;
use crate::models::FederationInfo;
use crate::services::federation_info;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/info", get(get_info))
        .route("/health", get(health))
}

async fn get_info() -> Json<&'static FederationInfo> {
    Json(federation_info())
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, label, message) = match state.pool.ping().await {
        Ok(()) => (StatusCode::OK, "healthy", "FSP Chuvashia API is running"),
        Err(e) => {
            tracing::error!("Health check failed: {:#}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "Database is unavailable")
        }
    };
    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            message: message.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
