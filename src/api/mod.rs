//! API layer - HTTP handlers and routing
//!
//! All JSON endpoints live under `/api`:
//! - Auth (login, first-admin registration, current admin, logout)
//! - News, events, team and leadership CRUD
//! - Document categories (tree) and document upload/download
//! - Contact form and inbox
//! - Federation info and health
//!
//! Public HTML pages are merged in from [`crate::site`].

pub mod auth;
pub mod common;
pub mod contact;
pub mod documents;
pub mod events;
pub mod leadership;
pub mod middleware;
pub mod news;
pub mod site;
pub mod team;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedAdmin, MessageResponse, Viewer};

/// Build the `/api` router
pub fn build_api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/news", news::router())
        .nest("/events", events::router())
        .nest(
            "/documents",
            documents::router(state.upload_config.body_limit()),
        )
        .nest("/team", team::router())
        .nest("/leadership", leadership::router())
        .nest("/contact", contact::router())
        .merge(site::router())
}

/// Build the complete application router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = cors_layer(cors_origin);

    Router::new()
        .nest("/api", build_api_router(&state))
        .merge(crate::site::router())
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin for `*`, otherwise exactly the configured one
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origin == "*" {
        return layer.allow_origin(tower_http::cors::Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any origin", origin);
            layer.allow_origin(tower_http::cors::Any)
        }
    }
}
