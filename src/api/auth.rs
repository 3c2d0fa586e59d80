//! Authentication API endpoints
//!
//! - POST /api/auth/login - Log in, returns a bearer token
//! - POST /api/auth/register - Create the first admin account
//! - GET /api/auth/me - Current admin
//! - POST /api/auth/logout - Invalidate the current token

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin, MessageResponse};
use crate::models::{AdminProfile, Session};
use crate::services::{AuthError, Credentials};

/// Token response for login and registration
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl From<Session> for TokenResponse {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.id,
            token_type: "bearer".to_string(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me))
        .route("/logout", post(logout))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    if let Some(ip) = extract_ip_address(&headers) {
        if state.rate_limiter.is_ip_limited(ip).await {
            tracing::warn!("Login rate limit hit for {}", ip);
            return Err(ApiError::rate_limited("Too many requests, try again later", 60));
        }
        state.rate_limiter.record_ip_request(ip).await;
    }

    let username = body.username.trim().to_string();
    if state.rate_limiter.is_username_limited(&username).await {
        tracing::warn!("Too many failed logins for '{}'", username);
        return Err(ApiError::rate_limited(
            "Too many failed attempts, try again in 15 minutes",
            900,
        ));
    }

    match state.auth_service.login(body).await {
        Ok(session) => {
            state.rate_limiter.clear_username_attempts(&username).await;
            tracing::info!("Admin '{}' logged in", username);
            Ok(Json(session.into()))
        }
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials) {
                state.rate_limiter.record_failed_attempt(&username).await;
            }
            Err(e.into())
        }
    }
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = state.auth_service.register(body).await?;
    Ok(Json(session.into()))
}

/// GET /api/auth/me
async fn me(auth: AuthenticatedAdmin) -> Json<AdminProfile> {
    Json(AdminProfile::from(&auth.admin))
}

/// POST /api/auth/logout
async fn logout(
    State(state): State<AppState>,
    auth: AuthenticatedAdmin,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.logout(&auth.token).await?;
    Ok(MessageResponse::new("Logged out"))
}

/// Client IP as reported by a fronting proxy
fn extract_ip_address(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|h| h.to_str().ok()))
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(extract_ip_address(&headers), Some("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.5"));
        assert_eq!(extract_ip_address(&headers), Some("192.168.1.5".parse().unwrap()));
        assert_eq!(extract_ip_address(&HeaderMap::new()), None);
    }
}
