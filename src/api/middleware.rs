//! API middleware and shared handler plumbing
//!
//! Contains:
//! - Application state shared by all handlers
//! - The JSON error envelope and its status mapping
//! - Bearer-token authentication extractors

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{Config, UploadConfig};
use crate::db::repositories::{
    SqlxAdminRepository, SqlxContactRepository, SqlxDocumentRepository, SqlxEventRepository,
    SqlxLeadershipRepository, SqlxNewsRepository, SqlxSessionRepository, SqlxTeamRepository,
};
use crate::db::DynDatabasePool;
use crate::models::Admin;
use crate::services::{
    AuthError, AuthService, ContactService, DocumentService, EmailService, EventService,
    LeadershipService, LoginRateLimiter, NewsService, ServiceError, TeamService,
};
use crate::site::SiteRenderer;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub auth_service: Arc<AuthService>,
    pub news_service: Arc<NewsService>,
    pub event_service: Arc<EventService>,
    pub document_service: Arc<DocumentService>,
    pub team_service: Arc<TeamService>,
    pub leadership_service: Arc<LeadershipService>,
    pub contact_service: Arc<ContactService>,
    pub rate_limiter: Arc<LoginRateLimiter>,
    pub upload_config: Arc<UploadConfig>,
    pub site: Arc<SiteRenderer>,
}

impl AppState {
    /// Wire repositories and services over one pool
    pub fn new(pool: DynDatabasePool, config: &Config) -> anyhow::Result<Self> {
        let auth_service = AuthService::with_session_days(
            SqlxAdminRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            config.auth.session_days,
        );
        let document_service = DocumentService::new(
            SqlxDocumentRepository::boxed(pool.clone()),
            config.upload.path.clone(),
            config.upload.max_file_size,
        );
        let contact_service = ContactService::new(
            SqlxContactRepository::boxed(pool.clone()),
            Arc::new(EmailService::new(config.smtp.clone())),
        );

        Ok(Self {
            auth_service: Arc::new(auth_service),
            news_service: Arc::new(NewsService::new(SqlxNewsRepository::boxed(pool.clone()))),
            event_service: Arc::new(EventService::new(SqlxEventRepository::boxed(pool.clone()))),
            document_service: Arc::new(document_service),
            team_service: Arc::new(TeamService::new(SqlxTeamRepository::boxed(pool.clone()))),
            leadership_service: Arc::new(LeadershipService::new(
                SqlxLeadershipRepository::boxed(pool.clone()),
            )),
            contact_service: Arc::new(contact_service),
            rate_limiter: Arc::new(LoginRateLimiter::new()),
            upload_config: Arc::new(config.upload.clone()),
            site: Arc::new(SiteRenderer::new()?),
            pool,
        })
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn rate_limited(message: impl Into<String>, retry_after_secs: i64) -> Self {
        Self::with_details(
            "RATE_LIMIT",
            message,
            serde_json::json!({ "retry_after": retry_after_secs }),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            "RATE_LIMIT" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            ServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ServiceError::InternalError(e) => {
                tracing::error!("Internal error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
            AuthError::RegistrationClosed => ApiError::forbidden(err.to_string()),
            AuthError::UsernameTaken => ApiError::validation_error(err.to_string()),
            AuthError::ValidationError(msg) => ApiError::validation_error(msg),
            AuthError::InternalError(e) => {
                tracing::error!("Auth error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

/// `{"message": ...}` body returned by delete and mark-read endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Extract the bearer token from the Authorization header
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

/// Admin resolved from a valid bearer token; rejects with 401 otherwise
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    pub admin: Admin,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthenticatedAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;

        let admin = state
            .auth_service
            .validate_session(&token)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;

        Ok(Self { admin, token })
    }
}

/// The caller on public read endpoints: an admin when a valid token is sent
///
/// No token means an anonymous visitor. A token that is sent but unknown or
/// expired is rejected with 401, so a stale admin session is never served
/// the public view silently.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<Admin>);

impl Viewer {
    /// Hidden rows are listed only when asked for by an admin
    pub fn include_hidden(&self, requested: bool) -> bool {
        requested && self.0.is_some()
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_bearer_token(&parts.headers) else {
            return Ok(Viewer(None));
        };
        let admin = state
            .auth_service
            .validate_session(&token)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;
        Ok(Viewer(Some(admin)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer abc-123")),
            Some("abc-123".to_string())
        );
    }

    #[test]
    fn test_extract_bearer_token_rejects_other_schemes() {
        assert!(extract_bearer_token(&headers_with("Basic abc")).is_none());
        assert!(extract_bearer_token(&headers_with("Bearer ")).is_none());
        assert!(extract_bearer_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::validation_error("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::new("CONFLICT", "x").status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::rate_limited("x", 60).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::internal_error("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_error_conversion() {
        let err: ApiError = ServiceError::NotFound("News").into();
        assert_eq!(err.error.code, "NOT_FOUND");
        assert_eq!(err.error.message, "News not found");

        let err: ApiError = ServiceError::InternalError(anyhow::anyhow!("db down")).into();
        assert_eq!(err.error.message, "Internal server error");
    }

    #[test]
    fn test_auth_error_conversion() {
        let err: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.error.message, "Incorrect username or password");

        let err: ApiError = AuthError::RegistrationClosed.into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err: ApiError = AuthError::UsernameTaken.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error.message, "Username already registered");
    }

    #[test]
    fn test_viewer_include_hidden() {
        assert!(!Viewer(None).include_hidden(true));
        let admin = Admin {
            id: 1,
            username: "admin".to_string(),
            password_hash: String::new(),
            created_at: chrono::Utc::now(),
        };
        assert!(Viewer(Some(admin.clone())).include_hidden(true));
        assert!(!Viewer(Some(admin)).include_hidden(false));
    }
}
