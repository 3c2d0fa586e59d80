//! Admin authentication service
//!
//! - Registration, allowed only while no admin account exists
//! - Login/logout with bearer-token sessions
//! - Session validation, dropping expired sessions on sight

use crate::db::repositories::{AdminRepository, SessionRepository};
use crate::models::{Admin, Session};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default session lifetime in days
const DEFAULT_SESSION_DAYS: i64 = 7;

/// Minimum length of a newly registered password
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Error types for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Invalid username or password
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Registration is closed once an admin exists
    #[error("Admin already exists. Contact existing admin.")]
    RegistrationClosed,

    #[error("Username already registered")]
    UsernameTaken,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Login and registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Admin authentication service
pub struct AuthService {
    admin_repo: Arc<dyn AdminRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_days: i64,
}

impl AuthService {
    pub fn new(
        admin_repo: Arc<dyn AdminRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self::with_session_days(admin_repo, session_repo, DEFAULT_SESSION_DAYS)
    }

    pub fn with_session_days(
        admin_repo: Arc<dyn AdminRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_days: i64,
    ) -> Self {
        Self {
            admin_repo,
            session_repo,
            session_days,
        }
    }

    /// Create the first admin account and log it in
    pub async fn register(&self, input: Credentials) -> Result<Session, AuthError> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(AuthError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if input.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        if self
            .admin_repo
            .get_by_username(username)
            .await
            .context("Failed to look up admin")?
            .is_some()
        {
            return Err(AuthError::UsernameTaken);
        }

        if self.admin_repo.count().await.context("Failed to count admins")? > 0 {
            return Err(AuthError::RegistrationClosed);
        }

        let hash = hash_password(&input.password)?;
        let admin = self
            .admin_repo
            .create(username, &hash)
            .await
            .context("Failed to create admin")?;

        tracing::info!("Registered admin account '{}'", admin.username);
        self.create_session(admin.id).await
    }

    /// Verify credentials and issue a session
    pub async fn login(&self, input: Credentials) -> Result<Session, AuthError> {
        let admin = self
            .admin_repo
            .get_by_username(input.username.trim())
            .await
            .context("Failed to look up admin")?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = verify_password(&input.password, &admin.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.create_session(admin.id).await
    }

    /// Invalidate a session token
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a bearer token to its admin
    ///
    /// Returns `None` for unknown or expired tokens.
    pub async fn validate_session(&self, token: &str) -> Result<Option<Admin>, AuthError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to delete expired session: {:#}", e);
            }
            return Ok(None);
        }

        let admin = self
            .admin_repo
            .get_by_id(session.admin_id)
            .await
            .context("Failed to get admin")?;
        Ok(admin)
    }

    /// Delete expired sessions
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AuthError> {
        let removed = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to clean up sessions")?;
        Ok(removed)
    }

    async fn create_session(&self, admin_id: i64) -> Result<Session, AuthError> {
        let session = Session::issue(admin_id, self.session_days);
        let session = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxAdminRepository, SqlxSessionRepository};
    use crate::db::{create_test_pool, migrations};
    use chrono::{Duration, Utc};

    async fn setup() -> (AuthService, Arc<dyn SessionRepository>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        let sessions = SqlxSessionRepository::boxed(pool.clone());
        let service = AuthService::new(SqlxAdminRepository::boxed(pool), sessions.clone());
        (service, sessions)
    }

    #[tokio::test]
    async fn test_first_registration_then_closed() {
        let (service, _) = setup().await;

        let session = service
            .register(Credentials::new("admin", "secret1"))
            .await
            .unwrap();
        let admin = service.validate_session(&session.id).await.unwrap().unwrap();
        assert_eq!(admin.username, "admin");

        let err = service
            .register(Credentials::new("second", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RegistrationClosed));

        let err = service
            .register(Credentials::new("admin", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_register_requires_six_character_password() {
        let (service, _) = setup().await;
        let err = service
            .register(Credentials::new("admin", "12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let (service, _) = setup().await;
        service
            .register(Credentials::new("admin", "secret1"))
            .await
            .unwrap();

        let err = service
            .login(Credentials::new("admin", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = service
            .login(Credentials::new("ghost", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let session = service
            .login(Credentials::new("admin", "secret1"))
            .await
            .unwrap();
        assert!(service.validate_session(&session.id).await.unwrap().is_some());

        service.logout(&session.id).await.unwrap();
        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_removed() {
        let (service, sessions) = setup().await;
        let live = service
            .register(Credentials::new("admin", "secret1"))
            .await
            .unwrap();

        let mut stale = Session::issue(live.admin_id, 7);
        stale.expires_at = Utc::now() - Duration::minutes(1);
        sessions.create(&stale).await.unwrap();

        assert!(service.validate_session(&stale.id).await.unwrap().is_none());
        assert!(sessions.get_by_id(&stale.id).await.unwrap().is_none());
        assert!(service.validate_session("unknown").await.unwrap().is_none());
    }
}
