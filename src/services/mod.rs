//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories. They own
//! validation, partial-update merging, the category tree rules, admin
//! authentication and the background jobs (Telegram import, notifications).

pub mod auth;
pub mod contact;
pub mod document;
pub mod email;
pub mod event;
pub mod info;
pub mod leadership;
pub mod news;
pub mod password;
pub mod rate_limiter;
pub mod seed;
pub mod team;
pub mod telegram;

pub use auth::{AuthError, AuthService, Credentials};
pub use contact::ContactService;
pub use document::{DocumentService, StoredUpload};
pub use email::{ContactNotifier, EmailService};
pub use event::EventService;
pub use info::federation_info;
pub use leadership::LeadershipService;
pub use news::NewsService;
pub use password::{hash_password, verify_password};
pub use rate_limiter::LoginRateLimiter;
pub use seed::seed_initial_data;
pub use team::TeamService;
pub use telegram::{TelegramPost, TelegramSync};

/// Error type shared by the content services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Entity not found
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Invalid input or a rule violation the caller can fix
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Reject blank required text fields
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(())
}

/// Apply a nullable partial-update field
pub(crate) fn merge_nullable<T>(target: &mut Option<T>, update: Option<Option<T>>) {
    if let Some(value) = update {
        *target = value;
    }
}

/// Apply a plain partial-update field
pub(crate) fn merge<T>(target: &mut T, update: Option<T>) {
    if let Some(value) = update {
        *target = value;
    }
}
