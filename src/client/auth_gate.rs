//! Admin shell guard and login page
//!
//! The gate starts in `Checking` and settles once per mount. Nothing behind
//! it may render until it reaches `Authenticated`.

use super::api::ApiClient;
use super::navigator::{ADMIN_HOME, LOGIN_PATH};
use super::ClientError;
use crate::models::AdminProfile;

/// Client-side minimum password length at registration
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Checking,
    Authenticated(AdminProfile),
    Unauthenticated,
}

pub struct AuthGate {
    client: ApiClient,
    state: GateState,
}

impl AuthGate {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: GateState::Checking,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Only an authenticated gate lets the admin shell render
    pub fn can_render(&self) -> bool {
        matches!(self.state, GateState::Authenticated(_))
    }

    pub fn admin(&self) -> Option<&AdminProfile> {
        match &self.state {
            GateState::Authenticated(profile) => Some(profile),
            _ => None,
        }
    }

    /// Resolve the stored token; runs once per mount
    pub async fn mount(&mut self) -> &GateState {
        if self.state != GateState::Checking {
            return &self.state;
        }

        if !self.client.session().has_token() {
            self.reject();
            return &self.state;
        }

        match self.client.auth().me().await {
            Ok(profile) => {
                tracing::debug!("Admin session valid for {}", profile.username);
                self.state = GateState::Authenticated(profile);
            }
            Err(e) => {
                tracing::warn!("Stored token rejected: {}", e);
                self.reject();
            }
        }
        &self.state
    }

    /// Log out locally even when the server call fails
    pub async fn logout(&mut self) {
        if let Err(e) = self.client.auth().logout().await {
            tracing::warn!("Logout request failed: {}", e);
        }
        self.reject();
    }

    fn reject(&mut self) {
        self.client.session().clear();
        self.client.navigator().navigate(LOGIN_PATH);
        self.state = GateState::Unauthenticated;
    }
}

/// Login and first-admin registration
pub struct LoginPage {
    client: ApiClient,
}

impl LoginPage {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Skip the form when the stored token is still good; returns true if
    /// the admin was sent on to the dashboard
    pub async fn mount(&self) -> bool {
        if !self.client.session().has_token() {
            return false;
        }
        match self.client.auth().me().await {
            Ok(_) => {
                self.client.navigator().navigate(ADMIN_HOME);
                true
            }
            Err(_) => false,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        require_filled(username, password)?;
        let token = self.client.auth().login(username.trim(), password).await?;
        self.enter(&token.access_token);
        Ok(())
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<(), ClientError> {
        require_filled(username, password)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::Validation(format!(
                "Пароль должен содержать не менее {} символов",
                MIN_PASSWORD_LEN
            )));
        }
        let token = self.client.auth().register(username.trim(), password).await?;
        self.enter(&token.access_token);
        Ok(())
    }

    fn enter(&self, token: &str) {
        self.client.session().set_token(token);
        self.client.navigator().navigate(ADMIN_HOME);
    }
}

fn require_filled(username: &str, password: &str) -> Result<(), ClientError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(ClientError::Validation(
            "Введите имя пользователя и пароль".to_string(),
        ));
    }
    Ok(())
}
