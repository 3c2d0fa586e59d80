//! Admin routes and the shell that guards them

use std::sync::{Arc, Mutex};

use super::api::ApiClient;
use super::auth_gate::{AuthGate, LoginPage};
use super::dashboard::DashboardStats;
use super::navigator::{MemoryNavigator, Navigator, LOGIN_PATH};
use super::scope::{RequestScope, ScopeHandle};
use super::ClientError;
use crate::models::AdminProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRoute {
    Login,
    Dashboard,
    News,
    Events,
    Team,
    Leadership,
    Documents,
    Messages,
}

impl AdminRoute {
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(|c| c == '?' || c == '#').next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        let route = match path {
            "/admin/login" => Self::Login,
            "/admin" => Self::Dashboard,
            "/admin/news" => Self::News,
            "/admin/events" => Self::Events,
            "/admin/team" => Self::Team,
            "/admin/leadership" => Self::Leadership,
            "/admin/documents" => Self::Documents,
            "/admin/messages" => Self::Messages,
            _ => return None,
        };
        Some(route)
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Login => LOGIN_PATH,
            Self::Dashboard => "/admin",
            Self::News => "/admin/news",
            Self::Events => "/admin/events",
            Self::Team => "/admin/team",
            Self::Leadership => "/admin/leadership",
            Self::Documents => "/admin/documents",
            Self::Messages => "/admin/messages",
        }
    }

    pub fn is_protected(self) -> bool {
        self != Self::Login
    }
}

/// What the shell shows after a visit settles
#[derive(Debug, Clone, PartialEq)]
pub enum AdminView {
    Login,
    Dashboard {
        admin: AdminProfile,
        stats: Option<DashboardStats>,
    },
    Section {
        admin: AdminProfile,
        route: AdminRoute,
    },
    NotFound,
    /// The visit was left before its requests finished
    Cancelled,
}

pub struct AdminApp {
    client: ApiClient,
    navigator: Arc<MemoryNavigator>,
    current: Mutex<Option<ScopeHandle>>,
}

impl AdminApp {
    pub fn new(client: ApiClient, navigator: Arc<MemoryNavigator>) -> Self {
        Self {
            client,
            navigator,
            current: Mutex::new(None),
        }
    }

    /// Cancel whatever the current visit is still waiting on
    pub fn leave(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(handle) = current.take() {
                handle.cancel();
            }
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn current_path(&self) -> String {
        self.navigator.current()
    }

    /// Navigate to `path` and follow redirects until a view settles
    ///
    /// Starting a visit cancels the previous one.
    pub async fn visit(&self, path: &str) -> AdminView {
        let scope = RequestScope::new();
        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.replace(scope.handle()) {
                previous.cancel();
            }
        }
        self.navigator.navigate(path);

        let Some(route) = AdminRoute::parse(path) else {
            return AdminView::NotFound;
        };

        let view = if route == AdminRoute::Login {
            let page = LoginPage::new(self.client.clone());
            match scope.run(async { Ok(page.mount().await) }).await {
                Ok(false) => Ok(AdminView::Login),
                // Token still valid, the login page moved on to the dashboard
                Ok(true) => self.guarded(&scope, AdminRoute::Dashboard).await,
                Err(e) => Err(e),
            }
        } else {
            self.guarded(&scope, route).await
        };
        view.unwrap_or(AdminView::Cancelled)
    }

    /// Only cancellation surfaces as an error here
    async fn guarded(
        &self,
        scope: &RequestScope,
        route: AdminRoute,
    ) -> Result<AdminView, ClientError> {
        let mut gate = AuthGate::new(self.client.clone());
        scope
            .run(async {
                gate.mount().await;
                Ok(())
            })
            .await?;
        let Some(admin) = gate.admin().cloned() else {
            return Ok(AdminView::Login);
        };

        let view = match route {
            AdminRoute::Dashboard => {
                let stats = match scope.run(DashboardStats::load(&self.client)).await {
                    Ok(stats) => Some(stats),
                    Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
                    Err(e) => {
                        tracing::error!("Failed to load dashboard: {}", e);
                        None
                    }
                };
                AdminView::Dashboard { admin, stats }
            }
            route => AdminView::Section { admin, route },
        };
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{spawn_server, spawn_silent_server};
    use crate::client::Session;
    use crate::models::CreateNewsInput;

    #[test]
    fn test_parse_routes() {
        assert_eq!(AdminRoute::parse("/admin"), Some(AdminRoute::Dashboard));
        assert_eq!(AdminRoute::parse("/admin/"), Some(AdminRoute::Dashboard));
        assert_eq!(AdminRoute::parse("/admin/news?x=1"), Some(AdminRoute::News));
        assert_eq!(AdminRoute::parse("/admin/login"), Some(AdminRoute::Login));
        assert_eq!(AdminRoute::parse("/admin/unknown"), None);
        assert_eq!(AdminRoute::parse("/news"), None);
        assert!(!AdminRoute::Login.is_protected());
        for route in [AdminRoute::Events, AdminRoute::Messages] {
            assert_eq!(AdminRoute::parse(route.path()), Some(route));
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_visit_lands_on_login_then_dashboard() {
        let server = spawn_server().await;
        let navigator = Arc::new(MemoryNavigator::default());
        let client =
            ApiClient::new(&server.base_url(), Session::in_memory(), navigator.clone()).unwrap();
        let app = AdminApp::new(client.clone(), navigator);

        assert_eq!(app.visit("/admin/events").await, AdminView::Login);
        assert_eq!(app.current_path(), LOGIN_PATH);
        assert_eq!(app.visit("/admin/login").await, AdminView::Login);

        LoginPage::new(client.clone())
            .register("admin", "secret1")
            .await
            .unwrap();
        client
            .news()
            .create(&CreateNewsInput {
                title: "Открытие сезона".to_string(),
                content: "Стартовал новый сезон соревнований.".to_string(),
                image_url: None,
                published_at: None,
                is_visible: false,
                telegram_id: None,
            })
            .await
            .unwrap();

        match app.visit("/admin/login").await {
            AdminView::Dashboard { admin, stats } => {
                assert_eq!(admin.username, "admin");
                let stats = stats.unwrap();
                assert_eq!(stats.news, 1);
                assert_eq!(stats.events, 0);
                let cards = stats.cards();
                let documents = cards.iter().find(|c| c.label == "Документы").unwrap();
                assert_eq!(documents.value, "-");
            }
            other => panic!("unexpected view {:?}", other),
        }

        match app.visit("/admin/events").await {
            AdminView::Section { route, .. } => assert_eq!(route, AdminRoute::Events),
            other => panic!("unexpected view {:?}", other),
        }
        assert_eq!(app.visit("/admin/nowhere").await, AdminView::NotFound);
    }

    #[tokio::test]
    async fn test_leaving_cancels_pending_visit() {
        let base_url = spawn_silent_server().await;
        let navigator = Arc::new(MemoryNavigator::default());
        let client = ApiClient::new(base_url, Session::in_memory(), navigator.clone()).unwrap();
        client.session().set_token("token");
        let app = AdminApp::new(client.clone(), navigator);

        let (view, _) = tokio::join!(app.visit("/admin/news"), async {
            tokio::task::yield_now().await;
            app.leave();
        });
        assert_eq!(view, AdminView::Cancelled);
        // The gate never settled, so nothing was cleared or redirected
        assert!(client.session().has_token());
        assert_eq!(app.current_path(), "/admin/news");
    }
}
