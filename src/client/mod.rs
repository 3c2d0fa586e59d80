//! Admin client
//!
//! Talks to the REST API over HTTP and holds the state of the admin pages:
//! the auth gate, the entity editors, the documents tree, the inbox and the
//! dashboard. Rendering is left to whoever drives these types.

pub mod api;
pub mod app;
pub mod auth_gate;
pub mod dashboard;
pub mod documents;
pub mod editor;
pub mod error;
pub mod messages;
pub mod navigator;
pub mod scope;
pub mod session;

pub use api::{ApiClient, Resource, UploadFile};
pub use app::{AdminApp, AdminRoute, AdminView};
pub use auth_gate::{AuthGate, GateState, LoginPage, MIN_PASSWORD_LEN};
pub use dashboard::{DashboardStats, StatCard};
pub use documents::{DocumentsAdmin, PendingDelete, UploadForm};
pub use editor::{Editable, EntityEditor, ListState, ModalMode, ModalState, SAVE_FAILED};
pub use error::ClientError;
pub use messages::Inbox;
pub use navigator::{MemoryNavigator, Navigator, ADMIN_HOME, LOGIN_PATH};
pub use scope::{RequestScope, ScopeHandle};
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};

#[cfg(test)]
pub(crate) mod testing {
    //! Live server on a loopback port for client tests

    use std::sync::Arc;

    use tempfile::TempDir;

    use super::{ApiClient, MemoryNavigator, Session};
    use crate::api::{build_router, AppState};
    use crate::config::Config;
    use crate::db::{create_test_pool, migrations};

    pub struct TestServer {
        addr: std::net::SocketAddr,
        _dir: TempDir,
    }

    impl TestServer {
        pub fn base_url(&self) -> String {
            format!("http://{}", self.addr)
        }
    }

    pub async fn spawn_server() -> TestServer {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let mut config = Config::default();
        config.upload.path = dir.path().join("documents");
        let state = AppState::new(pool, &config).unwrap();
        let app = build_router(state, "*");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer { addr, _dir: dir }
    }

    /// Accepts connections and never answers; requests to it stay in flight
    pub async fn spawn_silent_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });
        format!("http://{}", addr)
    }

    /// Client holding a token for a freshly registered admin
    pub async fn admin_client(server: &TestServer) -> ApiClient {
        let navigator = Arc::new(MemoryNavigator::default());
        let client = ApiClient::new(server.base_url(), Session::in_memory(), navigator).unwrap();
        let token = client.auth().register("admin", "secret1").await.unwrap();
        client.session().set_token(&token.access_token);
        client
    }
}
