//! Admin navigation

use std::sync::Mutex;

pub const LOGIN_PATH: &str = "/admin/login";
pub const ADMIN_HOME: &str = "/admin";

/// Receives redirects issued by the client and the auth gate
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that records the visited paths
#[derive(Debug)]
pub struct MemoryNavigator {
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(start: &str) -> Self {
        Self {
            history: Mutex::new(vec![start.to_string()]),
        }
    }

    pub fn current(&self) -> String {
        self.history
            .lock()
            .ok()
            .and_then(|history| history.last().cloned())
            .unwrap_or_else(|| ADMIN_HOME.to_string())
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(ADMIN_HOME)
    }
}

impl Navigator for MemoryNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!("Navigating to {}", path);
        if let Ok(mut history) = self.history.lock() {
            if history.last().map(String::as_str) != Some(path) {
                history.push(path.to_string());
            }
        }
    }
}
