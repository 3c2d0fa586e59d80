//! Contact messages inbox

use super::api::ApiClient;
use super::editor::ListState;
use super::scope::{RequestScope, ScopeHandle};
use super::ClientError;
use crate::models::ContactMessage;

pub struct Inbox {
    client: ApiClient,
    messages: ListState<ContactMessage>,
    opened: Option<i64>,
    pending_delete: Option<i64>,
    scope: RequestScope,
}

impl Inbox {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            messages: ListState::Loading,
            opened: None,
            pending_delete: None,
            scope: RequestScope::new(),
        }
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Newest first, as returned by the server
    pub fn messages(&self) -> &[ContactMessage] {
        match &self.messages {
            ListState::Loaded(messages) => messages,
            ListState::Loading => &[],
        }
    }

    pub fn unread_count(&self) -> usize {
        self.messages().iter().filter(|m| !m.is_read).count()
    }

    pub fn opened(&self) -> Option<&ContactMessage> {
        let id = self.opened?;
        self.messages().iter().find(|m| m.id == id)
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        if self.scope.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        self.messages = ListState::Loading;
        let result = self.scope.run(self.client.contact().list(false)).await;
        match result {
            Ok(messages) => {
                self.messages = ListState::Loaded(messages);
                Ok(())
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                tracing::error!("Failed to load messages: {}", e);
                self.messages = ListState::Loaded(Vec::new());
                Err(e)
            }
        }
    }

    async fn reload(&mut self) {
        let _ = self.load().await;
    }

    /// Show a message, marking it read on first open
    pub async fn open(&mut self, id: i64) -> Result<(), ClientError> {
        let unread = self
            .messages()
            .iter()
            .find(|m| m.id == id)
            .map(|m| !m.is_read)
            .ok_or_else(|| ClientError::Validation(format!("Unknown message {}", id)))?;

        self.opened = Some(id);
        if unread {
            if let Err(e) = self.scope.run(self.client.contact().mark_read(id)).await {
                tracing::error!("Failed to mark message {} read: {}", id, e);
                return Err(e);
            }
            self.reload().await;
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.opened = None;
    }

    pub fn request_delete(&mut self, id: i64) {
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub async fn confirm_delete(&mut self) -> Result<(), ClientError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(());
        };
        let result = self.scope.run(self.client.contact().delete(id)).await;
        match &result {
            Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
            Err(e) => tracing::error!("Failed to delete message {}: {}", id, e),
            Ok(_) => {}
        }
        if self.opened == Some(id) {
            self.opened = None;
        }
        self.reload().await;
        result.map(|_| ())
    }
}
