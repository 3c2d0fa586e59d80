//! Request cancellation
//!
//! A page owns a `RequestScope`. Requests run or spawned inside it are aborted
//! when the scope is cancelled or dropped, so a late response never lands in a
//! page that is gone. A `ScopeHandle` lets the shell cancel a page's requests
//! while the page itself is busy awaiting one.

use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::ClientError;

#[derive(Debug)]
pub struct RequestScope {
    cancelled: Arc<watch::Sender<bool>>,
}

/// Cancels a scope from outside; does not keep the scope alive
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    cancelled: Weak<watch::Sender<bool>>,
}

impl ScopeHandle {
    pub fn cancel(&self) {
        if let Some(cancelled) = self.cancelled.upgrade() {
            cancelled.send_replace(true);
        }
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestScope {
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            cancelled: Arc::new(cancelled),
        }
    }

    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            cancelled: Arc::downgrade(&self.cancelled),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Run a request to completion unless the scope goes away first
    pub async fn run<T, F>(&self, request: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let mut receiver = self.cancelled.subscribe();
        tokio::select! {
            result = request => result,
            _ = wait_cancelled(&mut receiver) => Err(ClientError::Cancelled),
        }
    }

    /// Spawn a request that is aborted when the scope is cancelled or dropped
    pub fn spawn<T, F>(&self, request: F) -> JoinHandle<Result<T, ClientError>>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let mut receiver = self.cancelled.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                result = request => result,
                _ = wait_cancelled(&mut receiver) => Err(ClientError::Cancelled),
            }
        })
    }
}

/// Resolves once cancellation is flagged or the sender is gone
async fn wait_cancelled(receiver: &mut watch::Receiver<bool>) {
    loop {
        if *receiver.borrow_and_update() {
            return;
        }
        if receiver.changed().await.is_err() {
            return;
        }
    }
}
