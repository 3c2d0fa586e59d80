//! Contact form service
//!
//! Stores the message first, then hands it to the notifier in the
//! background. A failed notification never fails the submission.

use crate::db::repositories::ContactRepository;
use crate::models::{ContactMessage, CreateContactInput, ListParams};
use crate::services::email::ContactNotifier;
use crate::services::{require_text, ServiceError};
use anyhow::Context;
use std::sync::Arc;

pub struct ContactService {
    repo: Arc<dyn ContactRepository>,
    notifier: Arc<dyn ContactNotifier>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactRepository>, notifier: Arc<dyn ContactNotifier>) -> Self {
        Self { repo, notifier }
    }

    /// Store a submission and notify in the background
    pub async fn submit(&self, input: CreateContactInput) -> Result<ContactMessage, ServiceError> {
        let input = normalize(input)?;
        let message = self
            .repo
            .create(&input)
            .await
            .context("Failed to save contact message")?;

        let notifier = self.notifier.clone();
        let pending = message.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&pending).await {
                tracing::warn!("Contact notification for message {} failed: {}", pending.id, e);
            }
        });

        Ok(message)
    }

    pub async fn list(
        &self,
        params: ListParams,
        unread_only: bool,
    ) -> Result<Vec<ContactMessage>, ServiceError> {
        Ok(self
            .repo
            .list(params, unread_only)
            .await
            .context("Failed to list contact messages")?)
    }

    pub async fn mark_read(&self, id: i64) -> Result<(), ServiceError> {
        if !self.repo.mark_read(id).await.context("Failed to mark message read")? {
            return Err(ServiceError::NotFound("Message"));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete message")? {
            return Err(ServiceError::NotFound("Message"));
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, ServiceError> {
        Ok(self.repo.count(false).await.context("Failed to count messages")?)
    }

    pub async fn unread_count(&self) -> Result<i64, ServiceError> {
        Ok(self.repo.count(true).await.context("Failed to count unread messages")?)
    }
}

fn normalize(mut input: CreateContactInput) -> Result<CreateContactInput, ServiceError> {
    require_text("name", &input.name)?;
    require_text("message", &input.message)?;

    input.name = input.name.trim().to_string();
    input.email = input.email.trim().to_string();
    if !is_plausible_email(&input.email) {
        return Err(ServiceError::ValidationError("Invalid email address".to_string()));
    }
    input.subject = input
        .subject
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    Ok(input)
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxContactRepository;
    use crate::db::{create_test_pool, migrations};
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct ChannelNotifier(mpsc::UnboundedSender<i64>);

    #[async_trait]
    impl ContactNotifier for ChannelNotifier {
        async fn notify(&self, message: &ContactMessage) -> anyhow::Result<()> {
            let _ = self.0.send(message.id);
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl ContactNotifier for FailingNotifier {
        async fn notify(&self, _message: &ContactMessage) -> anyhow::Result<()> {
            anyhow::bail!("smtp down")
        }
    }

    async fn setup(notifier: Arc<dyn ContactNotifier>) -> ContactService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        ContactService::new(SqlxContactRepository::boxed(pool), notifier)
    }

    fn input(email: &str) -> CreateContactInput {
        CreateContactInput {
            name: " Анна ".to_string(),
            email: email.to_string(),
            subject: Some("  ".to_string()),
            message: "Хочу в команду".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_stores_and_notifies() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = setup(Arc::new(ChannelNotifier(tx))).await;

        let message = service.submit(input("anna@example.org")).await.unwrap();
        assert_eq!(message.name, "Анна");
        assert_eq!(message.subject, None);
        assert!(!message.is_read);

        assert_eq!(rx.recv().await, Some(message.id));
        assert_eq!(service.unread_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_notification_keeps_message() {
        let service = setup(Arc::new(FailingNotifier)).await;
        service.submit(input("anna@example.org")).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let service = setup(Arc::new(FailingNotifier)).await;
        for email in ["", "anna", "anna@", "@example.org", "anna@localhost"] {
            assert!(matches!(
                service.submit(input(email)).await.unwrap_err(),
                ServiceError::ValidationError(_)
            ));
        }
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_and_delete() {
        let service = setup(Arc::new(FailingNotifier)).await;
        let message = service.submit(input("anna@example.org")).await.unwrap();

        service.mark_read(message.id).await.unwrap();
        assert_eq!(service.unread_count().await.unwrap(), 0);
        assert_eq!(service.count().await.unwrap(), 1);

        service.delete(message.id).await.unwrap();
        assert!(matches!(
            service.mark_read(message.id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
