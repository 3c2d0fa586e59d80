//! Contact message repository

use crate::db::DynDatabasePool;
use crate::models::{ContactMessage, CreateContactInput, ListParams};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

/// Contact message repository trait
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, input: &CreateContactInput) -> Result<ContactMessage>;

    /// List messages, newest first
    async fn list(&self, params: ListParams, unread_only: bool) -> Result<Vec<ContactMessage>>;

    /// Mark a message read, returning whether it existed
    async fn mark_read(&self, id: i64) -> Result<bool>;

    async fn delete(&self, id: i64) -> Result<bool>;

    async fn count(&self, unread_only: bool) -> Result<i64>;
}

/// SQLx-based contact repository implementation
pub struct SqlxContactRepository {
    pool: DynDatabasePool,
}

impl SqlxContactRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ContactRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ContactRepository for SqlxContactRepository {
    async fn create(&self, input: &CreateContactInput) -> Result<ContactMessage> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO contact_messages (name, email, subject, message, is_read, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.subject)
        .bind(&input.message)
        .bind(now)
        .execute(self.pool.sqlite())
        .await
        .context("Failed to create contact message")?;

        Ok(ContactMessage {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            email: input.email.clone(),
            subject: input.subject.clone(),
            message: input.message.clone(),
            created_at: now,
            is_read: false,
        })
    }

    async fn list(&self, params: ListParams, unread_only: bool) -> Result<Vec<ContactMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, subject, message, is_read, created_at
            FROM contact_messages
            WHERE (? = 0 OR is_read = 0)
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(unread_only)
        .bind(params.limit)
        .bind(params.skip)
        .fetch_all(self.pool.sqlite())
        .await
        .context("Failed to list contact messages")?;

        Ok(rows
            .iter()
            .map(|row| ContactMessage {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
                subject: row.get("subject"),
                message: row.get("message"),
                created_at: row.get("created_at"),
                is_read: row.get("is_read"),
            })
            .collect())
    }

    async fn mark_read(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE contact_messages SET is_read = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to mark message read")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete contact message")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, unread_only: bool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contact_messages WHERE (? = 0 OR is_read = 0)",
        )
        .bind(unread_only)
        .fetch_one(self.pool.sqlite())
        .await
        .context("Failed to count contact messages")?;
        Ok(count)
    }
}
