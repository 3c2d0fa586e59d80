//! Admin repository
//!
//! Database operations for back-office administrator accounts.

use crate::db::DynDatabasePool;
use crate::models::Admin;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Admin repository trait
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Create a new admin account
    async fn create(&self, username: &str, password_hash: &str) -> Result<Admin>;

    /// Get admin by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Admin>>;

    /// Get admin by username
    async fn get_by_username(&self, username: &str) -> Result<Option<Admin>>;

    /// Count all admin accounts
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based admin repository implementation
pub struct SqlxAdminRepository {
    pool: DynDatabasePool,
}

impl SqlxAdminRepository {
    /// Create a new SQLx admin repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn AdminRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AdminRepository for SqlxAdminRepository {
    async fn create(&self, username: &str, password_hash: &str) -> Result<Admin> {
        create_admin_sqlite(self.pool.sqlite(), username, password_hash).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Admin>> {
        get_admin_by_id_sqlite(self.pool.sqlite(), id).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Admin>> {
        get_admin_by_username_sqlite(self.pool.sqlite(), username).await
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(self.pool.sqlite())
            .await
            .context("Failed to count admins")?;
        Ok(count)
    }
}

async fn create_admin_sqlite(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> Result<Admin> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO admins (username, password_hash, created_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create admin")?;

    Ok(Admin {
        id: result.last_insert_rowid(),
        username: username.to_string(),
        password_hash: password_hash.to_string(),
        created_at: now,
    })
}

async fn get_admin_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Admin>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, password_hash, created_at
        FROM admins
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get admin by ID")?;

    Ok(row.as_ref().map(row_to_admin_sqlite))
}

async fn get_admin_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<Admin>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, password_hash, created_at
        FROM admins
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .context("Failed to get admin by username")?;

    Ok(row.as_ref().map(row_to_admin_sqlite))
}

fn row_to_admin_sqlite(row: &sqlx::sqlite::SqliteRow) -> Admin {
    Admin {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}
