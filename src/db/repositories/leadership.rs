//! Leadership repository

use crate::db::DynDatabasePool;
use crate::models::{CreateLeadershipInput, LeadershipMember};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Leadership repository trait
#[async_trait]
pub trait LeadershipRepository: Send + Sync {
    async fn create(&self, input: &CreateLeadershipInput) -> Result<LeadershipMember>;

    async fn get_by_id(&self, id: i64) -> Result<Option<LeadershipMember>>;

    /// List members ordered by `order`
    async fn list(&self, include_hidden: bool) -> Result<Vec<LeadershipMember>>;

    async fn update(&self, member: &LeadershipMember) -> Result<LeadershipMember>;

    async fn delete(&self, id: i64) -> Result<bool>;

    async fn count(&self) -> Result<i64>;
}

/// SQLx-based leadership repository implementation
pub struct SqlxLeadershipRepository {
    pool: DynDatabasePool,
}

impl SqlxLeadershipRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LeadershipRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LeadershipRepository for SqlxLeadershipRepository {
    async fn create(&self, input: &CreateLeadershipInput) -> Result<LeadershipMember> {
        create_leader_sqlite(self.pool.sqlite(), input).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<LeadershipMember>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_LEADERS))
            .bind(id)
            .fetch_optional(self.pool.sqlite())
            .await
            .context("Failed to get leadership member by ID")?;
        Ok(row.as_ref().map(row_to_leader_sqlite))
    }

    async fn list(&self, include_hidden: bool) -> Result<Vec<LeadershipMember>> {
        let rows = sqlx::query(&format!(
            "{} WHERE (? OR is_visible = 1) ORDER BY sort_order ASC, id ASC",
            SELECT_LEADERS
        ))
        .bind(include_hidden)
        .fetch_all(self.pool.sqlite())
        .await
        .context("Failed to list leadership")?;

        Ok(rows.iter().map(row_to_leader_sqlite).collect())
    }

    async fn update(&self, member: &LeadershipMember) -> Result<LeadershipMember> {
        sqlx::query(
            r#"
            UPDATE leadership_members
            SET full_name = ?, position = ?, description = ?, photo_url = ?,
                sort_order = ?, is_visible = ?
            WHERE id = ?
            "#,
        )
        .bind(&member.full_name)
        .bind(&member.position)
        .bind(&member.description)
        .bind(&member.photo_url)
        .bind(member.order)
        .bind(member.is_visible)
        .bind(member.id)
        .execute(self.pool.sqlite())
        .await
        .context("Failed to update leadership member")?;

        Ok(member.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM leadership_members WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete leadership member")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leadership_members")
            .fetch_one(self.pool.sqlite())
            .await
            .context("Failed to count leadership")?;
        Ok(count)
    }
}

const SELECT_LEADERS: &str = r#"
    SELECT id, full_name, position, description, photo_url, sort_order, is_visible, created_at
    FROM leadership_members
"#;

async fn create_leader_sqlite(
    pool: &SqlitePool,
    input: &CreateLeadershipInput,
) -> Result<LeadershipMember> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO leadership_members (full_name, position, description, photo_url, sort_order, is_visible, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.full_name)
    .bind(&input.position)
    .bind(&input.description)
    .bind(&input.photo_url)
    .bind(input.order)
    .bind(input.is_visible)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create leadership member")?;

    Ok(LeadershipMember {
        id: result.last_insert_rowid(),
        full_name: input.full_name.clone(),
        position: input.position.clone(),
        description: input.description.clone(),
        photo_url: input.photo_url.clone(),
        order: input.order,
        is_visible: input.is_visible,
        created_at: now,
    })
}

fn row_to_leader_sqlite(row: &sqlx::sqlite::SqliteRow) -> LeadershipMember {
    LeadershipMember {
        id: row.get("id"),
        full_name: row.get("full_name"),
        position: row.get("position"),
        description: row.get("description"),
        photo_url: row.get("photo_url"),
        order: row.get("sort_order"),
        is_visible: row.get("is_visible"),
        created_at: row.get("created_at"),
    }
}
