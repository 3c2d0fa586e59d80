//! News repository
//!
//! Database operations for news posts, including the lookups the Telegram
//! importer needs.

use crate::db::DynDatabasePool;
use crate::models::{CreateNewsInput, ListParams, NewsItem};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Create a new news post
    async fn create(&self, input: &CreateNewsInput) -> Result<NewsItem>;

    /// Get news post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<NewsItem>>;

    /// Get the post imported from a Telegram message
    async fn get_by_telegram_id(&self, telegram_id: &str) -> Result<Option<NewsItem>>;

    /// List posts, newest first
    async fn list(&self, params: ListParams, include_hidden: bool) -> Result<Vec<NewsItem>>;

    /// Persist all mutable fields of a post
    async fn update(&self, item: &NewsItem) -> Result<NewsItem>;

    /// Delete a post, returning whether it existed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Count posts
    async fn count(&self, include_hidden: bool) -> Result<i64>;
}

/// SQLx-based news repository implementation
pub struct SqlxNewsRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsRepository {
    /// Create a new SQLx news repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &CreateNewsInput) -> Result<NewsItem> {
        create_news_sqlite(self.pool.sqlite(), input).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<NewsItem>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_NEWS))
            .bind(id)
            .fetch_optional(self.pool.sqlite())
            .await
            .context("Failed to get news by ID")?;
        Ok(row.as_ref().map(row_to_news_sqlite))
    }

    async fn get_by_telegram_id(&self, telegram_id: &str) -> Result<Option<NewsItem>> {
        let row = sqlx::query(&format!("{} WHERE telegram_id = ?", SELECT_NEWS))
            .bind(telegram_id)
            .fetch_optional(self.pool.sqlite())
            .await
            .context("Failed to get news by telegram ID")?;
        Ok(row.as_ref().map(row_to_news_sqlite))
    }

    async fn list(&self, params: ListParams, include_hidden: bool) -> Result<Vec<NewsItem>> {
        list_news_sqlite(self.pool.sqlite(), params, include_hidden).await
    }

    async fn update(&self, item: &NewsItem) -> Result<NewsItem> {
        update_news_sqlite(self.pool.sqlite(), item).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete news")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, include_hidden: bool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM news WHERE (? OR is_visible = 1)",
        )
        .bind(include_hidden)
        .fetch_one(self.pool.sqlite())
        .await
        .context("Failed to count news")?;
        Ok(count)
    }
}

const SELECT_NEWS: &str = r#"
    SELECT id, title, content, image_url, published_at, telegram_id, is_visible, created_at
    FROM news
"#;

async fn create_news_sqlite(pool: &SqlitePool, input: &CreateNewsInput) -> Result<NewsItem> {
    let now = Utc::now();
    let published_at = input.published_at.unwrap_or(now);

    let result = sqlx::query(
        r#"
        INSERT INTO news (title, content, image_url, published_at, telegram_id, is_visible, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(&input.image_url)
    .bind(published_at)
    .bind(&input.telegram_id)
    .bind(input.is_visible)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create news")?;

    Ok(NewsItem {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        content: input.content.clone(),
        image_url: input.image_url.clone(),
        images: input.image_url.iter().cloned().collect(),
        published_at,
        telegram_id: input.telegram_id.clone(),
        is_visible: input.is_visible,
        created_at: now,
    })
}

async fn list_news_sqlite(
    pool: &SqlitePool,
    params: ListParams,
    include_hidden: bool,
) -> Result<Vec<NewsItem>> {
    let rows = sqlx::query(&format!(
        "{} WHERE (? OR is_visible = 1) ORDER BY published_at DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_NEWS
    ))
    .bind(include_hidden)
    .bind(params.limit)
    .bind(params.skip)
    .fetch_all(pool)
    .await
    .context("Failed to list news")?;

    Ok(rows.iter().map(row_to_news_sqlite).collect())
}

async fn update_news_sqlite(pool: &SqlitePool, item: &NewsItem) -> Result<NewsItem> {
    sqlx::query(
        r#"
        UPDATE news
        SET title = ?, content = ?, image_url = ?, published_at = ?, is_visible = ?
        WHERE id = ?
        "#,
    )
    .bind(&item.title)
    .bind(&item.content)
    .bind(&item.image_url)
    .bind(item.published_at)
    .bind(item.is_visible)
    .bind(item.id)
    .execute(pool)
    .await
    .context("Failed to update news")?;

    let mut updated = item.clone();
    updated.images = item.image_url.iter().cloned().collect();
    Ok(updated)
}

fn row_to_news_sqlite(row: &sqlx::sqlite::SqliteRow) -> NewsItem {
    let image_url: Option<String> = row.get("image_url");
    NewsItem {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        images: image_url.iter().cloned().collect(),
        image_url,
        published_at: row.get("published_at"),
        telegram_id: row.get("telegram_id"),
        is_visible: row.get("is_visible"),
        created_at: row.get("created_at"),
    }
}
