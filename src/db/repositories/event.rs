//! Event repository
//!
//! Database operations for calendar events.

use crate::db::DynDatabasePool;
use crate::models::{CreateEventInput, Event, EventFilter, ListParams};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Event repository trait
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Create a new event
    async fn create(&self, input: &CreateEventInput) -> Result<Event>;

    /// Get event by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Event>>;

    /// List events by ascending date
    async fn list(&self, filter: EventFilter, params: ListParams) -> Result<Vec<Event>>;

    /// Visible events dated on or after `from`, soonest first
    async fn upcoming(&self, from: NaiveDate, limit: i64) -> Result<Vec<Event>>;

    /// Persist all mutable fields of an event
    async fn update(&self, event: &Event) -> Result<Event>;

    /// Delete an event, returning whether it existed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Count events
    async fn count(&self, include_hidden: bool) -> Result<i64>;
}

/// SQLx-based event repository implementation
pub struct SqlxEventRepository {
    pool: DynDatabasePool,
}

impl SqlxEventRepository {
    /// Create a new SQLx event repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn EventRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl EventRepository for SqlxEventRepository {
    async fn create(&self, input: &CreateEventInput) -> Result<Event> {
        create_event_sqlite(self.pool.sqlite(), input).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Event>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_EVENTS))
            .bind(id)
            .fetch_optional(self.pool.sqlite())
            .await
            .context("Failed to get event by ID")?;
        Ok(row.as_ref().map(row_to_event_sqlite))
    }

    async fn list(&self, filter: EventFilter, params: ListParams) -> Result<Vec<Event>> {
        list_events_sqlite(self.pool.sqlite(), filter, params).await
    }

    async fn upcoming(&self, from: NaiveDate, limit: i64) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "{} WHERE is_visible = 1 AND event_date >= ? ORDER BY event_date ASC, id ASC LIMIT ?",
            SELECT_EVENTS
        ))
        .bind(from)
        .bind(limit)
        .fetch_all(self.pool.sqlite())
        .await
        .context("Failed to list upcoming events")?;
        Ok(rows.iter().map(row_to_event_sqlite).collect())
    }

    async fn update(&self, event: &Event) -> Result<Event> {
        update_event_sqlite(self.pool.sqlite(), event).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete event")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, include_hidden: bool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM events WHERE (? OR is_visible = 1)",
        )
        .bind(include_hidden)
        .fetch_one(self.pool.sqlite())
        .await
        .context("Failed to count events")?;
        Ok(count)
    }
}

const SELECT_EVENTS: &str = r#"
    SELECT id, title, description, event_date, event_time, location, event_type, is_visible, created_at
    FROM events
"#;

async fn create_event_sqlite(pool: &SqlitePool, input: &CreateEventInput) -> Result<Event> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO events (title, description, event_date, event_time, location, event_type, is_visible, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.event_date)
    .bind(&input.event_time)
    .bind(&input.location)
    .bind(&input.event_type)
    .bind(input.is_visible)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create event")?;

    Ok(Event {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        description: input.description.clone(),
        event_date: input.event_date,
        event_time: input.event_time.clone(),
        location: input.location.clone(),
        event_type: input.event_type.clone(),
        is_visible: input.is_visible,
        created_at: now,
    })
}

async fn list_events_sqlite(
    pool: &SqlitePool,
    filter: EventFilter,
    params: ListParams,
) -> Result<Vec<Event>> {
    let rows = match filter.date_range() {
        Some((start, end)) => {
            sqlx::query(&format!(
                "{} WHERE (? OR is_visible = 1) AND event_date >= ? AND event_date < ? \
                 ORDER BY event_date ASC, id ASC LIMIT ? OFFSET ?",
                SELECT_EVENTS
            ))
            .bind(filter.include_hidden)
            .bind(start)
            .bind(end)
            .bind(params.limit)
            .bind(params.skip)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query(&format!(
                "{} WHERE (? OR is_visible = 1) ORDER BY event_date ASC, id ASC LIMIT ? OFFSET ?",
                SELECT_EVENTS
            ))
            .bind(filter.include_hidden)
            .bind(params.limit)
            .bind(params.skip)
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list events")?;

    Ok(rows.iter().map(row_to_event_sqlite).collect())
}

async fn update_event_sqlite(pool: &SqlitePool, event: &Event) -> Result<Event> {
    sqlx::query(
        r#"
        UPDATE events
        SET title = ?, description = ?, event_date = ?, event_time = ?,
            location = ?, event_type = ?, is_visible = ?
        WHERE id = ?
        "#,
    )
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.event_date)
    .bind(&event.event_time)
    .bind(&event.location)
    .bind(&event.event_type)
    .bind(event.is_visible)
    .bind(event.id)
    .execute(pool)
    .await
    .context("Failed to update event")?;

    Ok(event.clone())
}

fn row_to_event_sqlite(row: &sqlx::sqlite::SqliteRow) -> Event {
    Event {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        event_date: row.get("event_date"),
        event_time: row.get("event_time"),
        location: row.get("location"),
        event_type: row.get("event_type"),
        is_visible: row.get("is_visible"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> Arc<dyn EventRepository> {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        SqlxEventRepository::boxed(pool)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_month_filter_and_ordering() {
        let repo = setup().await;
        repo.create(&CreateEventInput::new("late feb", date(2026, 2, 28))).await.unwrap();
        repo.create(&CreateEventInput::new("early feb", date(2026, 2, 1))).await.unwrap();
        repo.create(&CreateEventInput::new("march", date(2026, 3, 1))).await.unwrap();
        repo.create(&CreateEventInput::new("january", date(2026, 1, 31))).await.unwrap();

        let filter = EventFilter {
            include_hidden: false,
            month: Some((2026, 2)),
        };
        let feb = repo.list(filter, ListParams::new(0, 50)).await.unwrap();
        let titles: Vec<_> = feb.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["early feb", "late feb"]);

        let all = repo.list(EventFilter::default(), ListParams::new(0, 50)).await.unwrap();
        assert_eq!(all.first().unwrap().title, "january");
        assert_eq!(all.last().unwrap().title, "march");
    }

    #[tokio::test]
    async fn test_upcoming_skips_past_and_hidden() {
        let repo = setup().await;
        repo.create(&CreateEventInput::new("past", date(2026, 5, 1))).await.unwrap();
        repo.create(&CreateEventInput::new("today", date(2026, 5, 10))).await.unwrap();
        let mut hidden = CreateEventInput::new("hidden", date(2026, 5, 11));
        hidden.is_visible = false;
        repo.create(&hidden).await.unwrap();
        repo.create(&CreateEventInput::new("later", date(2026, 6, 1))).await.unwrap();

        let upcoming = repo.upcoming(date(2026, 5, 10), 5).await.unwrap();
        let titles: Vec<_> = upcoming.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["today", "later"]);

        let limited = repo.upcoming(date(2026, 5, 10), 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_update_roundtrip() {
        let repo = setup().await;
        let mut event = repo
            .create(&CreateEventInput::new("cup", date(2026, 4, 4)))
            .await
            .unwrap();
        event.location = Some("Cheboksary".to_string());
        event.event_time = Some("10:00".to_string());
        repo.update(&event).await.unwrap();

        let stored = repo.get_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(stored.location.as_deref(), Some("Cheboksary"));
        assert_eq!(stored.event_time.as_deref(), Some("10:00"));
        assert_eq!(stored.event_date, date(2026, 4, 4));
    }
}
