//! Event service

use crate::db::repositories::EventRepository;
use crate::models::{CreateEventInput, Event, EventFilter, ListParams, UpdateEventInput};
use crate::services::{merge, merge_nullable, require_text, ServiceError};
use anyhow::Context;
use chrono::NaiveDate;
use std::sync::Arc;

/// Default page size of the event list
pub const DEFAULT_EVENTS_LIMIT: i64 = 50;

/// Default number of upcoming events
pub const DEFAULT_UPCOMING_LIMIT: i64 = 5;

pub struct EventService {
    repo: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(repo: Arc<dyn EventRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        filter: EventFilter,
        params: ListParams,
    ) -> Result<Vec<Event>, ServiceError> {
        if let Some((_, month)) = filter.month {
            if !(1..=12).contains(&month) {
                return Err(ServiceError::ValidationError(format!(
                    "Invalid month: {}",
                    month
                )));
            }
        }
        Ok(self
            .repo
            .list(filter, params)
            .await
            .context("Failed to list events")?)
    }

    /// Visible events dated `today` or later
    pub async fn upcoming(&self, today: NaiveDate, limit: i64) -> Result<Vec<Event>, ServiceError> {
        Ok(self
            .repo
            .upcoming(today, limit.clamp(1, ListParams::MAX_LIMIT))
            .await
            .context("Failed to list upcoming events")?)
    }

    pub async fn get(&self, id: i64) -> Result<Event, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get event")?
            .ok_or(ServiceError::NotFound("Event"))
    }

    pub async fn create(&self, input: CreateEventInput) -> Result<Event, ServiceError> {
        require_text("title", &input.title)?;
        Ok(self.repo.create(&input).await.context("Failed to create event")?)
    }

    pub async fn update(&self, id: i64, input: UpdateEventInput) -> Result<Event, ServiceError> {
        let mut event = self.get(id).await?;

        if let Some(title) = &input.title {
            require_text("title", title)?;
        }

        merge(&mut event.title, input.title);
        merge(&mut event.event_date, input.event_date);
        merge_nullable(&mut event.description, input.description);
        merge_nullable(&mut event.event_time, input.event_time);
        merge_nullable(&mut event.location, input.location);
        merge_nullable(&mut event.event_type, input.event_type);
        merge(&mut event.is_visible, input.is_visible);

        Ok(self.repo.update(&event).await.context("Failed to update event")?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete event")? {
            return Err(ServiceError::NotFound("Event"));
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, ServiceError> {
        Ok(self.repo.count(true).await.context("Failed to count events")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxEventRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> EventService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        EventService::new(SqlxEventRepository::boxed(pool))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let service = setup().await;
        let mut input = CreateEventInput::new("Хакатон", date(2026, 11, 20));
        input.location = Some("Чебоксары".to_string());
        input.event_time = Some("10:00".to_string());
        let created = service.create(input).await.unwrap();

        let update: UpdateEventInput =
            serde_json::from_str(r#"{"event_time":null,"title":"Хакатон 2026"}"#).unwrap();
        let updated = service.update(created.id, update).await.unwrap();

        assert_eq!(updated.title, "Хакатон 2026");
        assert_eq!(updated.event_time, None);
        assert_eq!(updated.location.as_deref(), Some("Чебоксары"));
        assert_eq!(updated.event_date, date(2026, 11, 20));
    }

    #[tokio::test]
    async fn test_invalid_month_rejected() {
        let service = setup().await;
        let filter = EventFilter {
            include_hidden: false,
            month: Some((2026, 0)),
        };
        assert!(matches!(
            service.list(filter, ListParams::new(0, 50)).await.unwrap_err(),
            ServiceError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let service = setup().await;
        let err = service
            .create(CreateEventInput::new("", date(2026, 1, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }
}
