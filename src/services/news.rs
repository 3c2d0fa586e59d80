//! News service

use crate::db::repositories::NewsRepository;
use crate::models::{CreateNewsInput, ListParams, NewsItem, UpdateNewsInput};
use crate::services::{merge, merge_nullable, require_text, ServiceError};
use anyhow::Context;
use std::sync::Arc;

/// Default page size of the news list
pub const DEFAULT_NEWS_LIMIT: i64 = 20;

pub struct NewsService {
    repo: Arc<dyn NewsRepository>,
}

impl NewsService {
    pub fn new(repo: Arc<dyn NewsRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        params: ListParams,
        include_hidden: bool,
    ) -> Result<Vec<NewsItem>, ServiceError> {
        Ok(self
            .repo
            .list(params, include_hidden)
            .await
            .context("Failed to list news")?)
    }

    pub async fn get(&self, id: i64) -> Result<NewsItem, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get news")?
            .ok_or(ServiceError::NotFound("News"))
    }

    pub async fn create(&self, input: CreateNewsInput) -> Result<NewsItem, ServiceError> {
        require_text("title", &input.title)?;
        require_text("content", &input.content)?;
        Ok(self.repo.create(&input).await.context("Failed to create news")?)
    }

    /// Apply a partial update; only fields present in `input` change
    pub async fn update(&self, id: i64, input: UpdateNewsInput) -> Result<NewsItem, ServiceError> {
        let mut item = self.get(id).await?;

        if let Some(title) = &input.title {
            require_text("title", title)?;
        }
        if let Some(content) = &input.content {
            require_text("content", content)?;
        }

        merge(&mut item.title, input.title);
        merge(&mut item.content, input.content);
        merge_nullable(&mut item.image_url, input.image_url);
        merge(&mut item.published_at, input.published_at);
        merge(&mut item.is_visible, input.is_visible);

        Ok(self.repo.update(&item).await.context("Failed to update news")?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete news")? {
            return Err(ServiceError::NotFound("News"));
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, ServiceError> {
        Ok(self.repo.count(true).await.context("Failed to count news")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxNewsRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> NewsService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        NewsService::new(SqlxNewsRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_create_requires_title_and_content() {
        let service = setup().await;
        let err = service
            .create(CreateNewsInput::new("", "body"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        let err = service
            .create(CreateNewsInput::new("title", " "))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_visibility_toggle_changes_only_that_field() {
        let service = setup().await;
        let mut input = CreateNewsInput::new("Итоги кубка", "Текст");
        input.image_url = Some("https://cdn/img.jpg".to_string());
        let created = service.create(input).await.unwrap();

        let updated = service
            .update(
                created.id,
                UpdateNewsInput {
                    is_visible: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!updated.is_visible);
        let stored = service.get(created.id).await.unwrap();
        assert_eq!(stored.title, created.title);
        assert_eq!(stored.content, created.content);
        assert_eq!(stored.image_url, created.image_url);
        assert_eq!(stored.published_at, created.published_at);
        assert!(!stored.is_visible);
    }

    #[tokio::test]
    async fn test_explicit_null_clears_image() {
        let service = setup().await;
        let mut input = CreateNewsInput::new("t", "c");
        input.image_url = Some("https://cdn/img.jpg".to_string());
        let created = service.create(input).await.unwrap();

        let update: UpdateNewsInput = serde_json::from_str(r#"{"image_url":null}"#).unwrap();
        let updated = service.update(created.id, update).await.unwrap();
        assert!(updated.image_url.is_none());
        assert!(updated.images.is_empty());
    }

    #[tokio::test]
    async fn test_missing_news_is_not_found() {
        let service = setup().await;
        assert!(matches!(
            service.get(404).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            service.delete(404).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            service.update(404, UpdateNewsInput::default()).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
