//! Leadership service

use crate::db::repositories::LeadershipRepository;
use crate::models::{CreateLeadershipInput, LeadershipMember, UpdateLeadershipInput};
use crate::services::{merge, merge_nullable, require_text, ServiceError};
use anyhow::Context;
use std::sync::Arc;

pub struct LeadershipService {
    repo: Arc<dyn LeadershipRepository>,
}

impl LeadershipService {
    pub fn new(repo: Arc<dyn LeadershipRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, include_hidden: bool) -> Result<Vec<LeadershipMember>, ServiceError> {
        Ok(self
            .repo
            .list(include_hidden)
            .await
            .context("Failed to list leadership")?)
    }

    pub async fn get(&self, id: i64) -> Result<LeadershipMember, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get leadership member")?
            .ok_or(ServiceError::NotFound("Leadership member"))
    }

    pub async fn create(
        &self,
        input: CreateLeadershipInput,
    ) -> Result<LeadershipMember, ServiceError> {
        require_text("full_name", &input.full_name)?;
        require_text("position", &input.position)?;
        Ok(self
            .repo
            .create(&input)
            .await
            .context("Failed to create leadership member")?)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateLeadershipInput,
    ) -> Result<LeadershipMember, ServiceError> {
        let mut member = self.get(id).await?;

        if let Some(name) = &input.full_name {
            require_text("full_name", name)?;
        }
        if let Some(position) = &input.position {
            require_text("position", position)?;
        }

        merge(&mut member.full_name, input.full_name);
        merge(&mut member.position, input.position);
        merge_nullable(&mut member.description, input.description);
        merge_nullable(&mut member.photo_url, input.photo_url);
        merge(&mut member.order, input.order);
        merge(&mut member.is_visible, input.is_visible);

        Ok(self
            .repo
            .update(&member)
            .await
            .context("Failed to update leadership member")?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self
            .repo
            .delete(id)
            .await
            .context("Failed to delete leadership member")?
        {
            return Err(ServiceError::NotFound("Leadership member"));
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, ServiceError> {
        Ok(self.repo.count().await.context("Failed to count leadership")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxLeadershipRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> LeadershipService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        LeadershipService::new(SqlxLeadershipRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_hidden_member_only_listed_for_admins() {
        let service = setup().await;
        let mut hidden = CreateLeadershipInput::new("Скрытый", "Секретарь", 2);
        hidden.is_visible = false;
        service.create(hidden).await.unwrap();
        service
            .create(CreateLeadershipInput::new("Руководитель", "Руководитель", 1))
            .await
            .unwrap();

        assert_eq!(service.list(false).await.unwrap().len(), 1);
        assert_eq!(service.list(true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_clears_description() {
        let service = setup().await;
        let created = service
            .create(
                CreateLeadershipInput::new("Иванов", "Руководитель", 1)
                    .with_description("Руководитель регионального представительства"),
            )
            .await
            .unwrap();

        let update: UpdateLeadershipInput =
            serde_json::from_str(r#"{"description":null,"order":5}"#).unwrap();
        let updated = service.update(created.id, update).await.unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.order, 5);
        assert_eq!(updated.position, "Руководитель");
    }

    #[tokio::test]
    async fn test_position_required() {
        let service = setup().await;
        assert!(matches!(
            service
                .create(CreateLeadershipInput::new("Иванов", "", 1))
                .await
                .unwrap_err(),
            ServiceError::ValidationError(_)
        ));
    }
}
