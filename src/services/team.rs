//! Team roster service

use crate::db::repositories::TeamRepository;
use crate::models::{CreateTeamMemberInput, TeamFilter, TeamMember, UpdateTeamMemberInput};
use crate::services::{merge, merge_nullable, require_text, ServiceError};
use anyhow::Context;
use std::sync::Arc;

pub struct TeamService {
    repo: Arc<dyn TeamRepository>,
}

impl TeamService {
    pub fn new(repo: Arc<dyn TeamRepository>) -> Self {
        Self { repo }
    }

    /// Members ordered by category, discipline, then display order
    pub async fn list(&self, filter: &TeamFilter) -> Result<Vec<TeamMember>, ServiceError> {
        Ok(self
            .repo
            .list(filter)
            .await
            .context("Failed to list team members")?)
    }

    pub async fn get(&self, id: i64) -> Result<TeamMember, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get team member")?
            .ok_or(ServiceError::NotFound("Team member"))
    }

    pub async fn create(&self, input: CreateTeamMemberInput) -> Result<TeamMember, ServiceError> {
        require_text("full_name", &input.full_name)?;
        require_text("category", &input.category)?;
        Ok(self
            .repo
            .create(&input)
            .await
            .context("Failed to create team member")?)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateTeamMemberInput,
    ) -> Result<TeamMember, ServiceError> {
        let mut member = self.get(id).await?;

        if let Some(name) = &input.full_name {
            require_text("full_name", name)?;
        }
        if let Some(category) = &input.category {
            require_text("category", category)?;
        }

        merge(&mut member.full_name, input.full_name);
        merge(&mut member.category, input.category);
        merge_nullable(&mut member.discipline, input.discipline);
        merge_nullable(&mut member.position, input.position);
        merge_nullable(&mut member.city, input.city);
        merge_nullable(&mut member.photo_url, input.photo_url);
        merge(&mut member.order, input.order);
        merge(&mut member.is_visible, input.is_visible);

        Ok(self
            .repo
            .update(&member)
            .await
            .context("Failed to update team member")?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.repo.delete(id).await.context("Failed to delete team member")? {
            return Err(ServiceError::NotFound("Team member"));
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, ServiceError> {
        Ok(self.repo.count().await.context("Failed to count team members")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxTeamRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> TeamService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        TeamService::new(SqlxTeamRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_create_requires_name_and_category() {
        let service = setup().await;
        assert!(service
            .create(CreateTeamMemberInput::new("", "Основной состав"))
            .await
            .is_err());
        assert!(service
            .create(CreateTeamMemberInput::new("Иванов Иван", " "))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_update_moves_member_between_groups() {
        let service = setup().await;
        let mut input = CreateTeamMemberInput::new("Петров Пётр", "Основной состав");
        input.discipline = Some("Продуктовое программирование".to_string());
        input.city = Some("Чебоксары".to_string());
        let created = service.create(input).await.unwrap();

        let update: UpdateTeamMemberInput = serde_json::from_str(
            r#"{"category":"Юниорский состав","discipline":null}"#,
        )
        .unwrap();
        let updated = service.update(created.id, update).await.unwrap();

        assert_eq!(updated.category, "Юниорский состав");
        assert_eq!(updated.discipline, None);
        assert_eq!(updated.city.as_deref(), Some("Чебоксары"));
        assert_eq!(updated.group_key(), "Юниорский состав|");
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let service = setup().await;
        let a = service
            .create(CreateTeamMemberInput::new("А", "Основной состав"))
            .await
            .unwrap();
        service
            .create(CreateTeamMemberInput::new("Б", "Основной состав"))
            .await
            .unwrap();
        assert_eq!(service.count().await.unwrap(), 2);

        service.delete(a.id).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 1);
        assert!(matches!(
            service.delete(a.id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
