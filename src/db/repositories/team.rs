//! Team member repository

use crate::db::DynDatabasePool;
use crate::models::{CreateTeamMemberInput, TeamFilter, TeamMember};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Team member repository trait
#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn create(&self, input: &CreateTeamMemberInput) -> Result<TeamMember>;

    async fn get_by_id(&self, id: i64) -> Result<Option<TeamMember>>;

    /// List members ordered by `order`
    async fn list(&self, filter: &TeamFilter) -> Result<Vec<TeamMember>>;

    async fn update(&self, member: &TeamMember) -> Result<TeamMember>;

    async fn delete(&self, id: i64) -> Result<bool>;

    async fn count(&self) -> Result<i64>;
}

/// SQLx-based team repository implementation
pub struct SqlxTeamRepository {
    pool: DynDatabasePool,
}

impl SqlxTeamRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TeamRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TeamRepository for SqlxTeamRepository {
    async fn create(&self, input: &CreateTeamMemberInput) -> Result<TeamMember> {
        create_member_sqlite(self.pool.sqlite(), input).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<TeamMember>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_MEMBERS))
            .bind(id)
            .fetch_optional(self.pool.sqlite())
            .await
            .context("Failed to get team member by ID")?;
        Ok(row.as_ref().map(row_to_member_sqlite))
    }

    async fn list(&self, filter: &TeamFilter) -> Result<Vec<TeamMember>> {
        let rows = sqlx::query(&format!(
            "{} WHERE (? OR is_visible = 1) \
             AND (? IS NULL OR category = ?) \
             AND (? IS NULL OR discipline = ?) \
             ORDER BY sort_order ASC, id ASC",
            SELECT_MEMBERS
        ))
        .bind(filter.include_hidden)
        .bind(&filter.category)
        .bind(&filter.category)
        .bind(&filter.discipline)
        .bind(&filter.discipline)
        .fetch_all(self.pool.sqlite())
        .await
        .context("Failed to list team members")?;

        Ok(rows.iter().map(row_to_member_sqlite).collect())
    }

    async fn update(&self, member: &TeamMember) -> Result<TeamMember> {
        update_member_sqlite(self.pool.sqlite(), member).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM team_members WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete team member")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM team_members")
            .fetch_one(self.pool.sqlite())
            .await
            .context("Failed to count team members")?;
        Ok(count)
    }
}

const SELECT_MEMBERS: &str = r#"
    SELECT id, full_name, category, discipline, position, city, photo_url, sort_order, is_visible, created_at
    FROM team_members
"#;

async fn create_member_sqlite(
    pool: &SqlitePool,
    input: &CreateTeamMemberInput,
) -> Result<TeamMember> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO team_members (full_name, category, discipline, position, city, photo_url, sort_order, is_visible, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.full_name)
    .bind(&input.category)
    .bind(&input.discipline)
    .bind(&input.position)
    .bind(&input.city)
    .bind(&input.photo_url)
    .bind(input.order)
    .bind(input.is_visible)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create team member")?;

    Ok(TeamMember {
        id: result.last_insert_rowid(),
        full_name: input.full_name.clone(),
        category: input.category.clone(),
        discipline: input.discipline.clone(),
        position: input.position.clone(),
        city: input.city.clone(),
        photo_url: input.photo_url.clone(),
        order: input.order,
        is_visible: input.is_visible,
        created_at: now,
    })
}

async fn update_member_sqlite(pool: &SqlitePool, member: &TeamMember) -> Result<TeamMember> {
    sqlx::query(
        r#"
        UPDATE team_members
        SET full_name = ?, category = ?, discipline = ?, position = ?, city = ?,
            photo_url = ?, sort_order = ?, is_visible = ?
        WHERE id = ?
        "#,
    )
    .bind(&member.full_name)
    .bind(&member.category)
    .bind(&member.discipline)
    .bind(&member.position)
    .bind(&member.city)
    .bind(&member.photo_url)
    .bind(member.order)
    .bind(member.is_visible)
    .bind(member.id)
    .execute(pool)
    .await
    .context("Failed to update team member")?;

    Ok(member.clone())
}

fn row_to_member_sqlite(row: &sqlx::sqlite::SqliteRow) -> TeamMember {
    TeamMember {
        id: row.get("id"),
        full_name: row.get("full_name"),
        category: row.get("category"),
        discipline: row.get("discipline"),
        position: row.get("position"),
        city: row.get("city"),
        photo_url: row.get("photo_url"),
        order: row.get("sort_order"),
        is_visible: row.get("is_visible"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> Arc<dyn TeamRepository> {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        SqlxTeamRepository::boxed(pool)
    }

    fn member(name: &str, category: &str, discipline: Option<&str>, order: i32) -> CreateTeamMemberInput {
        let mut input = CreateTeamMemberInput::new(name, category);
        input.discipline = discipline.map(str::to_string);
        input.order = order;
        input
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let repo = setup().await;
        repo.create(&member("B", "Основной состав", Some("Продуктовое"), 2)).await.unwrap();
        repo.create(&member("A", "Основной состав", Some("Продуктовое"), 1)).await.unwrap();
        repo.create(&member("C", "Резерв", Some("Алгоритмическое"), 0)).await.unwrap();

        let all = repo.list(&TeamFilter::default()).await.unwrap();
        let names: Vec<_> = all.iter().map(|m| m.full_name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);

        let main = repo
            .list(&TeamFilter {
                category: Some("Основной состав".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(main.len(), 2);

        let algo = repo
            .list(&TeamFilter {
                discipline: Some("Алгоритмическое".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(algo.len(), 1);
        assert_eq!(algo[0].full_name, "C");
    }

    #[tokio::test]
    async fn test_hidden_members_only_with_include_hidden() {
        let repo = setup().await;
        let mut hidden = member("H", "Основной состав", None, 0);
        hidden.is_visible = false;
        repo.create(&hidden).await.unwrap();

        assert!(repo.list(&TeamFilter::default()).await.unwrap().is_empty());
        let admin_view = TeamFilter {
            include_hidden: true,
            ..Default::default()
        };
        assert_eq!(repo.list(&admin_view).await.unwrap().len(), 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
