//! First-start content
//!
//! Each table is seeded only while it is empty, so admins can freely edit
//! or remove the seeded rows afterwards.

use crate::db::repositories::{
    DocumentRepository, LeadershipRepository, SqlxDocumentRepository, SqlxLeadershipRepository,
    SqlxTeamRepository, TeamRepository,
};
use crate::db::DynDatabasePool;
use crate::models::{CreateCategoryInput, CreateLeadershipInput, CreateTeamMemberInput};
use anyhow::{Context, Result};

const MAIN_SQUAD: &str = "Основной состав";
const PRODUCT_DISCIPLINE: &str = "Продуктовое программирование";

/// Seed leadership, team and document categories where they are empty
pub async fn seed_initial_data(pool: &DynDatabasePool) -> Result<()> {
    let leadership = SqlxLeadershipRepository::new(pool.clone());
    let team = SqlxTeamRepository::new(pool.clone());
    let documents = SqlxDocumentRepository::new(pool.clone());

    if leadership.count().await? == 0 {
        for input in leadership_seed() {
            leadership
                .create(&input)
                .await
                .context("Failed to seed leadership")?;
        }
        tracing::info!("Seeded leadership");
    }

    if team.count().await? == 0 {
        for input in team_seed() {
            team.create(&input).await.context("Failed to seed team")?;
        }
        tracing::info!("Seeded team roster");
    }

    if documents.list_categories().await?.is_empty() {
        for (order, name) in [(1, "Учредительные документы"), (2, "Нормативные документы")] {
            let mut input = CreateCategoryInput::new(name);
            input.order = order;
            documents
                .create_category(&input)
                .await
                .context("Failed to seed document categories")?;
        }
        tracing::info!("Seeded document categories");
    }

    Ok(())
}

fn leadership_seed() -> Vec<CreateLeadershipInput> {
    let board = "Член Федерации и Правления";
    vec![
        CreateLeadershipInput::new("Общее собрание членов", "Высший орган управления", 1)
            .with_description("Высший орган управления РФСОО «ФСП по Чувашской Республике»"),
        CreateLeadershipInput::new(
            "Набиев Александр Эльдарович",
            "Президент РФСОО «ФСП по Чувашской Республике»",
            2,
        )
        .with_description(
            "Руководит деятельностью Федерации спортивного программирования по Чувашской Республике",
        ),
        CreateLeadershipInput::new("Спиридонов Михаил Юрьевич", "Первый Вице-президент", 3)
            .with_description("Заместитель президента федерации"),
        CreateLeadershipInput::new("Иванова Анна Алексеевна", board, 4),
        CreateLeadershipInput::new("Константинов Михаил Романович", board, 5),
        CreateLeadershipInput::new("Алексеев Юрий Витальевич", board, 6),
    ]
}

fn team_seed() -> Vec<CreateTeamMemberInput> {
    [
        ("Иванов Константин Владиславович", "Новочебоксарск"),
        ("Антонов Юрий Владимирович", "Чебоксары"),
        ("Христофоров Иван Александрович", "Чебоксары"),
        ("Фадеев Тимур Александрович", "Чебоксары"),
        ("Лапин Аллен Джеймсович", "Новочебоксарск"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, city))| {
        let mut input = CreateTeamMemberInput::new(*name, MAIN_SQUAD);
        input.city = Some(city.to_string());
        input.discipline = Some(PRODUCT_DISCIPLINE.to_string());
        input.position = Some("Юниор".to_string());
        input.order = i as i32 + 1;
        input
    })
    .collect()
}
