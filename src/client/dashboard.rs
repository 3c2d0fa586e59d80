//! Admin dashboard counters

use serde::Serialize;

use super::api::ApiClient;
use super::ClientError;

/// Shown where no count is available
pub const NO_COUNT: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub news: usize,
    pub events: usize,
    pub team: usize,
    pub leadership: usize,
    pub messages: usize,
    pub unread_messages: usize,
    /// Not counted on the dashboard
    pub documents: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
    pub href: &'static str,
}

impl DashboardStats {
    /// Fetch every collection at once; one failure fails the dashboard
    pub async fn load(client: &ApiClient) -> Result<Self, ClientError> {
        let (news_api, events_api, team_api, leadership_api, contact_api) = (
            client.news(),
            client.events(),
            client.team(),
            client.leadership(),
            client.contact(),
        );
        let (news, events, team, leadership, messages) = futures::try_join!(
            news_api.list(true),
            events_api.list(true),
            team_api.list(true),
            leadership_api.list(true),
            contact_api.list(false),
        )?;

        Ok(Self {
            news: news.len(),
            events: events.len(),
            team: team.len(),
            leadership: leadership.len(),
            unread_messages: messages.iter().filter(|m| !m.is_read).count(),
            messages: messages.len(),
            documents: None,
        })
    }

    pub fn cards(&self) -> Vec<StatCard> {
        let documents = self
            .documents
            .map(|count| count.to_string())
            .unwrap_or_else(|| NO_COUNT.to_string());

        vec![
            StatCard {
                label: "Новости",
                value: self.news.to_string(),
                href: "/admin/news",
            },
            StatCard {
                label: "События",
                value: self.events.to_string(),
                href: "/admin/events",
            },
            StatCard {
                label: "Команда",
                value: self.team.to_string(),
                href: "/admin/team",
            },
            StatCard {
                label: "Руководство",
                value: self.leadership.to_string(),
                href: "/admin/leadership",
            },
            StatCard {
                label: "Документы",
                value: documents,
                href: "/admin/documents",
            },
            StatCard {
                label: "Сообщения",
                value: format!("{} ({} новых)", self.messages, self.unread_messages),
                href: "/admin/messages",
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{admin_client, spawn_server};
    use crate::models::{CreateContactInput, CreateNewsInput};

    #[tokio::test]
    async fn test_load_counts_hidden_rows_and_unread_messages() {
        let server = spawn_server().await;
        let client = admin_client(&server).await;

        let mut hidden = CreateNewsInput::new("Черновик", "Текст новости");
        hidden.is_visible = false;
        client.news().create(&hidden).await.unwrap();
        client
            .news()
            .create(&CreateNewsInput::new("Анонс", "Текст анонса"))
            .await
            .unwrap();
        let message = client
            .contact()
            .submit(&CreateContactInput {
                name: "Ольга".to_string(),
                email: "olga@example.org".to_string(),
                subject: None,
                message: "Вопрос о регистрации".to_string(),
            })
            .await
            .unwrap();
        client
            .contact()
            .submit(&CreateContactInput {
                name: "Олег".to_string(),
                email: "oleg@example.org".to_string(),
                subject: None,
                message: "Вопрос о сборах".to_string(),
            })
            .await
            .unwrap();
        client.contact().mark_read(message.id).await.unwrap();

        let stats = DashboardStats::load(&client).await.unwrap();
        assert_eq!(stats.news, 2);
        assert_eq!(stats.events, 0);
        assert_eq!(stats.messages, 2);
        assert_eq!(stats.unread_messages, 1);
        assert_eq!(stats.documents, None);
    }

    #[test]
    fn test_documents_card_shows_placeholder() {
        let stats = DashboardStats {
            news: 3,
            events: 1,
            team: 5,
            leadership: 6,
            messages: 2,
            unread_messages: 1,
            documents: None,
        };
        let cards = stats.cards();
        assert_eq!(cards.len(), 6);
        let documents = cards.iter().find(|c| c.label == "Документы").unwrap();
        assert_eq!(documents.value, NO_COUNT);
        assert_eq!(cards[5].value, "2 (1 новых)");
    }
}
