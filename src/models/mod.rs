//! Data models
//!
//! Entities as stored by the repositories and exchanged over the REST API,
//! plus the create/update inputs used by both the backend handlers and the
//! admin client.

mod admin;
mod contact;
mod document;
mod event;
mod info;
mod leadership;
mod news;
mod session;
mod team;

pub use admin::{Admin, AdminProfile};
pub use contact::{ContactMessage, CreateContactInput};
pub use document::{
    CreateCategoryInput, CreateDocumentInput, Document, DocumentCategory, UpdateCategoryInput,
};
pub use event::{CreateEventInput, Event, EventFilter, UpdateEventInput};
pub use info::{Discipline, FederationContacts, FederationInfo, HistoryEntry};
pub use leadership::{CreateLeadershipInput, LeadershipMember, UpdateLeadershipInput};
pub use news::{CreateNewsInput, NewsItem, UpdateNewsInput};
pub use session::Session;
pub use team::{CreateTeamMemberInput, TeamFilter, TeamMember, UpdateTeamMemberInput};

use serde::{Deserialize, Deserializer, Serialize};

/// Offset/limit window used by the list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    pub skip: i64,
    pub limit: i64,
}

impl ListParams {
    /// Largest page any list endpoint hands out
    pub const MAX_LIMIT: i64 = 1000;

    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip: skip.max(0),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }
}

/// Deserialize a field that distinguishes "absent" from an explicit `null`.
///
/// Used with `#[serde(default)]`: a missing key stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(v))`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_clamps() {
        let params = ListParams::new(-5, 0);
        assert_eq!(params.skip, 0);
        assert_eq!(params.limit, 1);

        let params = ListParams::new(10, 50_000);
        assert_eq!(params.limit, ListParams::MAX_LIMIT);
    }

    #[test]
    fn test_update_input_distinguishes_null_from_absent() {
        let absent: UpdateNewsInput = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(absent.image_url, None);

        let cleared: UpdateNewsInput = serde_json::from_str(r#"{"image_url":null}"#).unwrap();
        assert_eq!(cleared.image_url, Some(None));

        let set: UpdateNewsInput = serde_json::from_str(r#"{"image_url":"a.png"}"#).unwrap();
        assert_eq!(set.image_url, Some(Some("a.png".to_string())));
    }

    #[test]
    fn test_update_input_serializes_only_present_fields() {
        let input = UpdateNewsInput {
            is_visible: Some(false),
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({ "is_visible": false }));
    }
}
