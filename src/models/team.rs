//! Team roster model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{default_true, double_option};

/// A member of the federation's competitive team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub full_name: String,
    pub category: String,
    pub discipline: Option<String>,
    pub position: Option<String>,
    pub city: Option<String>,
    pub photo_url: Option<String>,
    pub order: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

impl TeamMember {
    /// Roster grouping key, `category|discipline`
    pub fn group_key(&self) -> String {
        format!(
            "{}|{}",
            self.category,
            self.discipline.as_deref().unwrap_or_default()
        )
    }
}

/// Filters for listing team members
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamFilter {
    pub category: Option<String>,
    pub discipline: Option<String>,
    pub include_hidden: bool,
}

/// Input for adding a team member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamMemberInput {
    pub full_name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discipline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl CreateTeamMemberInput {
    pub fn new(full_name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            category: category.into(),
            discipline: None,
            position: None,
            city: None,
            photo_url: None,
            order: 0,
            is_visible: true,
        }
    }
}

/// Partial update of a team member
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeamMemberInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub discipline: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub position: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}
