//! Leadership (governing bodies and officers) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{default_true, double_option};

/// One node of the leadership org chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadershipMember {
    pub id: i64,
    pub full_name: String,
    pub position: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    /// Display sort key
    pub order: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLeadershipInput {
    pub full_name: String,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl CreateLeadershipInput {
    pub fn new(full_name: impl Into<String>, position: impl Into<String>, order: i32) -> Self {
        Self {
            full_name: full_name.into(),
            position: position.into(),
            description: None,
            photo_url: None,
            order,
            is_visible: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLeadershipInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}
