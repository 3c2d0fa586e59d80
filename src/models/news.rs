//! News model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{default_true, double_option};

/// A news post, either written in the back-office or imported from Telegram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    /// Derived from `image_url`; empty when there is no image
    #[serde(default)]
    pub images: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub telegram_id: Option<String>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

impl NewsItem {
    /// Content split into display paragraphs on line breaks, skipping blank lines
    pub fn paragraphs(&self) -> Vec<&str> {
        self.content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Input for creating a news post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNewsInput {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Defaults to the creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    /// Set only by the Telegram importer
    #[serde(skip)]
    pub telegram_id: Option<String>,
}

impl CreateNewsInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image_url: None,
            published_at: None,
            is_visible: true,
            telegram_id: None,
        }
    }
}

/// Partial update of a news post; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNewsInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}
