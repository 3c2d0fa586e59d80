//! Document and document category models
//!
//! Categories form a tree. A category owns its child categories and the
//! documents filed directly under it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::double_option;

/// A downloadable document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    /// Original upload file name
    pub filename: String,
    /// Storage path on the server; never sent to clients
    #[serde(skip_serializing, default)]
    pub file_path: String,
    pub file_size: Option<i64>,
    pub category_id: i64,
    pub order: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Public download link
    pub fn download_url(&self) -> String {
        format!("/api/documents/{}/download", self.id)
    }
}

/// A node of the document category tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCategory {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub children: Vec<DocumentCategory>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl DocumentCategory {
    /// Check if this is a root category (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the node has anything beneath it
    pub fn has_contents(&self) -> bool {
        !self.children.is_empty() || !self.documents.is_empty()
    }

    /// Total documents in this subtree
    pub fn document_count(&self) -> usize {
        self.documents.len() + self.children.iter().map(|c| c.document_count()).sum::<usize>()
    }

    /// IDs of all categories beneath this one (not including self)
    pub fn descendant_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        for child in &self.children {
            ids.push(child.id);
            ids.extend(child.descendant_ids());
        }
        ids
    }
}

/// Input for creating a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub order: i32,
}

impl CreateCategoryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_id: None,
            order: 0,
        }
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Partial update of a category; `parent_id: null` moves it to the root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// Metadata for a stored upload
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    pub title: String,
    pub filename: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub category_id: i64,
    pub order: i32,
}
