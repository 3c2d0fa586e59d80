//! Document service
//!
//! - Category tree: create, re-parent (with cycle guard), delete only when empty
//! - Uploads stored under a generated name in the upload directory
//! - Downloads served with the original file name

use crate::db::repositories::document::find_in_tree;
use crate::db::repositories::DocumentRepository;
use crate::models::{
    CreateCategoryInput, CreateDocumentInput, Document, DocumentCategory, UpdateCategoryInput,
};
use crate::services::{merge, require_text, ServiceError};
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An uploaded file plus its form fields
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub title: String,
    /// Name of the file on the uploader's machine
    pub filename: String,
    pub category_id: i64,
    pub order: i32,
    pub bytes: Vec<u8>,
}

pub struct DocumentService {
    repo: Arc<dyn DocumentRepository>,
    upload_dir: PathBuf,
    max_file_size: u64,
}

impl DocumentService {
    pub fn new(repo: Arc<dyn DocumentRepository>, upload_dir: PathBuf, max_file_size: u64) -> Self {
        Self {
            repo,
            upload_dir,
            max_file_size,
        }
    }

    /// Root categories with their subtrees
    pub async fn category_tree(
        &self,
        include_hidden: bool,
    ) -> Result<Vec<DocumentCategory>, ServiceError> {
        Ok(self
            .repo
            .category_tree(include_hidden)
            .await
            .context("Failed to load category tree")?)
    }

    /// One category with its subtree
    pub async fn get_category(
        &self,
        id: i64,
        include_hidden: bool,
    ) -> Result<DocumentCategory, ServiceError> {
        let tree = self.category_tree(include_hidden).await?;
        find_in_tree(&tree, id)
            .cloned()
            .ok_or(ServiceError::NotFound("Category"))
    }

    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<DocumentCategory, ServiceError> {
        require_text("name", &input.name)?;
        if let Some(parent_id) = input.parent_id {
            self.ensure_category_exists(parent_id).await?;
        }
        Ok(self
            .repo
            .create_category(&input)
            .await
            .context("Failed to create category")?)
    }

    pub async fn update_category(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<DocumentCategory, ServiceError> {
        let mut category = self
            .repo
            .get_category(id)
            .await
            .context("Failed to get category")?
            .ok_or(ServiceError::NotFound("Category"))?;

        if let Some(name) = &input.name {
            require_text("name", name)?;
        }

        if let Some(Some(parent_id)) = input.parent_id {
            if parent_id == id {
                return Err(ServiceError::ValidationError(
                    "A category cannot be its own parent".to_string(),
                ));
            }
            self.ensure_category_exists(parent_id).await?;

            let tree = self.category_tree(true).await?;
            let descendants = find_in_tree(&tree, id)
                .map(|node| node.descendant_ids())
                .unwrap_or_default();
            if descendants.contains(&parent_id) {
                return Err(ServiceError::ValidationError(
                    "A category cannot be moved under its own descendant".to_string(),
                ));
            }
        }

        merge(&mut category.name, input.name);
        merge(&mut category.parent_id, input.parent_id);
        merge(&mut category.order, input.order);

        Ok(self
            .repo
            .update_category(&category)
            .await
            .context("Failed to update category")?)
    }

    /// Delete an empty category
    pub async fn delete_category(&self, id: i64) -> Result<(), ServiceError> {
        self.ensure_category_exists(id).await?;

        let documents = self
            .repo
            .count_documents_in(id)
            .await
            .context("Failed to count documents")?;
        let children = self
            .repo
            .count_children(id)
            .await
            .context("Failed to count subcategories")?;
        if documents > 0 || children > 0 {
            return Err(ServiceError::ValidationError(
                "Cannot delete category with documents or subcategories".to_string(),
            ));
        }

        self.repo
            .delete_category(id)
            .await
            .context("Failed to delete category")?;
        Ok(())
    }

    pub async fn list_documents(
        &self,
        category_id: Option<i64>,
        include_hidden: bool,
    ) -> Result<Vec<Document>, ServiceError> {
        Ok(self
            .repo
            .list_documents(category_id, include_hidden)
            .await
            .context("Failed to list documents")?)
    }

    pub async fn get_document(&self, id: i64) -> Result<Document, ServiceError> {
        self.repo
            .get_document(id)
            .await
            .context("Failed to get document")?
            .ok_or(ServiceError::NotFound("Document"))
    }

    /// Store an uploaded file and record it under its category
    pub async fn upload(&self, upload: StoredUpload) -> Result<Document, ServiceError> {
        require_text("title", &upload.title)?;
        if upload.filename.trim().is_empty() {
            return Err(ServiceError::ValidationError("File is required".to_string()));
        }
        if upload.bytes.len() as u64 > self.max_file_size {
            return Err(ServiceError::ValidationError(format!(
                "File exceeds the maximum size of {} bytes",
                self.max_file_size
            )));
        }
        self.ensure_category_exists(upload.category_id).await?;

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .with_context(|| format!("Failed to create upload directory {:?}", self.upload_dir))?;

        let stored_name = match Path::new(&upload.filename).extension() {
            Some(ext) => format!("{}.{}", uuid::Uuid::new_v4(), ext.to_string_lossy()),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let path = self.upload_dir.join(stored_name);

        tokio::fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("Failed to write upload to {:?}", path))?;

        let input = CreateDocumentInput {
            title: upload.title,
            filename: original_file_name(&upload.filename),
            file_path: path.to_string_lossy().to_string(),
            file_size: Some(upload.bytes.len() as i64),
            category_id: upload.category_id,
            order: upload.order,
        };

        let document = match self.repo.create_document(&input).await {
            Ok(document) => document,
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(e.context("Failed to record document").into());
            }
        };

        tracing::info!(
            "Stored document {} ({} bytes) in category {}",
            document.id,
            upload.bytes.len(),
            document.category_id
        );
        Ok(document)
    }

    /// Document metadata plus file contents
    pub async fn download(&self, id: i64) -> Result<(Document, Vec<u8>), ServiceError> {
        let document = self.get_document(id).await?;
        match tokio::fs::read(&document.file_path).await {
            Ok(bytes) => Ok((document, bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("File for document {} is missing: {}", id, document.file_path);
                Err(ServiceError::NotFound("File"))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to read {}", document.file_path))
                .into()),
        }
    }

    /// Delete a document record and its stored file
    pub async fn delete_document(&self, id: i64) -> Result<(), ServiceError> {
        let document = self.get_document(id).await?;

        if let Err(e) = tokio::fs::remove_file(&document.file_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove {}: {}", document.file_path, e);
            }
        }

        self.repo
            .delete_document(id)
            .await
            .context("Failed to delete document")?;
        Ok(())
    }

    async fn ensure_category_exists(&self, id: i64) -> Result<(), ServiceError> {
        self.repo
            .get_category(id)
            .await
            .context("Failed to get category")?
            .map(|_| ())
            .ok_or(ServiceError::NotFound("Category"))
    }
}

/// Strip any client-side directory components from an upload name
fn original_file_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(name)
        .to_string()
}
