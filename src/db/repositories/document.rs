//! Document repository
//!
//! Database operations for document categories and the documents filed
//! under them.
//!
//! This module provides:
//! - `DocumentRepository` trait defining the interface for document data access
//! - `SqlxDocumentRepository` implementing the trait for SQLite
//! - `build_category_tree` assembling flat rows into the category tree

use crate::db::DynDatabasePool;
use crate::models::{
    CreateCategoryInput, CreateDocumentInput, Document, DocumentCategory,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

/// Document repository trait
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Create a new category
    async fn create_category(&self, input: &CreateCategoryInput) -> Result<DocumentCategory>;

    /// Get a category row by ID (without children or documents)
    async fn get_category(&self, id: i64) -> Result<Option<DocumentCategory>>;

    /// List all categories as flat rows ordered by `order`
    async fn list_categories(&self) -> Result<Vec<DocumentCategory>>;

    /// All root categories with their subtrees and documents materialized
    async fn category_tree(&self, include_hidden: bool) -> Result<Vec<DocumentCategory>>;

    /// Persist the name, parent and order of a category
    async fn update_category(&self, category: &DocumentCategory) -> Result<DocumentCategory>;

    /// Delete a category row
    async fn delete_category(&self, id: i64) -> Result<bool>;

    /// Number of direct child categories
    async fn count_children(&self, id: i64) -> Result<i64>;

    /// Number of documents filed directly under a category
    async fn count_documents_in(&self, category_id: i64) -> Result<i64>;

    /// Create a document record
    async fn create_document(&self, input: &CreateDocumentInput) -> Result<Document>;

    /// Get document by ID
    async fn get_document(&self, id: i64) -> Result<Option<Document>>;

    /// List documents, optionally restricted to one category
    async fn list_documents(
        &self,
        category_id: Option<i64>,
        include_hidden: bool,
    ) -> Result<Vec<Document>>;

    /// Delete a document record
    async fn delete_document(&self, id: i64) -> Result<bool>;
}

/// SQLx-based document repository implementation
pub struct SqlxDocumentRepository {
    pool: DynDatabasePool,
}

impl SqlxDocumentRepository {
    /// Create a new SQLx document repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn DocumentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl DocumentRepository for SqlxDocumentRepository {
    async fn create_category(&self, input: &CreateCategoryInput) -> Result<DocumentCategory> {
        create_category_sqlite(self.pool.sqlite(), input).await
    }

    async fn get_category(&self, id: i64) -> Result<Option<DocumentCategory>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, parent_id, sort_order, created_at
            FROM document_categories
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.sqlite())
        .await
        .context("Failed to get category by ID")?;

        Ok(row.as_ref().map(row_to_category_sqlite))
    }

    async fn list_categories(&self) -> Result<Vec<DocumentCategory>> {
        list_categories_sqlite(self.pool.sqlite()).await
    }

    async fn category_tree(&self, include_hidden: bool) -> Result<Vec<DocumentCategory>> {
        // Load everything once and assemble in the application layer
        let categories = self.list_categories().await?;
        let documents = self.list_documents(None, include_hidden).await?;
        Ok(build_category_tree(categories, documents))
    }

    async fn update_category(&self, category: &DocumentCategory) -> Result<DocumentCategory> {
        sqlx::query(
            r#"
            UPDATE document_categories
            SET name = ?, parent_id = ?, sort_order = ?
            WHERE id = ?
            "#,
        )
        .bind(&category.name)
        .bind(category.parent_id)
        .bind(category.order)
        .bind(category.id)
        .execute(self.pool.sqlite())
        .await
        .context("Failed to update category")?;

        Ok(category.clone())
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM document_categories WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete category")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_children(&self, id: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM document_categories WHERE parent_id = ?")
                .bind(id)
                .fetch_one(self.pool.sqlite())
                .await
                .context("Failed to count child categories")?;
        Ok(count)
    }

    async fn count_documents_in(&self, category_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE category_id = ?")
            .bind(category_id)
            .fetch_one(self.pool.sqlite())
            .await
            .context("Failed to count documents in category")?;
        Ok(count)
    }

    async fn create_document(&self, input: &CreateDocumentInput) -> Result<Document> {
        create_document_sqlite(self.pool.sqlite(), input).await
    }

    async fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_DOCUMENTS))
            .bind(id)
            .fetch_optional(self.pool.sqlite())
            .await
            .context("Failed to get document by ID")?;
        Ok(row.as_ref().map(row_to_document_sqlite))
    }

    async fn list_documents(
        &self,
        category_id: Option<i64>,
        include_hidden: bool,
    ) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "{} WHERE (? IS NULL OR category_id = ?) AND (? OR is_visible = 1) \
             ORDER BY sort_order ASC, id ASC",
            SELECT_DOCUMENTS
        ))
        .bind(category_id)
        .bind(category_id)
        .bind(include_hidden)
        .fetch_all(self.pool.sqlite())
        .await
        .context("Failed to list documents")?;

        Ok(rows.iter().map(row_to_document_sqlite).collect())
    }

    async fn delete_document(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(self.pool.sqlite())
            .await
            .context("Failed to delete document")?;
        Ok(result.rows_affected() > 0)
    }
}

const SELECT_DOCUMENTS: &str = r#"
    SELECT id, title, filename, file_path, file_size, category_id, sort_order, is_visible, created_at
    FROM documents
"#;

async fn create_category_sqlite(
    pool: &SqlitePool,
    input: &CreateCategoryInput,
) -> Result<DocumentCategory> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO document_categories (name, parent_id, sort_order, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(input.parent_id)
    .bind(input.order)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    Ok(DocumentCategory {
        id: result.last_insert_rowid(),
        name: input.name.clone(),
        parent_id: input.parent_id,
        order: input.order,
        created_at: now,
        children: Vec::new(),
        documents: Vec::new(),
    })
}

async fn list_categories_sqlite(pool: &SqlitePool) -> Result<Vec<DocumentCategory>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, parent_id, sort_order, created_at
        FROM document_categories
        ORDER BY sort_order ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    Ok(rows.iter().map(row_to_category_sqlite).collect())
}

async fn create_document_sqlite(pool: &SqlitePool, input: &CreateDocumentInput) -> Result<Document> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO documents (title, filename, file_path, file_size, category_id, sort_order, is_visible, created_at)
        VALUES (?, ?, ?, ?, ?, ?, 1, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.filename)
    .bind(&input.file_path)
    .bind(input.file_size)
    .bind(input.category_id)
    .bind(input.order)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create document")?;

    Ok(Document {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        filename: input.filename.clone(),
        file_path: input.file_path.clone(),
        file_size: input.file_size,
        category_id: input.category_id,
        order: input.order,
        is_visible: true,
        created_at: now,
    })
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> DocumentCategory {
    DocumentCategory {
        id: row.get("id"),
        name: row.get("name"),
        parent_id: row.get("parent_id"),
        order: row.get("sort_order"),
        created_at: row.get("created_at"),
        children: Vec::new(),
        documents: Vec::new(),
    }
}

fn row_to_document_sqlite(row: &sqlx::sqlite::SqliteRow) -> Document {
    Document {
        id: row.get("id"),
        title: row.get("title"),
        filename: row.get("filename"),
        file_path: row.get("file_path"),
        file_size: row.get("file_size"),
        category_id: row.get("category_id"),
        order: row.get("sort_order"),
        is_visible: row.get("is_visible"),
        created_at: row.get("created_at"),
    }
}

/// Assemble flat category and document rows into root trees.
///
/// Input order is kept among siblings. Categories whose parent is missing
/// are promoted to roots.
pub fn build_category_tree(
    categories: Vec<DocumentCategory>,
    documents: Vec<Document>,
) -> Vec<DocumentCategory> {
    let known: std::collections::HashSet<i64> = categories.iter().map(|c| c.id).collect();

    let mut docs_by_category: HashMap<i64, Vec<Document>> = HashMap::new();
    for doc in documents {
        docs_by_category.entry(doc.category_id).or_default().push(doc);
    }

    let mut children_by_parent: HashMap<Option<i64>, Vec<DocumentCategory>> = HashMap::new();
    for mut category in categories {
        category.documents = docs_by_category.remove(&category.id).unwrap_or_default();
        let parent = category.parent_id.filter(|p| known.contains(p) && *p != category.id);
        children_by_parent.entry(parent).or_default().push(category);
    }

    let roots = children_by_parent.remove(&None).unwrap_or_default();
    roots
        .into_iter()
        .map(|root| attach_children(root, &mut children_by_parent))
        .collect()
}

fn attach_children(
    mut node: DocumentCategory,
    children_by_parent: &mut HashMap<Option<i64>, Vec<DocumentCategory>>,
) -> DocumentCategory {
    let children = children_by_parent.remove(&Some(node.id)).unwrap_or_default();
    node.children = children
        .into_iter()
        .map(|child| attach_children(child, children_by_parent))
        .collect();
    node
}

/// Find a node anywhere in a forest
pub fn find_in_tree(roots: &[DocumentCategory], id: i64) -> Option<&DocumentCategory> {
    roots.iter().find_map(|node| {
        if node.id == id {
            Some(node)
        } else {
            find_in_tree(&node.children, id)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> Arc<dyn DocumentRepository> {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        SqlxDocumentRepository::boxed(pool)
    }

    fn document_input(title: &str, category_id: i64) -> CreateDocumentInput {
        CreateDocumentInput {
            title: title.to_string(),
            filename: format!("{}.pdf", title),
            file_path: format!("uploads/{}.pdf", title),
            file_size: Some(2048),
            category_id,
            order: 0,
        }
    }

    #[tokio::test]
    async fn test_category_tree_materializes_children_and_documents() {
        let repo = setup().await;
        let root = repo
            .create_category(&CreateCategoryInput::new("Уставные"))
            .await
            .unwrap();
        let child = repo
            .create_category(&CreateCategoryInput::new("Протоколы").with_parent(root.id))
            .await
            .unwrap();
        repo.create_document(&document_input("charter", root.id)).await.unwrap();
        repo.create_document(&document_input("minutes", child.id)).await.unwrap();

        let tree = repo.category_tree(false).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].documents.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].documents[0].title, "minutes");
        assert_eq!(tree[0].document_count(), 2);

        let found = find_in_tree(&tree, child.id).unwrap();
        assert_eq!(found.name, "Протоколы");
    }

    #[tokio::test]
    async fn test_counts_used_by_delete_guard() {
        let repo = setup().await;
        let root = repo
            .create_category(&CreateCategoryInput::new("root"))
            .await
            .unwrap();
        repo.create_category(&CreateCategoryInput::new("child").with_parent(root.id))
            .await
            .unwrap();
        repo.create_document(&document_input("doc", root.id)).await.unwrap();

        assert_eq!(repo.count_children(root.id).await.unwrap(), 1);
        assert_eq!(repo.count_documents_in(root.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_documents_by_category() {
        let repo = setup().await;
        let a = repo.create_category(&CreateCategoryInput::new("a")).await.unwrap();
        let b = repo.create_category(&CreateCategoryInput::new("b")).await.unwrap();
        repo.create_document(&document_input("one", a.id)).await.unwrap();
        repo.create_document(&document_input("two", b.id)).await.unwrap();

        assert_eq!(repo.list_documents(None, false).await.unwrap().len(), 2);
        let only_a = repo.list_documents(Some(a.id), false).await.unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].title, "one");
    }

    #[test]
    fn test_build_tree_promotes_orphans() {
        let now = Utc::now();
        let orphan = DocumentCategory {
            id: 5,
            name: "orphan".to_string(),
            parent_id: Some(99),
            order: 0,
            created_at: now,
            children: vec![],
            documents: vec![],
        };
        let tree = build_category_tree(vec![orphan], vec![]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 5);
    }
}
