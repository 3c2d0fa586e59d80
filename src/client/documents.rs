//! Documents admin page
//!
//! Categories and documents are edited in place on the tree. Deleting a
//! category that still holds documents is refused by the server; the refusal
//! surfaces as a blocking alert.

use super::api::{ApiClient, UploadFile};
use super::editor::ListState;
use super::scope::{RequestScope, ScopeHandle};
use super::ClientError;
use crate::models::{CreateCategoryInput, DocumentCategory};
use crate::views::{render_rows, ExpandState, TreeRow};

/// What a pending confirmation would delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingDelete {
    Category(i64),
    Document(i64),
}

/// Upload form; title, category and file are required
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub title: String,
    pub category_id: Option<i64>,
    pub file: Option<UploadFile>,
}

pub struct DocumentsAdmin {
    client: ApiClient,
    tree: ListState<DocumentCategory>,
    expand: ExpandState,
    pending_delete: Option<PendingDelete>,
    alert: Option<String>,
    scope: RequestScope,
}

impl DocumentsAdmin {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            tree: ListState::Loading,
            expand: ExpandState::new(),
            pending_delete: None,
            alert: None,
            scope: RequestScope::new(),
        }
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn categories(&self) -> &[DocumentCategory] {
        match &self.tree {
            ListState::Loaded(roots) => roots,
            ListState::Loading => &[],
        }
    }

    /// Tree rows as currently expanded
    pub fn rows(&self) -> Vec<TreeRow> {
        render_rows(self.categories(), &self.expand)
    }

    pub fn toggle(&mut self, category_id: i64) {
        self.expand.toggle(category_id);
    }

    /// Blocking alert text, if any
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Fetch the whole tree; a cancelled load leaves the page as it was
    pub async fn load(&mut self) -> Result<(), ClientError> {
        if self.scope.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        self.tree = ListState::Loading;
        let result = self
            .scope
            .run(self.client.documents().categories(true))
            .await;
        match result {
            Ok(roots) => {
                self.tree = ListState::Loaded(roots);
                Ok(())
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                tracing::error!("Failed to load document categories: {}", e);
                self.tree = ListState::Loaded(Vec::new());
                Err(e)
            }
        }
    }

    async fn reload(&mut self) {
        let _ = self.load().await;
    }

    pub async fn create_category(
        &mut self,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<(), ClientError> {
        if name.trim().is_empty() {
            return Err(ClientError::Validation(
                "Введите название категории".to_string(),
            ));
        }
        let mut input = CreateCategoryInput::new(name.trim());
        input.parent_id = parent_id;

        let result = self
            .scope
            .run(self.client.documents().create_category(&input))
            .await;
        if let Err(e) = &result {
            tracing::error!("Failed to create category: {}", e);
        }
        self.reload().await;
        result.map(|_| ())
    }

    pub async fn upload(&mut self, form: UploadForm) -> Result<(), ClientError> {
        let (Some(category_id), Some(file)) = (form.category_id, form.file) else {
            return Err(ClientError::Validation(
                "Выберите категорию и файл".to_string(),
            ));
        };
        if form.title.trim().is_empty() {
            return Err(ClientError::Validation(
                "Введите название документа".to_string(),
            ));
        }

        let result = self
            .scope
            .run(
                self.client
                    .documents()
                    .upload(form.title.trim(), category_id, file),
            )
            .await;
        if let Err(e) = &result {
            tracing::error!("Failed to upload document: {}", e);
        }
        self.reload().await;
        result.map(|_| ())
    }

    pub fn request_delete(&mut self, target: PendingDelete) {
        self.pending_delete = Some(target);
    }

    pub fn pending_delete(&self) -> Option<PendingDelete> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Run the confirmed delete; a refused category delete raises the alert
    pub async fn confirm_delete(&mut self) -> Result<(), ClientError> {
        let Some(target) = self.pending_delete.take() else {
            return Ok(());
        };

        let documents = self.client.documents();
        let result = match target {
            PendingDelete::Category(id) => self.scope.run(documents.delete_category(id)).await,
            PendingDelete::Document(id) => self.scope.run(documents.delete(id)).await,
        };

        match &result {
            Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
            Err(e) => {
                tracing::error!("Failed to delete {:?}: {}", target, e);
                if matches!(target, PendingDelete::Category(_)) {
                    self.alert = Some(e.alert_message());
                }
            }
            Ok(_) => {}
        }
        self.reload().await;
        result.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{admin_client, spawn_server};

    fn pdf(name: &str) -> UploadFile {
        UploadFile {
            filename: name.to_string(),
            bytes: vec![b'x'; 2048],
        }
    }

    #[tokio::test]
    async fn test_category_with_documents_cannot_be_deleted() {
        let server = spawn_server().await;
        let client = admin_client(&server).await;
        let mut page = DocumentsAdmin::new(client);
        page.load().await.unwrap();
        assert!(page.categories().is_empty());

        assert!(page.create_category("  ", None).await.is_err());
        page.create_category("Учредительные документы", None).await.unwrap();
        let root = page.categories()[0].id;
        page.create_category("Протоколы", Some(root)).await.unwrap();
        let child = page.categories()[0].children[0].id;

        let missing_file = UploadForm {
            title: "Устав".to_string(),
            category_id: Some(child),
            file: None,
        };
        assert!(matches!(
            page.upload(missing_file).await,
            Err(ClientError::Validation(_))
        ));

        page.upload(UploadForm {
            title: "Протокол №1".to_string(),
            category_id: Some(child),
            file: Some(pdf("protocol1.pdf")),
        })
        .await
        .unwrap();

        let rows = page.rows();
        assert_eq!(rows.len(), 3);
        match &rows[2] {
            TreeRow::Document { title, size, .. } => {
                assert_eq!(title, "Протокол №1");
                assert_eq!(size, "2.0 КБ");
            }
            other => panic!("unexpected row {:?}", other),
        }

        let before = page.categories().to_vec();
        page.request_delete(PendingDelete::Category(child));
        let err = page.confirm_delete().await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            page.alert(),
            Some("Cannot delete category with documents or subcategories")
        );
        assert_eq!(page.categories(), before.as_slice());

        page.dismiss_alert();
        let document_id = page.categories()[0].children[0].documents[0].id;
        page.request_delete(PendingDelete::Document(document_id));
        page.confirm_delete().await.unwrap();
        page.request_delete(PendingDelete::Category(child));
        page.confirm_delete().await.unwrap();
        assert!(page.alert().is_none());
        assert!(page.categories()[0].children.is_empty());
    }

    #[tokio::test]
    async fn test_collapse_hides_documents() {
        let server = spawn_server().await;
        let client = admin_client(&server).await;
        let mut page = DocumentsAdmin::new(client);
        page.create_category("Нормативные документы", None).await.unwrap();
        let id = page.categories()[0].id;
        page.upload(UploadForm {
            title: "Регламент".to_string(),
            category_id: Some(id),
            file: Some(pdf("reglament.pdf")),
        })
        .await
        .unwrap();

        assert_eq!(page.rows().len(), 2);
        page.toggle(id);
        assert_eq!(page.rows().len(), 1);
    }
}
