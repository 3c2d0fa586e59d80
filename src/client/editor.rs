//! Per-entity CRUD editor
//!
//! One state machine serves the news, events, team and leadership pages:
//! the list (`Loading` then `Loaded`) and, independently, the edit modal
//! (`Closed`, or open for create or for one item). Every mutation is
//! followed by a full list re-fetch.

use chrono::Local;

use super::api::{ApiClient, Resource};
use super::scope::{RequestScope, ScopeHandle};
use super::ClientError;
use crate::models::{
    CreateEventInput, CreateLeadershipInput, CreateNewsInput, CreateTeamMemberInput, Event,
    LeadershipMember, NewsItem, TeamMember, UpdateEventInput, UpdateLeadershipInput,
    UpdateNewsInput, UpdateTeamMemberInput,
};

/// Generic message for a failed save; the modal stays open
pub const SAVE_FAILED: &str = "Ошибка при сохранении";

fn required(label: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("Поле «{}» обязательно", label));
    }
    Ok(())
}

fn min_len(label: &str, value: &str, min: usize) -> Result<(), String> {
    if value.trim().chars().count() < min {
        return Err(format!(
            "Поле «{}» должно содержать не менее {} символов",
            label, min
        ));
    }
    Ok(())
}

/// Form behaviour of an editable resource
pub trait Editable: Resource {
    /// Defaults for the create modal
    fn blank_form() -> Self::Create;

    /// The record's fields for the edit modal
    fn edit_form(&self) -> Self::Create;

    /// Update sent when an edit modal is submitted
    fn full_update(form: Self::Create) -> Self::Update;

    fn validate(form: &Self::Create) -> Result<(), String>;
}

impl Editable for NewsItem {
    fn blank_form() -> CreateNewsInput {
        CreateNewsInput::new("", "")
    }

    fn edit_form(&self) -> CreateNewsInput {
        CreateNewsInput {
            title: self.title.clone(),
            content: self.content.clone(),
            image_url: self.image_url.clone(),
            published_at: Some(self.published_at),
            is_visible: self.is_visible,
            telegram_id: None,
        }
    }

    fn full_update(form: CreateNewsInput) -> UpdateNewsInput {
        UpdateNewsInput {
            title: Some(form.title),
            content: Some(form.content),
            image_url: Some(form.image_url.filter(|url| !url.trim().is_empty())),
            published_at: form.published_at,
            is_visible: Some(form.is_visible),
        }
    }

    fn validate(form: &CreateNewsInput) -> Result<(), String> {
        required("Заголовок", &form.title)?;
        min_len("Заголовок", &form.title, 3)?;
        required("Текст", &form.content)
    }
}

impl Editable for Event {
    fn blank_form() -> CreateEventInput {
        CreateEventInput::new("", Local::now().date_naive())
    }

    fn edit_form(&self) -> CreateEventInput {
        CreateEventInput {
            title: self.title.clone(),
            event_date: self.event_date,
            description: self.description.clone(),
            event_time: self.event_time.clone(),
            location: self.location.clone(),
            event_type: self.event_type.clone(),
            is_visible: self.is_visible,
        }
    }

    fn full_update(form: CreateEventInput) -> UpdateEventInput {
        UpdateEventInput {
            title: Some(form.title),
            event_date: Some(form.event_date),
            description: Some(form.description),
            event_time: Some(form.event_time),
            location: Some(form.location),
            event_type: Some(form.event_type),
            is_visible: Some(form.is_visible),
        }
    }

    fn validate(form: &CreateEventInput) -> Result<(), String> {
        required("Название", &form.title)?;
        min_len("Название", &form.title, 3)
    }
}

impl Editable for TeamMember {
    fn blank_form() -> CreateTeamMemberInput {
        CreateTeamMemberInput::new("", "")
    }

    fn edit_form(&self) -> CreateTeamMemberInput {
        CreateTeamMemberInput {
            full_name: self.full_name.clone(),
            category: self.category.clone(),
            discipline: self.discipline.clone(),
            position: self.position.clone(),
            city: self.city.clone(),
            photo_url: self.photo_url.clone(),
            order: self.order,
            is_visible: self.is_visible,
        }
    }

    fn full_update(form: CreateTeamMemberInput) -> UpdateTeamMemberInput {
        UpdateTeamMemberInput {
            full_name: Some(form.full_name),
            category: Some(form.category),
            discipline: Some(form.discipline),
            position: Some(form.position),
            city: Some(form.city),
            photo_url: Some(form.photo_url),
            order: Some(form.order),
            is_visible: Some(form.is_visible),
        }
    }

    fn validate(form: &CreateTeamMemberInput) -> Result<(), String> {
        required("ФИО", &form.full_name)?;
        min_len("ФИО", &form.full_name, 2)?;
        required("Категория", &form.category)
    }
}

impl Editable for LeadershipMember {
    fn blank_form() -> CreateLeadershipInput {
        CreateLeadershipInput::new("", "", 0)
    }

    fn edit_form(&self) -> CreateLeadershipInput {
        CreateLeadershipInput {
            full_name: self.full_name.clone(),
            position: self.position.clone(),
            description: self.description.clone(),
            photo_url: self.photo_url.clone(),
            order: self.order,
            is_visible: self.is_visible,
        }
    }

    fn full_update(form: CreateLeadershipInput) -> UpdateLeadershipInput {
        UpdateLeadershipInput {
            full_name: Some(form.full_name),
            position: Some(form.position),
            description: Some(form.description),
            photo_url: Some(form.photo_url),
            order: Some(form.order),
            is_visible: Some(form.is_visible),
        }
    }

    fn validate(form: &CreateLeadershipInput) -> Result<(), String> {
        required("ФИО", &form.full_name)?;
        min_len("ФИО", &form.full_name, 2)?;
        required("Должность", &form.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Loading,
    Loaded(Vec<T>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone)]
pub enum ModalState<F> {
    Closed,
    Open {
        mode: ModalMode,
        form: F,
        error: Option<String>,
    },
}

pub struct EntityEditor<T: Editable> {
    client: ApiClient,
    list: ListState<T>,
    modal: ModalState<T::Create>,
    pending_delete: Option<i64>,
    scope: RequestScope,
}

impl<T: Editable> EntityEditor<T> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            list: ListState::Loading,
            modal: ModalState::Closed,
            pending_delete: None,
            scope: RequestScope::new(),
        }
    }

    /// Cancels this page's in-flight requests when the page is left
    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn list_state(&self) -> &ListState<T> {
        &self.list
    }

    /// Loaded items; empty while loading
    pub fn items(&self) -> &[T] {
        match &self.list {
            ListState::Loaded(items) => items,
            ListState::Loading => &[],
        }
    }

    pub fn modal(&self) -> &ModalState<T::Create> {
        &self.modal
    }

    pub fn is_modal_open(&self) -> bool {
        matches!(self.modal, ModalState::Open { .. })
    }

    /// Fetch everything, hidden rows included; a failed read shows an empty list
    ///
    /// A cancelled load leaves the page as it was.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        if self.scope.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        self.list = ListState::Loading;
        let result = self
            .scope
            .run(self.client.resource::<T>().list(true))
            .await;
        match result {
            Ok(items) => {
                self.list = ListState::Loaded(items);
                Ok(())
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                tracing::error!("Failed to load {}: {}", T::PATH, e);
                self.list = ListState::Loaded(Vec::new());
                Err(e)
            }
        }
    }

    /// Re-fetch after a mutation; failures are already logged by `load`
    async fn reload(&mut self) {
        let _ = self.load().await;
    }

    pub fn open_create(&mut self) {
        self.modal = ModalState::Open {
            mode: ModalMode::Create,
            form: T::blank_form(),
            error: None,
        };
    }

    /// Open the modal on a loaded item; false if it is not in the list
    pub fn open_edit(&mut self, id: i64) -> bool {
        let Some(item) = self.items().iter().find(|item| item.id() == id) else {
            return false;
        };
        self.modal = ModalState::Open {
            mode: ModalMode::Edit(id),
            form: item.edit_form(),
            error: None,
        };
        true
    }

    pub fn close(&mut self) {
        self.modal = ModalState::Closed;
    }

    pub fn form_mut(&mut self) -> Option<&mut T::Create> {
        match &mut self.modal {
            ModalState::Open { form, .. } => Some(form),
            ModalState::Closed => None,
        }
    }

    pub fn modal_error(&self) -> Option<&str> {
        match &self.modal {
            ModalState::Open { error, .. } => error.as_deref(),
            ModalState::Closed => None,
        }
    }

    /// Create or update depending on how the modal was opened
    pub async fn submit(&mut self) -> Result<(), ClientError> {
        let (mode, form) = match &mut self.modal {
            ModalState::Open { mode, form, error } => {
                if let Err(message) = T::validate(form) {
                    *error = Some(message.clone());
                    return Err(ClientError::Validation(message));
                }
                (*mode, form.clone())
            }
            ModalState::Closed => {
                return Err(ClientError::Validation("Форма не открыта".to_string()))
            }
        };

        let api = self.client.resource::<T>();
        let result = match mode {
            ModalMode::Create => self.scope.run(api.create(&form)).await,
            ModalMode::Edit(id) => {
                let update = T::full_update(form);
                self.scope.run(api.update(id, &update)).await
            }
        };

        match result {
            Ok(_) => {
                self.modal = ModalState::Closed;
                self.reload().await;
                Ok(())
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                tracing::error!("Failed to save {}: {}", T::PATH, e);
                if let ModalState::Open { error, .. } = &mut self.modal {
                    *error = Some(SAVE_FAILED.to_string());
                }
                Err(e)
            }
        }
    }

    /// First step of a delete: ask for confirmation
    pub fn request_delete(&mut self, id: i64) {
        self.pending_delete = Some(id);
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the confirmed item; nothing happens without a pending request
    pub async fn confirm_delete(&mut self) -> Result<(), ClientError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(());
        };
        let result = self
            .scope
            .run(self.client.resource::<T>().delete(id))
            .await;
        if let Err(e) = &result {
            tracing::error!("Failed to delete {} {}: {}", T::PATH, id, e);
        }
        self.reload().await;
        result.map(|_| ())
    }

    /// Flip `is_visible` with a partial update
    pub async fn toggle_visibility(&mut self, id: i64) -> Result<(), ClientError> {
        let visible = match self.items().iter().find(|item| item.id() == id) {
            Some(item) => item.is_visible(),
            None => return Err(ClientError::Validation(format!("Unknown item {}", id))),
        };
        let result = self
            .scope
            .run(self.client.resource::<T>().set_visible(id, !visible))
            .await;
        if let Err(e) = &result {
            tracing::error!("Failed to toggle visibility of {} {}: {}", T::PATH, id, e);
        }
        self.reload().await;
        result.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{admin_client, spawn_server, spawn_silent_server};
    use crate::client::{MemoryNavigator, Session};
    use std::sync::Arc;

    #[test]
    fn test_validation_rules() {
        let mut form = NewsItem::blank_form();
        assert!(NewsItem::validate(&form).is_err());
        form.title = "Ок".to_string();
        form.content = "текст".to_string();
        assert!(NewsItem::validate(&form).unwrap_err().contains("не менее 3"));
        form.title = "Кубок".to_string();
        assert!(NewsItem::validate(&form).is_ok());

        let form = TeamMember::blank_form();
        assert_eq!(
            TeamMember::validate(&form).unwrap_err(),
            "Поле «ФИО» обязательно"
        );
    }

    #[test]
    fn test_full_update_clears_blank_image() {
        let mut form = NewsItem::blank_form();
        form.image_url = Some("  ".to_string());
        let update = NewsItem::full_update(form);
        assert_eq!(update.image_url, Some(None));
    }

    #[tokio::test]
    async fn test_create_edit_toggle_delete_cycle() {
        let server = spawn_server().await;
        let client = admin_client(&server).await;
        let mut editor: EntityEditor<Event> = EntityEditor::new(client);

        assert_eq!(editor.list_state(), &ListState::Loading);
        editor.load().await.unwrap();
        assert!(editor.items().is_empty());

        // Invalid form stays open
        editor.open_create();
        let err = editor.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(editor.is_modal_open());
        assert!(editor.modal_error().is_some());

        let form = editor.form_mut().unwrap();
        form.title = "Региональный чемпионат".to_string();
        form.location = Some("Чебоксары".to_string());
        editor.submit().await.unwrap();
        assert!(!editor.is_modal_open());
        assert_eq!(editor.items().len(), 1);
        let id = editor.items()[0].id;

        assert!(editor.open_edit(id));
        let form = editor.form_mut().unwrap();
        assert_eq!(form.location.as_deref(), Some("Чебоксары"));
        form.location = None;
        editor.submit().await.unwrap();
        assert_eq!(editor.items()[0].location, None);
        assert_eq!(editor.items()[0].title, "Региональный чемпионат");

        editor.toggle_visibility(id).await.unwrap();
        assert!(!editor.items()[0].is_visible);
        // Hidden rows stay in the admin list
        assert_eq!(editor.items().len(), 1);

        editor.request_delete(id);
        editor.cancel_delete();
        editor.confirm_delete().await.unwrap();
        assert_eq!(editor.items().len(), 1);

        editor.request_delete(id);
        editor.confirm_delete().await.unwrap();
        assert!(editor.items().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_keeps_modal_open() {
        let server = spawn_server().await;
        let client = admin_client(&server).await;
        let mut editor: EntityEditor<LeadershipMember> = EntityEditor::new(client.clone());
        editor.load().await.unwrap();

        let created = client
            .leadership()
            .create(&CreateLeadershipInput::new("Петров Пётр", "Секретарь", 2))
            .await
            .unwrap();
        editor.load().await.unwrap();
        assert!(editor.open_edit(created.id));

        client.leadership().delete(created.id).await.unwrap();
        let err = editor.submit().await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(editor.is_modal_open());
        assert_eq!(editor.modal_error(), Some(SAVE_FAILED));
    }

    #[tokio::test]
    async fn test_leaving_page_cancels_in_flight_requests() {
        let base_url = spawn_silent_server().await;
        let client =
            ApiClient::new(base_url, Session::in_memory(), Arc::new(MemoryNavigator::default()))
                .unwrap();
        client.session().set_token("token");
        let mut editor: EntityEditor<NewsItem> = EntityEditor::new(client);

        let handle = editor.scope_handle();
        let (result, _) = tokio::join!(editor.load(), async { handle.cancel() });
        assert!(matches!(result, Err(ClientError::Cancelled)));
        // A failed read would have shown an empty list
        assert_eq!(editor.list_state(), &ListState::Loading);

        editor.open_create();
        let form = editor.form_mut().unwrap();
        form.title = "Итоги сезона".to_string();
        form.content = "Подводим итоги.".to_string();
        let err = editor.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert!(editor.is_modal_open());
        assert_eq!(editor.modal_error(), None);
    }
}
