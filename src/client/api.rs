//! Typed REST client for the admin back-office
//!
//! Every request carries the stored bearer token when there is one. Any 401
//! clears the token and sends the admin to the login page, whichever call
//! triggered it.

use reqwest::{multipart, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use super::navigator::{Navigator, LOGIN_PATH};
use super::session::Session;
use super::ClientError;
use crate::api::auth::TokenResponse;
use crate::api::ApiError;
use crate::models::{
    AdminProfile, ContactMessage, CreateCategoryInput, CreateContactInput, CreateEventInput,
    CreateLeadershipInput, CreateNewsInput, CreateTeamMemberInput, Document, DocumentCategory,
    Event, FederationInfo, LeadershipMember, ListParams, NewsItem, TeamMember,
    UpdateCategoryInput, UpdateEventInput, UpdateLeadershipInput, UpdateNewsInput,
    UpdateTeamMemberInput,
};
use crate::services::Credentials;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `{"message": ...}` acknowledgement
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    pub message: String,
}

/// Health check body
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    pub message: String,
    pub version: String,
}

/// An entity the admin can list, create, update, hide and delete
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    type Create: Serialize + Clone + Send + Sync + 'static;
    type Update: Serialize + Default + Send + Sync + 'static;

    /// Collection path under `/api`
    const PATH: &'static str;

    fn id(&self) -> i64;
    fn is_visible(&self) -> bool;

    /// Update carrying only the visibility flag
    fn visibility_patch(visible: bool) -> Self::Update;
}

impl Resource for NewsItem {
    type Create = CreateNewsInput;
    type Update = UpdateNewsInput;
    const PATH: &'static str = "/news";

    fn id(&self) -> i64 {
        self.id
    }

    fn is_visible(&self) -> bool {
        self.is_visible
    }

    fn visibility_patch(visible: bool) -> UpdateNewsInput {
        UpdateNewsInput {
            is_visible: Some(visible),
            ..Default::default()
        }
    }
}

impl Resource for Event {
    type Create = CreateEventInput;
    type Update = UpdateEventInput;
    const PATH: &'static str = "/events";

    fn id(&self) -> i64 {
        self.id
    }

    fn is_visible(&self) -> bool {
        self.is_visible
    }

    fn visibility_patch(visible: bool) -> UpdateEventInput {
        UpdateEventInput {
            is_visible: Some(visible),
            ..Default::default()
        }
    }
}

impl Resource for TeamMember {
    type Create = CreateTeamMemberInput;
    type Update = UpdateTeamMemberInput;
    const PATH: &'static str = "/team";

    fn id(&self) -> i64 {
        self.id
    }

    fn is_visible(&self) -> bool {
        self.is_visible
    }

    fn visibility_patch(visible: bool) -> UpdateTeamMemberInput {
        UpdateTeamMemberInput {
            is_visible: Some(visible),
            ..Default::default()
        }
    }
}

impl Resource for LeadershipMember {
    type Create = CreateLeadershipInput;
    type Update = UpdateLeadershipInput;
    const PATH: &'static str = "/leadership";

    fn id(&self) -> i64 {
        self.id
    }

    fn is_visible(&self) -> bool {
        self.is_visible
    }

    fn visibility_patch(visible: bool) -> UpdateLeadershipInput {
        UpdateLeadershipInput {
            is_visible: Some(visible),
            ..Default::default()
        }
    }
}

/// HTTP client bound to one backend and one session
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8000`
    pub fn new(
        base_url: impl Into<String>,
        session: Session,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            navigator,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and apply the shared response handling
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Request rejected with 401, clearing session");
            self.session.clear();
            self.navigator.navigate(LOGIN_PATH);
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let (code, message) = match response.json::<ApiError>().await {
                Ok(body) => (body.error.code, body.error.message),
                Err(_) => (
                    "HTTP_ERROR".to_string(),
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string(),
                ),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(response)
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        Ok(self.execute(builder).await?.json::<T>().await?)
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    /// Generic CRUD group for one resource type
    pub fn resource<T: Resource>(&self) -> Crud<'_, T> {
        Crud {
            client: self,
            _marker: PhantomData,
        }
    }

    pub fn news(&self) -> Crud<'_, NewsItem> {
        self.resource()
    }

    pub fn events(&self) -> Crud<'_, Event> {
        self.resource()
    }

    pub fn team(&self) -> Crud<'_, TeamMember> {
        self.resource()
    }

    pub fn leadership(&self) -> Crud<'_, LeadershipMember> {
        self.resource()
    }

    pub fn documents(&self) -> DocumentsApi<'_> {
        DocumentsApi { client: self }
    }

    pub fn contact(&self) -> ContactApi<'_> {
        ContactApi { client: self }
    }

    pub fn info(&self) -> InfoApi<'_> {
        InfoApi { client: self }
    }
}

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl AuthApi<'_> {
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let body = Credentials::new(username, password);
        self.client
            .json(self.client.request(Method::POST, "/auth/login").json(&body))
            .await
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ClientError> {
        let body = Credentials::new(username, password);
        self.client
            .json(self.client.request(Method::POST, "/auth/register").json(&body))
            .await
    }

    pub async fn me(&self) -> Result<AdminProfile, ClientError> {
        self.client
            .json(self.client.request(Method::GET, "/auth/me"))
            .await
    }

    pub async fn logout(&self) -> Result<Ack, ClientError> {
        self.client
            .json(self.client.request(Method::POST, "/auth/logout"))
            .await
    }
}

/// CRUD calls for one resource
pub struct Crud<'a, T: Resource> {
    client: &'a ApiClient,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Resource> Crud<'_, T> {
    /// Everything, hidden rows included when asked for
    pub async fn list(&self, include_hidden: bool) -> Result<Vec<T>, ClientError> {
        let builder = self.client.request(Method::GET, T::PATH).query(&[
            ("include_hidden", include_hidden.to_string()),
            ("limit", ListParams::MAX_LIMIT.to_string()),
        ]);
        self.client.json(builder).await
    }

    pub async fn get(&self, id: i64) -> Result<T, ClientError> {
        let path = format!("{}/{}", T::PATH, id);
        self.client.json(self.client.request(Method::GET, &path)).await
    }

    pub async fn create(&self, input: &T::Create) -> Result<T, ClientError> {
        let builder = self.client.request(Method::POST, T::PATH).json(input);
        self.client.json(builder).await
    }

    pub async fn update(&self, id: i64, input: &T::Update) -> Result<T, ClientError> {
        let path = format!("{}/{}", T::PATH, id);
        let builder = self.client.request(Method::PUT, &path).json(input);
        self.client.json(builder).await
    }

    pub async fn delete(&self, id: i64) -> Result<Ack, ClientError> {
        let path = format!("{}/{}", T::PATH, id);
        self.client.json(self.client.request(Method::DELETE, &path)).await
    }

    /// Partial update carrying only `is_visible`
    pub async fn set_visible(&self, id: i64, visible: bool) -> Result<T, ClientError> {
        self.update(id, &T::visibility_patch(visible)).await
    }
}

impl Crud<'_, Event> {
    pub async fn upcoming(&self, limit: i64) -> Result<Vec<Event>, ClientError> {
        let builder = self
            .client
            .request(Method::GET, "/events/upcoming")
            .query(&[("limit", limit)]);
        self.client.json(builder).await
    }

    pub async fn in_month(&self, year: i32, month: u32) -> Result<Vec<Event>, ClientError> {
        let builder = self
            .client
            .request(Method::GET, "/events")
            .query(&[("year", year.to_string()), ("month", month.to_string())]);
        self.client.json(builder).await
    }
}

impl Crud<'_, NewsItem> {
    /// One page of the public feed
    pub async fn page(&self, skip: i64, limit: i64) -> Result<Vec<NewsItem>, ClientError> {
        let builder = self
            .client
            .request(Method::GET, "/news")
            .query(&[("skip", skip), ("limit", limit)]);
        self.client.json(builder).await
    }
}

/// A file picked for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct DocumentsApi<'a> {
    client: &'a ApiClient,
}

impl DocumentsApi<'_> {
    /// Root categories as full trees
    pub async fn categories(&self, include_hidden: bool) -> Result<Vec<DocumentCategory>, ClientError> {
        let builder = self
            .client
            .request(Method::GET, "/documents/categories")
            .query(&[("include_hidden", include_hidden)]);
        self.client.json(builder).await
    }

    pub async fn category(&self, id: i64) -> Result<DocumentCategory, ClientError> {
        let path = format!("/documents/categories/{}", id);
        self.client.json(self.client.request(Method::GET, &path)).await
    }

    pub async fn create_category(
        &self,
        input: &CreateCategoryInput,
    ) -> Result<DocumentCategory, ClientError> {
        let builder = self
            .client
            .request(Method::POST, "/documents/categories")
            .json(input);
        self.client.json(builder).await
    }

    pub async fn update_category(
        &self,
        id: i64,
        input: &UpdateCategoryInput,
    ) -> Result<DocumentCategory, ClientError> {
        let path = format!("/documents/categories/{}", id);
        let builder = self.client.request(Method::PUT, &path).json(input);
        self.client.json(builder).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<Ack, ClientError> {
        let path = format!("/documents/categories/{}", id);
        self.client.json(self.client.request(Method::DELETE, &path)).await
    }

    pub async fn list(
        &self,
        category_id: Option<i64>,
        include_hidden: bool,
    ) -> Result<Vec<Document>, ClientError> {
        let mut builder = self
            .client
            .request(Method::GET, "/documents")
            .query(&[("include_hidden", include_hidden)]);
        if let Some(category_id) = category_id {
            builder = builder.query(&[("category_id", category_id)]);
        }
        self.client.json(builder).await
    }

    /// Multipart upload into a category
    pub async fn upload(
        &self,
        title: &str,
        category_id: i64,
        file: UploadFile,
    ) -> Result<Document, ClientError> {
        let form = multipart::Form::new()
            .text("title", title.to_string())
            .text("category_id", category_id.to_string())
            .part(
                "file",
                multipart::Part::bytes(file.bytes).file_name(file.filename),
            );
        let builder = self
            .client
            .request(Method::POST, "/documents")
            .multipart(form);
        self.client.json(builder).await
    }

    pub async fn delete(&self, id: i64) -> Result<Ack, ClientError> {
        let path = format!("/documents/{}", id);
        self.client.json(self.client.request(Method::DELETE, &path)).await
    }

    pub async fn download(&self, id: i64) -> Result<Vec<u8>, ClientError> {
        let path = format!("/documents/{}/download", id);
        let response = self
            .client
            .execute(self.client.request(Method::GET, &path))
            .await?;
        Ok(response.bytes().await?.to_vec())
    }
}

pub struct ContactApi<'a> {
    client: &'a ApiClient,
}

impl ContactApi<'_> {
    pub async fn submit(&self, input: &CreateContactInput) -> Result<ContactMessage, ClientError> {
        let builder = self.client.request(Method::POST, "/contact").json(input);
        self.client.json(builder).await
    }

    pub async fn list(&self, unread_only: bool) -> Result<Vec<ContactMessage>, ClientError> {
        let builder = self.client.request(Method::GET, "/contact").query(&[
            ("unread_only", unread_only.to_string()),
            ("limit", ListParams::MAX_LIMIT.to_string()),
        ]);
        self.client.json(builder).await
    }

    pub async fn mark_read(&self, id: i64) -> Result<Ack, ClientError> {
        let path = format!("/contact/{}/read", id);
        self.client.json(self.client.request(Method::PUT, &path)).await
    }

    pub async fn delete(&self, id: i64) -> Result<Ack, ClientError> {
        let path = format!("/contact/{}", id);
        self.client.json(self.client.request(Method::DELETE, &path)).await
    }
}

pub struct InfoApi<'a> {
    client: &'a ApiClient,
}

impl InfoApi<'_> {
    pub async fn get(&self) -> Result<FederationInfo, ClientError> {
        self.client.json(self.client.request(Method::GET, "/info")).await
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        self.client.json(self.client.request(Method::GET, "/health")).await
    }
}
