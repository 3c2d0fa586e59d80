//! Document API endpoints
//!
//! Categories:
//! - GET /api/documents/categories - Root categories as full trees
//! - GET /api/documents/categories/{id} - One category with its subtree
//! - POST /api/documents/categories - Create (admin)
//! - PUT/DELETE /api/documents/categories/{id} - Update or delete an empty category (admin)
//!
//! Documents:
//! - GET /api/documents - Flat list, optionally for one category
//! - POST /api/documents - Multipart upload (admin)
//! - GET /api/documents/{id}/download - File with its original name
//! - DELETE /api/documents/{id} - Delete record and file (admin)

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::{lenient_bool, VisibilityQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin, MessageResponse, Viewer};
use crate::models::{CreateCategoryInput, Document, DocumentCategory, UpdateCategoryInput};
use crate::services::StoredUpload;

#[derive(Debug, Deserialize)]
pub struct DocumentListQuery {
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub include_hidden: bool,
}

pub fn router(upload_body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route(
            "/",
            get(list_documents)
                .post(upload_document)
                .layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/{id}", delete(delete_document))
        .route("/{id}/download", get(download_document))
}

async fn list_categories(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<Vec<DocumentCategory>>, ApiError> {
    let tree = state
        .document_service
        .category_tree(viewer.include_hidden(query.include_hidden))
        .await?;
    Ok(Json(tree))
}

async fn get_category(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
    Query(query): Query<VisibilityQuery>,
) -> Result<Json<DocumentCategory>, ApiError> {
    let category = state
        .document_service
        .get_category(id, viewer.include_hidden(query.include_hidden))
        .await?;
    Ok(Json(category))
}

async fn create_category(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Json(body): Json<CreateCategoryInput>,
) -> Result<Json<DocumentCategory>, ApiError> {
    Ok(Json(state.document_service.create_category(body).await?))
}

async fn update_category(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCategoryInput>,
) -> Result<Json<DocumentCategory>, ApiError> {
    Ok(Json(state.document_service.update_category(id, body).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.document_service.delete_category(id).await?;
    Ok(MessageResponse::new("Category deleted successfully"))
}

async fn list_documents(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let documents = state
        .document_service
        .list_documents(query.category_id, viewer.include_hidden(query.include_hidden))
        .await?;
    Ok(Json(documents))
}

/// POST /api/documents - fields `file`, `title`, `category_id`, optional `order`
async fn upload_document(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    mut multipart: Multipart,
) -> Result<Json<Document>, ApiError> {
    let mut title = None;
    let mut category_id = None;
    let mut order = 0;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("file").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation_error(format!("Failed to read file: {}", e)))?;
                file = Some((filename, bytes.to_vec()));
            }
            "title" => title = Some(read_text(field).await?),
            "category_id" => {
                category_id = Some(parse_number(&read_text(field).await?, "category_id")?)
            }
            "order" => order = parse_number(&read_text(field).await?, "order")?,
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| ApiError::validation_error("No file provided"))?;
    let title = title.ok_or_else(|| ApiError::validation_error("title is required"))?;
    let category_id =
        category_id.ok_or_else(|| ApiError::validation_error("category_id is required"))?;

    let document = state
        .document_service
        .upload(StoredUpload {
            title,
            filename,
            category_id,
            order,
            bytes,
        })
        .await?;
    Ok(Json(document))
}

async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let (document, bytes) = state.document_service.download(id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_DISPOSITION, content_disposition(&document.filename))
        .header(header::CONTENT_LENGTH, bytes.len())
        .body(Body::from(bytes))
        .map_err(|e| ApiError::internal_error(format!("Failed to build response: {}", e)))
}

async fn delete_document(
    State(state): State<AppState>,
    _auth: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.document_service.delete_document(id).await?;
    Ok(MessageResponse::new("Document deleted successfully"))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read form field: {}", e)))
}

fn parse_number<T: std::str::FromStr>(raw: &str, field: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::validation_error(format!("{} must be a number", field)))
}

/// Attachment header carrying the original (possibly non-ASCII) file name
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
