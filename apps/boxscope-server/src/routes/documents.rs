//! Document endpoints
//!
//! - Upload PDFs (multipart, one or more `file` parts)
//! - List documents with per-page cache status
//! - Remove one document or all of them
//! - Select the current document by name

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{delete, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::with_session;
use crate::error::{AppError, Result};
use crate::session::{DocumentSummary, NavigationState, UploadReport};
use crate::state::AppState;

#[derive(Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentSummary>,
    pub total: usize,
    pub dpi: u32,
    pub navigation: NavigationState,
}

#[derive(Debug, Deserialize)]
pub struct SelectDocumentRequest {
    pub name: String,
}

/// Last path component of an uploaded filename
fn document_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

/// Upload one or more PDFs
async fn upload_documents(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadReport>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read upload: {}", e))
    })? {
        let part = field.name().unwrap_or("").to_string();
        if part != "file" && part != "files" {
            tracing::debug!(field = %part, "Ignoring multipart field");
            continue;
        }

        let name = field
            .file_name()
            .map(document_name)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("File part without a filename".to_string()))?;

        let data = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read file data: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        tracing::debug!(document = %name, bytes = data.len(), "Received upload");
        files.push((name, data.to_vec()));
    }

    let report = with_session(&state, &id, move |session, engine| session.upload(engine, files))
        .await?;

    tracing::info!(
        session_id = %id,
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        "Upload processed"
    );
    Ok(Json(report))
}

async fn list_documents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentListResponse>> {
    with_session(&state, &id, |session, _| {
        let documents = session.documents();
        Ok(DocumentListResponse {
            total: documents.len(),
            documents,
            dpi: session.store().dpi(),
            navigation: session.navigation(),
        })
    })
    .await
    .map(Json)
}

async fn clear_documents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NavigationState>> {
    with_session(&state, &id, |session, _| Ok(session.clear_documents()))
        .await
        .map(Json)
}

async fn remove_document(
    State(state): State<AppState>,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<NavigationState>> {
    with_session(&state, &id, move |session, _| session.remove_document(&name))
        .await
        .map(Json)
}

async fn select_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SelectDocumentRequest>,
) -> Result<Json<NavigationState>> {
    with_session(&state, &id, move |session, _| session.select_document(&request.name))
        .await
        .map(Json)
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/sessions/:id/documents",
            post(upload_documents)
                .get(list_documents)
                .delete(clear_documents)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/sessions/:id/documents/:name", delete(remove_document))
        .route("/sessions/:id/document", put(select_document))
}
