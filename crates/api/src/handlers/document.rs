//! Handlers for `/teams/{team_id}/documents`.
//!
//! Files never pass through the API. The client asks for a presigned PUT
//! URL, uploads straight to object storage, then confirms. Confirming a
//! contract queues it for extraction.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sonora_core::contract::DocumentKind;
use sonora_core::error::CoreError;
use sonora_core::status::DocumentStatus;
use sonora_core::storage::{document_key, validate_upload, CONTENT_TYPE_PDF, PRESIGNED_URL_TTL};
use sonora_core::table::{ListQuery, Paginated};
use sonora_core::types::DbId;
use sonora_db::models::document::{CreateDocument, Document, DocumentFilters, RequestUpload};
use sonora_db::repositories::DocumentRepo;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::team::TeamAccess;
use crate::response::DataResponse;
use crate::state::AppState;

/// A document with its status name.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    #[serde(flatten)]
    pub document: Document,
    pub status: Option<DocumentStatus>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        let status = document.status();
        Self { document, status }
    }
}

/// Returned by `upload-url`: the new row and where to PUT the bytes.
#[derive(Debug, Serialize)]
pub struct UploadTicket {
    pub document: DocumentResponse,
    pub upload_url: String,
    /// Seconds until the URL stops working.
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct DownloadLink {
    pub url: String,
    pub expires_in: u64,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Document",
        id,
    })
}

async fn find(state: &AppState, team_id: DbId, id: DbId) -> AppResult<Document> {
    DocumentRepo::find_by_id(&state.pool, team_id, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Hand a pending contract to the in-process queue, if this server runs one.
fn enqueue(state: &AppState, document: &Document) {
    if document.status() != Some(DocumentStatus::Pending) {
        return;
    }
    match &state.extraction_queue {
        Some(queue) => {
            if !queue.enqueue(document.id) {
                tracing::warn!(document_id = document.id, "Extraction queue closed; document stays pending");
            }
        }
        None => tracing::debug!(document_id = document.id, "Left pending for the external worker"),
    }
}

/// GET /api/v1/teams/{team_id}/documents
pub async fn list(
    State(state): State<AppState>,
    access: TeamAccess,
    Query(query): Query<ListQuery>,
    Query(filters): Query<DocumentFilters>,
) -> AppResult<Json<DataResponse<Paginated<DocumentResponse>>>> {
    let page = DocumentRepo::list(&state.pool, access.team_id, &query, &filters).await?;
    Ok(Json(DataResponse {
        data: page.map(DocumentResponse::from),
    }))
}

/// POST /api/v1/teams/{team_id}/documents/upload-url
pub async fn request_upload(
    State(state): State<AppState>,
    access: TeamAccess,
    Json(input): Json<RequestUpload>,
) -> AppResult<(StatusCode, Json<DataResponse<UploadTicket>>)> {
    input.validate()?;
    validate_upload(&input.content_type, input.size_bytes)?;
    if input.kind == DocumentKind::Contract && !input.content_type.starts_with(CONTENT_TYPE_PDF) {
        return Err(AppError::Core(CoreError::Validation(
            "Contracts must be uploaded as PDF".into(),
        )));
    }

    let storage_key = document_key(access.team_id, &Uuid::new_v4().to_string(), &input.file_name);
    let upload_url = state
        .store
        .presign_put(&storage_key, &input.content_type, PRESIGNED_URL_TTL)
        .await?;

    let document = DocumentRepo::create(
        &state.pool,
        access.team_id,
        &CreateDocument {
            uploaded_by: Some(access.user.user_id),
            name: input
                .name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(&input.file_name)
                .to_string(),
            file_name: input.file_name.clone(),
            content_type: input.content_type.clone(),
            size_bytes: input.size_bytes,
            storage_key,
            kind: input.kind,
        },
    )
    .await?;
    tracing::info!(
        team_id = access.team_id,
        document_id = document.id,
        kind = %document.kind,
        "Upload URL issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadTicket {
                document: document.into(),
                upload_url,
                expires_in: PRESIGNED_URL_TTL.as_secs(),
            },
        }),
    ))
}

/// GET /api/v1/teams/{team_id}/documents/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<DocumentResponse>>> {
    let document = find(&state, access.team_id, id).await?;
    Ok(Json(DataResponse {
        data: document.into(),
    }))
}

/// POST /api/v1/teams/{team_id}/documents/{id}/confirm
///
/// Marks the upload finished. Contracts become `pending` and are queued
/// for extraction; other documents become `completed`.
pub async fn confirm(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<DocumentResponse>>> {
    let current = find(&state, access.team_id, id).await?;
    if current.status() != Some(DocumentStatus::Uploading) {
        return Err(AppError::Core(CoreError::Conflict(
            "Document upload was already confirmed".into(),
        )));
    }

    let document = DocumentRepo::confirm_upload(&state.pool, access.team_id, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Document upload was already confirmed".into(),
            ))
        })?;
    enqueue(&state, &document);

    Ok(Json(DataResponse {
        data: document.into(),
    }))
}

/// GET /api/v1/teams/{team_id}/documents/{id}/download-url
pub async fn download_url(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<DownloadLink>>> {
    let document = find(&state, access.team_id, id).await?;
    if document.status() == Some(DocumentStatus::Uploading) {
        return Err(AppError::Core(CoreError::Conflict(
            "Document has not been uploaded yet".into(),
        )));
    }

    let url = state
        .store
        .presign_get(&document.storage_key, PRESIGNED_URL_TTL)
        .await?;
    Ok(Json(DataResponse {
        data: DownloadLink {
            url,
            expires_in: PRESIGNED_URL_TTL.as_secs(),
        },
    }))
}

/// POST /api/v1/teams/{team_id}/documents/{id}/retry
///
/// Only a contract whose extraction failed can be retried.
pub async fn retry(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<DocumentResponse>>> {
    let current = find(&state, access.team_id, id).await?;
    if !current.is_contract() {
        return Err(AppError::Core(CoreError::Validation(
            "Only contracts go through extraction".into(),
        )));
    }
    if current.status() != Some(DocumentStatus::Error) {
        return Err(AppError::Core(CoreError::Conflict(
            "Only documents in error can be retried".into(),
        )));
    }

    let document = DocumentRepo::retry(&state.pool, access.team_id, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Only documents in error can be retried".into(),
            ))
        })?;
    tracing::info!(team_id = access.team_id, document_id = id, "Extraction retry requested");
    enqueue(&state, &document);

    Ok(Json(DataResponse {
        data: document.into(),
    }))
}

/// DELETE /api/v1/teams/{team_id}/documents/{id}
///
/// Deletes the row, then the stored object. A contract extracted from the
/// document is kept.
pub async fn delete(
    State(state): State<AppState>,
    access: TeamAccess,
    Path((_, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    access.require_delete()?;
    let storage_key = DocumentRepo::delete(&state.pool, access.team_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Err(e) = state.store.delete_object(&storage_key).await {
        tracing::warn!(error = %e, document_id = id, storage_key = %storage_key, "Failed to delete stored object");
    }
    Ok(StatusCode::NO_CONTENT)
}
