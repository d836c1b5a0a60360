//! Uploaded document model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonora_core::contract::DocumentKind;
use sonora_core::status::{DocumentStatus, StatusId};
use sonora_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub team_id: DbId,
    pub uploaded_by: Option<DbId>,
    pub name: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub kind: String,
    pub status_id: StatusId,
    pub error_message: Option<String>,
    pub uploaded_at: Option<Timestamp>,
    pub processed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Document {
    pub fn status(&self) -> Option<DocumentStatus> {
        DocumentStatus::from_id(self.status_id)
    }

    pub fn is_contract(&self) -> bool {
        DocumentKind::from_name(&self.kind) == Some(DocumentKind::Contract)
    }
}

/// Request for a presigned upload URL.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestUpload {
    /// Display name; defaults to the file name.
    #[validate(length(min = 1, max = 300))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    #[serde(default)]
    pub kind: DocumentKind,
}

/// Insert DTO built by the upload handler.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub uploaded_by: Option<DbId>,
    pub name: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub kind: DocumentKind,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentFilters {
    pub status: Option<DocumentStatus>,
    pub kind: Option<DocumentKind>,
}
