//! Repository for the `documents` table and the extraction work queue
//! stored in it.

use sqlx::PgPool;
use sonora_core::contract::DocumentKind;
use sonora_core::status::DocumentStatus;
use sonora_core::table::{resolve_sort, ListQuery, Paginated};
use sonora_core::types::DbId;

use crate::error::DbError;
use crate::filter::{fetch_page, BindValue, Filter};
use crate::models::document::{CreateDocument, Document, DocumentFilters};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, team_id, uploaded_by, name, file_name, content_type, size_bytes, \
                       storage_key, kind, status_id, error_message, uploaded_at, processed_at, \
                       created_at, updated_at";

/// Columns a list may be sorted by.
pub const SORT_COLUMNS: &[&str] = &["name", "file_name", "size_bytes", "uploaded_at", "created_at"];

const SEARCH_COLUMNS: &[&str] = &["name", "file_name"];

/// Longest error message kept on a failed document.
pub const MAX_ERROR_MESSAGE_CHARS: usize = 500;

/// Provides document CRUD plus the status transitions used by extraction.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a document in `uploading` status.
    pub async fn create(pool: &PgPool, team_id: DbId, input: &CreateDocument) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents
                (team_id, uploaded_by, name, file_name, content_type, size_bytes, storage_key, kind, status_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(team_id)
            .bind(input.uploaded_by)
            .bind(&input.name)
            .bind(&input.file_name)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .bind(&input.storage_key)
            .bind(input.kind.as_str())
            .bind(DocumentStatus::Uploading.id())
            .fetch_one(pool)
            .await
    }

    /// Find a document by ID within a team.
    pub async fn find_by_id(pool: &PgPool, team_id: DbId, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE team_id = $1 AND id = $2");
        sqlx::query_as::<_, Document>(&query)
            .bind(team_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a document by ID regardless of team. Used by the background worker.
    pub async fn find_any(pool: &PgPool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of documents matching the query.
    pub async fn list(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &DocumentFilters,
    ) -> Result<Paginated<Document>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "created_at")?;
        let mut filter = Filter::for_team(team_id);
        filter
            .eq_opt("status_id", filters.status.map(|s| BindValue::SmallInt(s.id())))
            .eq_opt("kind", filters.kind.map(|k| BindValue::Text(k.as_str().to_string())))
            .search(SEARCH_COLUMNS, query.search_pattern());
        let page = query.page();
        let (items, total) = fetch_page(pool, COLUMNS, "documents", &filter, sort, query.dir(), page).await?;
        Ok(Paginated::new(items, total, page))
    }

    /// Delete a document, returning its storage key so the object can be
    /// removed too.
    pub async fn delete(pool: &PgPool, team_id: DbId, id: DbId) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("DELETE FROM documents WHERE team_id = $1 AND id = $2 RETURNING storage_key")
            .bind(team_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark an `uploading` document as uploaded. Contracts move to `pending`
    /// for extraction, everything else straight to `completed`.
    ///
    /// Returns `None` when the document does not exist or was already
    /// confirmed.
    pub async fn confirm_upload(pool: &PgPool, team_id: DbId, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                uploaded_at = NOW(),
                status_id = CASE WHEN kind = $4 THEN $5 ELSE $6 END,
                processed_at = CASE WHEN kind = $4 THEN NULL ELSE NOW() END
             WHERE team_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(team_id)
            .bind(id)
            .bind(DocumentStatus::Uploading.id())
            .bind(DocumentKind::Contract.as_str())
            .bind(DocumentStatus::Pending.id())
            .bind(DocumentStatus::Completed.id())
            .fetch_optional(pool)
            .await
    }

    /// Move a failed contract back to `pending`. Returns `None` unless the
    /// document is currently in `error`.
    pub async fn retry(pool: &PgPool, team_id: DbId, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET status_id = $3, error_message = NULL
             WHERE team_id = $1 AND id = $2 AND status_id = $4 AND kind = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(team_id)
            .bind(id)
            .bind(DocumentStatus::Pending.id())
            .bind(DocumentStatus::Error.id())
            .bind(DocumentKind::Contract.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Set `processing`, returning `false` if the document does not exist.
    pub async fn mark_processing(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE documents SET status_id = $2, error_message = NULL WHERE id = $1")
            .bind(id)
            .bind(DocumentStatus::Processing.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `completed` with `processed_at`.
    pub async fn mark_completed(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE documents SET status_id = $2, error_message = NULL, processed_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(DocumentStatus::Completed.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Set `error` with a truncated message.
    pub async fn mark_failed(pool: &PgPool, id: DbId, message: &str) -> Result<(), sqlx::Error> {
        let message: String = message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
        sqlx::query("UPDATE documents SET status_id = $2, error_message = $3, processed_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(DocumentStatus::Error.id())
            .bind(message)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Atomically move the oldest pending contract to `processing`.
    pub async fn claim_next_pending(pool: &PgPool) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET status_id = $1, error_message = NULL
             WHERE id = (
                 SELECT id FROM documents
                 WHERE status_id = $2 AND kind = $3
                 ORDER BY created_at, id
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(DocumentStatus::Processing.id())
            .bind(DocumentStatus::Pending.id())
            .bind(DocumentKind::Contract.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Reset documents left in `processing` by a crash back to `pending`.
    pub async fn reset_processing(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE documents SET status_id = $1 WHERE status_id = $2")
            .bind(DocumentStatus::Pending.id())
            .bind(DocumentStatus::Processing.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// IDs of pending contracts, oldest first.
    pub async fn list_pending_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM documents WHERE status_id = $1 AND kind = $2 ORDER BY created_at, id")
            .bind(DocumentStatus::Pending.id())
            .bind(DocumentKind::Contract.as_str())
            .fetch_all(pool)
            .await
    }
}
