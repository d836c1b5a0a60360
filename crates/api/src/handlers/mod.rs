//! HTTP handlers, one module per resource.
//!
//! Shared request/response shapes for bulk creates, CSV imports and CSV
//! exports live here.

pub mod artist;
pub mod auth;
pub mod contract;
pub mod document;
pub mod isrc_song;
pub mod lpm;
pub mod statement;
pub mod stats;
pub mod team;
pub mod tustreams;

use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sonora_core::batching::BulkSummary;
use sonora_core::error::CoreError;
use sonora_core::import::ImportReport;
use sonora_core::table::{export_csv, export_file_name};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::csv_attachment;

/// Body of the JSON bulk-create endpoints.
#[derive(Debug, Deserialize)]
pub struct BulkRequest<T> {
    pub records: Vec<T>,
}

impl<T: Validate> BulkRequest<T> {
    /// Run `validator` on every record, naming the first bad one (1-based).
    pub fn validate_each(&self) -> AppResult<()> {
        for (i, record) in self.records.iter().enumerate() {
            record.validate().map_err(|e| {
                AppError::Core(CoreError::Validation(format!("Record {}: {e}", i + 1)))
            })?;
        }
        Ok(())
    }
}

/// Result of a CSV import: the row report plus what was written.
#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    #[serde(flatten)]
    pub report: ImportReport,
    /// Rows inserted into the target table.
    pub created: usize,
    pub batches: usize,
}

impl ImportOutcome {
    /// Nothing to insert: every row was rejected, or the file had none.
    pub fn empty(report: ImportReport) -> Self {
        Self {
            report,
            created: 0,
            batches: 0,
        }
    }

    /// One inserted row per accepted record; rows the database skipped
    /// (duplicates) count as skipped.
    pub fn from_rows(mut report: ImportReport, summary: BulkSummary) -> Self {
        report.imported = summary.inserted;
        report.skipped += summary.requested - summary.inserted;
        Self {
            report,
            created: summary.inserted,
            batches: summary.batches,
        }
    }
}

/// Deserialize a mapped CSV row into its create DTO.
pub(crate) fn row_into<T: serde::de::DeserializeOwned>(fields: Map<String, Value>) -> Result<T, String> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| format!("Invalid value: {e}"))
}

/// Apply the same `validator` rules as the JSON endpoints to a row mapped
/// from CSV. Failures name the offending fields and become row errors.
pub(crate) fn validated_row<T: Validate>(input: T) -> Result<T, String> {
    let Err(errors) = input.validate() else {
        return Ok(input);
    };
    let mut fields: Vec<String> = errors.field_errors().into_keys().map(|f| f.to_string()).collect();
    fields.sort();
    Err(format!("Invalid value for {}", fields.join(", ")))
}

/// Render `rows` as a CSV attachment named `{prefix}-{today}.csv`.
pub(crate) fn csv_export<T: Serialize>(
    prefix: &str,
    columns: &[(&str, &str)],
    rows: &[T],
) -> AppResult<Response> {
    let body = export_csv(columns, rows)?;
    let file_name = export_file_name(prefix, chrono::Utc::now().date_naive());
    tracing::debug!(prefix, rows = rows.len(), "CSV export");
    Ok(csv_attachment(&file_name, body))
}
