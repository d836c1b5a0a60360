//! Shared query parameter types and request helpers for API handlers.

use axum::extract::Multipart;
use serde::Deserialize;
use sonora_core::aggregator::Aggregator;
use sonora_core::dates::DateOrder;
use sonora_core::error::CoreError;
use sonora_core::import::{parse_csv, CsvData};

use crate::error::{AppError, AppResult};

/// `?aggregator=` for CSV imports. Accepts stored names and display labels.
#[derive(Debug, Default, Deserialize)]
pub struct ImportParams {
    pub aggregator: Option<String>,
}

impl ImportParams {
    /// The named aggregator, or `None` when absent.
    pub fn aggregator(&self) -> AppResult<Option<Aggregator>> {
        match self.aggregator.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => Aggregator::from_str(raw).map(Some).ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!("Unknown aggregator '{raw}'")))
            }),
        }
    }

    /// The named aggregator; statement imports cannot guess it.
    pub fn require_aggregator(&self) -> AppResult<Aggregator> {
        self.aggregator()?.ok_or_else(|| {
            AppError::Core(CoreError::Validation("The aggregator query parameter is required".into()))
        })
    }

    /// How ambiguous `a/b/yyyy` dates are read. Day-first unless the
    /// aggregator says otherwise.
    pub fn date_order(&self) -> AppResult<DateOrder> {
        Ok(self
            .aggregator()?
            .map(|a| a.date_order())
            .unwrap_or(DateOrder::DayFirst))
    }
}

/// Read the first file part of a multipart upload and parse it as CSV.
pub async fn read_csv_upload(mut multipart: Multipart) -> AppResult<CsvData> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.file_name().is_none() && field.name() != Some("file") {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        return Ok(parse_csv(&bytes)?);
    }
    Err(AppError::BadRequest("No CSV file in multipart upload".into()))
}
