//! Server-side browse/filter/sort/paginate and CSV export for the data
//! tables.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE_SIZE: i64 = 25;
pub const MAX_PAGE_SIZE: i64 = 500;

/// Row cap for a single CSV export.
pub const MAX_EXPORT_ROWS: i64 = 100_000;

/// Separator used when an array cell is flattened for CSV.
const ARRAY_SEPARATOR: &str = "; ";

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Common list parameters every table accepts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<SortDir>,
}

/// SQL `LIMIT`/`OFFSET` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub page_size: i64,
    pub limit: i64,
    pub offset: i64,
}

impl ListQuery {
    /// Clamp page and page size into range.
    pub fn page(&self) -> Page {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        Page {
            page,
            page_size,
            limit: page_size,
            offset: (page - 1).saturating_mul(page_size),
        }
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// `LIKE` pattern for the search term with wildcards escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search_term().map(like_pattern)
    }

    pub fn dir(&self) -> SortDir {
        self.dir.unwrap_or_default()
    }
}

/// Substring `LIKE` pattern for `term` with wildcards escaped.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Resolve the requested sort column against a whitelist.
///
/// `None` or blank resolves to `default`. Anything not in `allowed` is a
/// validation error, so the result is always safe to interpolate into SQL.
pub fn resolve_sort(
    requested: Option<&str>,
    allowed: &[&'static str],
    default: &'static str,
) -> Result<&'static str, CoreError> {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(column) => allowed.iter().copied().find(|c| *c == column).ok_or_else(|| {
            CoreError::Validation(format!(
                "Cannot sort by '{column}'. Must be one of: {allowed:?}"
            ))
        }),
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// One page of rows plus the numbers the table footer needs.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: Page) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + page.page_size - 1) / page.page_size
        };
        Self {
            items,
            total,
            page: page.page,
            page_size: page.page_size,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Serialize rows to CSV. `columns` is `(field, header)` in output order;
/// fields missing from a row produce empty cells.
pub fn export_csv<T: Serialize>(
    columns: &[(&str, &str)],
    rows: &[T],
) -> Result<String, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(columns.iter().map(|(_, header)| *header))
        .map_err(|e| CoreError::Internal(format!("CSV write failed: {e}")))?;

    for row in rows {
        let value = serde_json::to_value(row)
            .map_err(|e| CoreError::Internal(format!("CSV serialization failed: {e}")))?;
        let cells = columns
            .iter()
            .map(|(field, _)| cell_text(value.get(*field).unwrap_or(&Value::Null)));
        writer
            .write_record(cells)
            .map_err(|e| CoreError::Internal(format!("CSV write failed: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Internal(format!("CSV encoding failed: {e}")))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(cell_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(ARRAY_SEPARATOR),
        Value::Object(_) => value.to_string(),
    }
}

/// File name for an export download: `{prefix}-{yyyy-mm-dd}.csv`.
pub fn export_file_name(prefix: &str, today: chrono::NaiveDate) -> String {
    format!("{prefix}-{}.csv", today.format("%Y-%m-%d"))
}
