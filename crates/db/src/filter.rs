//! Dynamic `WHERE` clauses for the table list and export queries.
//!
//! Conditions are written with a `?` placeholder that is replaced by the
//! next positional parameter (`$n`). Only column names from the
//! repositories' own whitelists are ever interpolated; user input always
//! travels as a bind value.

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{FromRow, PgPool, Postgres};
use sonora_core::table::{Page, SortDir};
use sonora_core::types::{Date, DbId};

/// Typed bind value for dynamically-built queries.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    BigInt(i64),
    SmallInt(i16),
    Text(String),
    Date(Date),
    Bool(bool),
}

/// Accumulates `AND`-joined conditions and their bind values.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<String>,
    values: Vec<BindValue>,
}

impl Filter {
    /// Start a filter scoped to one team.
    pub fn for_team(team_id: DbId) -> Self {
        let mut filter = Self::default();
        filter.push("team_id = ?", BindValue::BigInt(team_id));
        filter
    }

    /// Add a condition with one `?` placeholder (reused if repeated).
    pub fn push(&mut self, condition: &str, value: BindValue) -> &mut Self {
        let placeholder = format!("${}", self.values.len() + 1);
        self.conditions.push(condition.replace('?', &placeholder));
        self.values.push(value);
        self
    }

    /// Add a condition with no bind value.
    pub fn push_raw(&mut self, condition: &str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    /// `column = value` when `value` is present.
    pub fn eq_opt(&mut self, column: &str, value: Option<BindValue>) -> &mut Self {
        if let Some(value) = value {
            self.push(&format!("{column} = ?"), value);
        }
        self
    }

    /// Case-insensitive substring match across `columns`.
    pub fn search(&mut self, columns: &[&str], pattern: Option<String>) -> &mut Self {
        if let Some(pattern) = pattern {
            let clause = columns
                .iter()
                .map(|c| format!("{c} ILIKE ?"))
                .collect::<Vec<_>>()
                .join(" OR ");
            self.push(&format!("({clause})"), BindValue::Text(pattern));
        }
        self
    }

    /// The `WHERE ...` clause, empty when there are no conditions.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Index of the next positional parameter.
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    /// Bind every value to a `query_as`.
    pub fn bind_as<'q, O>(
        &'q self,
        mut q: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for value in &self.values {
            q = match value {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::SmallInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Date(v) => q.bind(*v),
                BindValue::Bool(v) => q.bind(*v),
            };
        }
        q
    }

    /// Bind every value to a `query_scalar`.
    pub fn bind_scalar<'q, O>(
        &'q self,
        mut q: QueryScalar<'q, Postgres, O, PgArguments>,
    ) -> QueryScalar<'q, Postgres, O, PgArguments> {
        for value in &self.values {
            q = match value {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::SmallInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Date(v) => q.bind(*v),
                BindValue::Bool(v) => q.bind(*v),
            };
        }
        q
    }
}

/// Fetch one page of `SELECT {select} FROM {from} {where}` plus the total
/// row count for the same filter. `sort` must come from a whitelist.
pub async fn fetch_page<T>(
    pool: &PgPool,
    select: &str,
    from: &str,
    filter: &Filter,
    sort: &str,
    dir: SortDir,
    page: Page,
) -> Result<(Vec<T>, i64), sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let where_clause = filter.where_clause();
    let next = filter.next_index();
    let dir = dir.as_sql();

    let query = format!(
        "SELECT {select} FROM {from} {where_clause} \
         ORDER BY {sort} {dir} NULLS LAST, id {dir} \
         LIMIT ${next} OFFSET ${}",
        next + 1
    );
    let items = filter
        .bind_as(sqlx::query_as::<_, T>(&query))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;

    let count_query = format!("SELECT COUNT(*) FROM {from} {where_clause}");
    let total = filter
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_query))
        .fetch_one(pool)
        .await?;

    Ok((items, total))
}

/// Fetch up to `limit` rows for export, in the requested order.
pub async fn fetch_for_export<T>(
    pool: &PgPool,
    select: &str,
    from: &str,
    filter: &Filter,
    sort: &str,
    dir: SortDir,
    limit: i64,
) -> Result<Vec<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let where_clause = filter.where_clause();
    let dir = dir.as_sql();
    let query = format!(
        "SELECT {select} FROM {from} {where_clause} \
         ORDER BY {sort} {dir} NULLS LAST, id {dir} \
         LIMIT ${}",
        filter.next_index()
    );
    filter
        .bind_as(sqlx::query_as::<_, T>(&query))
        .bind(limit)
        .fetch_all(pool)
        .await
}
