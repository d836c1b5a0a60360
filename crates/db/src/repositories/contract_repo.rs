//! Repository for the `contracts` table.

use sqlx::PgPool;
use sonora_core::contract::{ContractStatus, ExtractedContract};
use sonora_core::table::{like_pattern, resolve_sort, ListQuery, Paginated, MAX_EXPORT_ROWS};
use sonora_core::types::DbId;

use crate::error::DbError;
use crate::filter::{fetch_for_export, fetch_page, BindValue, Filter};
use crate::models::contract::{Contract, ContractFilters, CreateContract, UpdateContract};

/// Column list shared across queries to avoid repetition. The status name
/// comes from the lookup table.
const COLUMNS: &str = "id, team_id, document_id, title, counterparty, contract_type, status_id, \
                       (SELECT s.name FROM contract_statuses s WHERE s.id = contracts.status_id) AS status, \
                       start_date, end_date, signed_date, auto_renewal, royalty_rate, advance_amount, \
                       currency, territories, term_months, summary, extracted_data, created_at, updated_at";

/// Columns a list may be sorted by.
pub const SORT_COLUMNS: &[&str] = &[
    "title",
    "counterparty",
    "contract_type",
    "status_id",
    "start_date",
    "end_date",
    "signed_date",
    "royalty_rate",
    "advance_amount",
    "created_at",
];

const SEARCH_COLUMNS: &[&str] = &["title", "counterparty", "contract_type", "summary"];

/// Title used when the model could not find one.
const UNTITLED: &str = "Untitled contract";

/// Provides CRUD operations for contracts plus the extraction upsert.
pub struct ContractRepo;

impl ContractRepo {
    /// Insert a contract entered by hand.
    pub async fn create(pool: &PgPool, team_id: DbId, input: &CreateContract) -> Result<Contract, sqlx::Error> {
        let query = format!(
            "INSERT INTO contracts
                (team_id, title, counterparty, contract_type, status_id, start_date, end_date,
                 signed_date, auto_renewal, royalty_rate, advance_amount, currency, territories,
                 term_months, summary)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(team_id)
            .bind(input.title.trim())
            .bind(&input.counterparty)
            .bind(&input.contract_type)
            .bind(input.status.unwrap_or(ContractStatus::Draft).id())
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.signed_date)
            .bind(input.auto_renewal.unwrap_or(false))
            .bind(input.royalty_rate)
            .bind(input.advance_amount)
            .bind(input.currency.as_deref().map(str::to_uppercase))
            .bind(input.territories.clone().unwrap_or_default())
            .bind(input.term_months)
            .bind(&input.summary)
            .fetch_one(pool)
            .await
    }

    /// Find a contract by ID within a team.
    pub async fn find_by_id(pool: &PgPool, team_id: DbId, id: DbId) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contracts WHERE team_id = $1 AND id = $2");
        sqlx::query_as::<_, Contract>(&query)
            .bind(team_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the contract extracted from a document.
    pub async fn find_by_document(
        pool: &PgPool,
        team_id: DbId,
        document_id: DbId,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contracts WHERE team_id = $1 AND document_id = $2");
        sqlx::query_as::<_, Contract>(&query)
            .bind(team_id)
            .bind(document_id)
            .fetch_optional(pool)
            .await
    }

    /// One page of contracts matching the query.
    pub async fn list(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &ContractFilters,
    ) -> Result<Paginated<Contract>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "created_at")?;
        let filter = build_filter(team_id, query, filters);
        let page = query.page();
        let (items, total) = fetch_page(pool, COLUMNS, "contracts", &filter, sort, query.dir(), page).await?;
        Ok(Paginated::new(items, total, page))
    }

    /// Every contract matching the query (capped), for CSV export.
    pub async fn export(
        pool: &PgPool,
        team_id: DbId,
        query: &ListQuery,
        filters: &ContractFilters,
    ) -> Result<Vec<Contract>, DbError> {
        let sort = resolve_sort(query.sort.as_deref(), SORT_COLUMNS, "created_at")?;
        let filter = build_filter(team_id, query, filters);
        Ok(fetch_for_export(pool, COLUMNS, "contracts", &filter, sort, query.dir(), MAX_EXPORT_ROWS).await?)
    }

    /// Update a contract. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        team_id: DbId,
        id: DbId,
        input: &UpdateContract,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET
                title = COALESCE($3, title),
                counterparty = COALESCE($4, counterparty),
                contract_type = COALESCE($5, contract_type),
                status_id = COALESCE($6, status_id),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                signed_date = COALESCE($9, signed_date),
                auto_renewal = COALESCE($10, auto_renewal),
                royalty_rate = COALESCE($11, royalty_rate),
                advance_amount = COALESCE($12, advance_amount),
                currency = COALESCE($13, currency),
                territories = COALESCE($14, territories),
                term_months = COALESCE($15, term_months),
                summary = COALESCE($16, summary)
             WHERE team_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(team_id)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.counterparty)
            .bind(&input.contract_type)
            .bind(input.status.map(ContractStatus::id))
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.signed_date)
            .bind(input.auto_renewal)
            .bind(input.royalty_rate)
            .bind(input.advance_amount)
            .bind(input.currency.as_deref().map(str::to_uppercase))
            .bind(&input.territories)
            .bind(input.term_months)
            .bind(&input.summary)
            .fetch_optional(pool)
            .await
    }

    /// Delete a contract. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, team_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contracts WHERE team_id = $1 AND id = $2")
            .bind(team_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert or replace the contract extracted from `document_id`.
    ///
    /// Re-running extraction for the same document overwrites the previous
    /// result rather than creating a second contract.
    pub async fn upsert_from_extraction(
        pool: &PgPool,
        team_id: DbId,
        document_id: DbId,
        extracted: &ExtractedContract,
    ) -> Result<Contract, sqlx::Error> {
        let query = format!(
            "INSERT INTO contracts
                (team_id, document_id, title, counterparty, contract_type, status_id, start_date,
                 end_date, signed_date, auto_renewal, royalty_rate, advance_amount, currency,
                 territories, term_months, summary, extracted_data)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             ON CONFLICT (document_id) DO UPDATE SET
                title = EXCLUDED.title,
                counterparty = EXCLUDED.counterparty,
                contract_type = EXCLUDED.contract_type,
                status_id = EXCLUDED.status_id,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                signed_date = EXCLUDED.signed_date,
                auto_renewal = EXCLUDED.auto_renewal,
                royalty_rate = EXCLUDED.royalty_rate,
                advance_amount = EXCLUDED.advance_amount,
                currency = EXCLUDED.currency,
                territories = EXCLUDED.territories,
                term_months = EXCLUDED.term_months,
                summary = EXCLUDED.summary,
                extracted_data = EXCLUDED.extracted_data
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(team_id)
            .bind(document_id)
            .bind(extracted.title.as_deref().unwrap_or(UNTITLED))
            .bind(&extracted.counterparty)
            .bind(&extracted.contract_type)
            .bind(extracted.status.id())
            .bind(extracted.start_date)
            .bind(extracted.end_date)
            .bind(extracted.signed_date)
            .bind(extracted.auto_renewal.unwrap_or(false))
            .bind(extracted.royalty_rate)
            .bind(extracted.advance_amount)
            .bind(&extracted.currency)
            .bind(&extracted.territories)
            .bind(extracted.term_months)
            .bind(&extracted.summary)
            .bind(&extracted.raw)
            .fetch_one(pool)
            .await
    }
}

fn build_filter(team_id: DbId, query: &ListQuery, filters: &ContractFilters) -> Filter {
    let mut filter = Filter::for_team(team_id);
    filter
        .eq_opt("status_id", filters.status.map(|s| BindValue::SmallInt(s.id())))
        .search(SEARCH_COLUMNS, query.search_pattern());
    if let Some(days) = filters.expiring_within_days {
        filter.push(
            "end_date BETWEEN CURRENT_DATE AND CURRENT_DATE + (?)::int",
            BindValue::BigInt(i64::from(days.max(0))),
        );
    }
    if let Some(counterparty) = filters.counterparty.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        filter.push("counterparty ILIKE ?", BindValue::Text(like_pattern(counterparty)));
    }
    filter
}
