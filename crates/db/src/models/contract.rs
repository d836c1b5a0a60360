//! Contract entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sonora_core::status::{ContractStatus, StatusId};
use sonora_core::types::{Date, DbId, Timestamp};
use validator::Validate;

/// A row from the `contracts` table joined with its status name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contract {
    pub id: DbId,
    pub team_id: DbId,
    pub document_id: Option<DbId>,
    pub title: String,
    pub counterparty: Option<String>,
    pub contract_type: Option<String>,
    pub status_id: StatusId,
    pub status: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub signed_date: Option<Date>,
    pub auto_renewal: bool,
    pub royalty_rate: Option<f64>,
    pub advance_amount: Option<f64>,
    pub currency: Option<String>,
    pub territories: Vec<String>,
    pub term_months: Option<i32>,
    pub summary: Option<String>,
    pub extracted_data: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContract {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    pub counterparty: Option<String>,
    pub contract_type: Option<String>,
    pub status: Option<ContractStatus>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub signed_date: Option<Date>,
    pub auto_renewal: Option<bool>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub royalty_rate: Option<f64>,
    #[validate(range(min = 0.0))]
    pub advance_amount: Option<f64>,
    pub currency: Option<String>,
    pub territories: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub term_months: Option<i32>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateContract {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    pub counterparty: Option<String>,
    pub contract_type: Option<String>,
    pub status: Option<ContractStatus>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub signed_date: Option<Date>,
    pub auto_renewal: Option<bool>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub royalty_rate: Option<f64>,
    #[validate(range(min = 0.0))]
    pub advance_amount: Option<f64>,
    pub currency: Option<String>,
    pub territories: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub term_months: Option<i32>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractFilters {
    pub status: Option<ContractStatus>,
    /// Only contracts ending within this many days from today.
    pub expiring_within_days: Option<i32>,
    pub counterparty: Option<String>,
}
