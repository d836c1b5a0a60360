//! Contract-data extraction: prompt template, response schema and
//! parsing of the model's JSON answer.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::dates::{parse_flexible_date, DateOrder};
use crate::error::CoreError;
pub use crate::status::{ContractStatus, DocumentStatus};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest document text sent to the model.
pub const MAX_PROMPT_CHARS: usize = 100_000;

/// Name of the JSON schema sent with the request.
pub const SCHEMA_NAME: &str = "contract_extraction";

// ---------------------------------------------------------------------------
// Document kind
// ---------------------------------------------------------------------------

/// What an uploaded document is. Only contracts go through extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Contract,
    #[default]
    General,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::General => "general",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "contract" => Some(Self::Contract),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

const PROMPT_TEMPLATE: &str = "\
You are a legal analyst for a music label and distributor. Read the contract \
below and extract its key terms.

Rules:
- Answer with a single JSON object that matches the provided schema. No prose, no Markdown.
- Use null for anything the contract does not state.
- Dates use the format YYYY-MM-DD.
- royalty_rate is a fraction between 0 and 1 (15% -> 0.15).
- advance_amount is a plain number without currency symbols; put the ISO 4217 code in currency.
- territories is a list of ISO 3166 country codes, or [\"WW\"] for worldwide.
- status is one of: draft, active, expired, terminated, unknown.
- summary is at most three sentences in the contract's language.

The contract may be in Spanish or English. Useful vocabulary: \
\"contrato de distribución\" = distribution agreement, \"licencia\" = license, \
\"regalías\" = royalties, \"anticipo\" = advance, \"vigencia\"/\"plazo\" = term, \
\"territorio\" = territory, \"renovación automática\"/\"prórroga tácita\" = auto renewal, \
\"fecha de firma\" = signed date, \"la discográfica\"/\"el sello\" = the label, \
\"el artista\" = the artist, \"rescisión\" = termination.

CONTRACT TEXT:
";

/// Truncate `text` to at most [`MAX_PROMPT_CHARS`] characters.
pub fn truncate_for_prompt(text: &str) -> &str {
    match text.char_indices().nth(MAX_PROMPT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the extraction prompt for a document's text.
pub fn build_extraction_prompt(text: &str) -> String {
    let body = truncate_for_prompt(text.trim());
    let mut prompt = String::with_capacity(PROMPT_TEMPLATE.len() + body.len());
    prompt.push_str(PROMPT_TEMPLATE);
    prompt.push_str(body);
    prompt
}

/// JSON schema the model's answer must satisfy.
pub fn contract_response_schema() -> Value {
    let nullable_string = json!({ "type": ["string", "null"] });
    let nullable_date = json!({ "type": ["string", "null"], "description": "YYYY-MM-DD" });
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "title", "counterparty", "contract_type", "status", "start_date",
            "end_date", "signed_date", "auto_renewal", "royalty_rate",
            "advance_amount", "currency", "territories", "term_months", "summary"
        ],
        "properties": {
            "title": nullable_string,
            "counterparty": nullable_string,
            "contract_type": nullable_string,
            "status": {
                "type": ["string", "null"],
                "enum": ["draft", "active", "expired", "terminated", "unknown", null]
            },
            "start_date": nullable_date,
            "end_date": nullable_date,
            "signed_date": nullable_date,
            "auto_renewal": { "type": ["boolean", "null"] },
            "royalty_rate": { "type": ["number", "null"] },
            "advance_amount": { "type": ["number", "null"] },
            "currency": nullable_string,
            "territories": { "type": "array", "items": { "type": "string" } },
            "term_months": { "type": ["integer", "null"] },
            "summary": nullable_string
        }
    })
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Contract terms extracted from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedContract {
    pub title: Option<String>,
    pub counterparty: Option<String>,
    pub contract_type: Option<String>,
    pub status: ContractStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub signed_date: Option<NaiveDate>,
    pub auto_renewal: Option<bool>,
    pub royalty_rate: Option<f64>,
    pub advance_amount: Option<f64>,
    pub currency: Option<String>,
    pub territories: Vec<String>,
    pub term_months: Option<i32>,
    pub summary: Option<String>,
    /// The parsed JSON object as returned by the model.
    pub raw: Value,
}

/// Parse the model's answer, deriving a missing status from today's date.
pub fn parse_extraction_response(raw: &str) -> Result<ExtractedContract, CoreError> {
    parse_extraction_response_at(raw, Utc::now().date_naive())
}

/// Parse the model's answer, deriving a missing status relative to `today`.
pub fn parse_extraction_response_at(
    raw: &str,
    today: NaiveDate,
) -> Result<ExtractedContract, CoreError> {
    let object_text = extract_json_object(raw)
        .ok_or_else(|| CoreError::Validation("Model response contains no JSON object".into()))?;
    let value: Value = serde_json::from_str(object_text)
        .map_err(|e| CoreError::Validation(format!("Model response is not valid JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| CoreError::Validation("Model response is not a JSON object".into()))?;

    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
            .map(str::to_string)
    };
    let date = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .and_then(|s| parse_flexible_date(s, DateOrder::DayFirst))
    };
    let number = |key: &str| match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => crate::import::parse_number(s),
        _ => None,
    };

    let start_date = date("start_date");
    let end_date = date("end_date");
    let status = text("status")
        .and_then(|s| ContractStatus::from_name(&s).or(Some(ContractStatus::Unknown)))
        .unwrap_or_else(|| derive_status(start_date, end_date, today));

    let royalty_rate = number("royalty_rate").map(|rate| if rate > 1.0 { rate / 100.0 } else { rate });

    let territories = match obj.get("territories") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split([',', ';'])
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    let auto_renewal = match obj.get("auto_renewal") {
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) => crate::import::parse_bool(s),
        _ => None,
    };

    Ok(ExtractedContract {
        title: text("title"),
        counterparty: text("counterparty"),
        contract_type: text("contract_type"),
        status,
        start_date,
        end_date,
        signed_date: date("signed_date"),
        auto_renewal,
        royalty_rate,
        advance_amount: number("advance_amount"),
        currency: text("currency").map(|c| c.to_uppercase()),
        territories,
        term_months: number("term_months").map(|m| m.round() as i32),
        summary: text("summary"),
        raw: value,
    })
}

/// Status implied by the contract dates when the model gives none.
pub fn derive_status(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> ContractStatus {
    match (start_date, end_date) {
        (_, Some(end)) if end < today => ContractStatus::Expired,
        (Some(_), _) => ContractStatus::Active,
        _ => ContractStatus::Unknown,
    }
}

/// Strip Markdown code fences and return the outermost `{ ... }` span.
fn extract_json_object(raw: &str) -> Option<&str> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        text = rest.trim_end().strip_suffix("```").unwrap_or(rest).trim();
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn prompt_contains_text_and_truncates() {
        let prompt = build_extraction_prompt("  Contrato de distribución entre A y B  ");
        assert!(prompt.ends_with("Contrato de distribución entre A y B"));
        assert!(prompt.contains("regalías"));

        let long = "é".repeat(MAX_PROMPT_CHARS + 10);
        assert_eq!(truncate_for_prompt(&long).chars().count(), MAX_PROMPT_CHARS);
    }

    #[test]
    fn schema_lists_every_field() {
        let schema = contract_response_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 14);
        for field in required {
            assert!(schema["properties"].get(field.as_str().unwrap()).is_some());
        }
    }

    #[test]
    fn parses_fenced_response() {
        let raw = "```json\n{\"title\": \"Distribution Agreement\", \"counterparty\": \"Virgin Music\", \
                   \"status\": \"active\", \"start_date\": \"2023-01-01\", \"end_date\": \"31/12/2025\", \
                   \"royalty_rate\": 15, \"advance_amount\": \"5.000,00\", \"currency\": \"eur\", \
                   \"territories\": [\"es\", \"mx\"], \"term_months\": 36, \"auto_renewal\": true, \
                   \"summary\": \"Three-year deal.\"}\n```";
        let contract = parse_extraction_response_at(raw, today()).unwrap();

        assert_eq!(contract.title.as_deref(), Some("Distribution Agreement"));
        assert_eq!(contract.status, ContractStatus::Active);
        assert_eq!(contract.end_date, NaiveDate::from_ymd_opt(2025, 12, 31));
        assert_eq!(contract.royalty_rate, Some(0.15));
        assert_eq!(contract.advance_amount, Some(5000.0));
        assert_eq!(contract.currency.as_deref(), Some("EUR"));
        assert_eq!(contract.territories, vec!["ES", "MX"]);
        assert_eq!(contract.term_months, Some(36));
        assert_eq!(contract.auto_renewal, Some(true));
        assert_eq!(contract.raw["counterparty"], "Virgin Music");
    }

    #[test]
    fn fractional_royalty_is_kept() {
        let contract = parse_extraction_response_at(r#"{"royalty_rate": 0.2}"#, today()).unwrap();
        assert_eq!(contract.royalty_rate, Some(0.2));
    }

    #[test]
    fn missing_status_is_derived_from_dates() {
        let expired = parse_extraction_response_at(r#"{"end_date": "2020-01-01"}"#, today()).unwrap();
        assert_eq!(expired.status, ContractStatus::Expired);

        let active = parse_extraction_response_at(r#"{"start_date": "2024-01-01"}"#, today()).unwrap();
        assert_eq!(active.status, ContractStatus::Active);

        let unknown = parse_extraction_response_at("{}", today()).unwrap();
        assert_eq!(unknown.status, ContractStatus::Unknown);
    }

    #[test]
    fn unrecognized_status_is_unknown() {
        let contract = parse_extraction_response_at(r#"{"status": "vigente"}"#, today()).unwrap();
        assert_eq!(contract.status, ContractStatus::Unknown);
    }

    #[test]
    fn prose_around_object_is_ignored() {
        let contract =
            parse_extraction_response_at("Here you go: {\"title\": \"Licencia\"} Thanks!", today()).unwrap();
        assert_eq!(contract.title.as_deref(), Some("Licencia"));
    }

    #[test]
    fn invalid_responses_are_validation_errors() {
        assert_matches!(parse_extraction_response_at("no json here", today()), Err(CoreError::Validation(_)));
        assert_matches!(parse_extraction_response_at("{not json}", today()), Err(CoreError::Validation(_)));
    }

    #[test]
    fn document_kind_names() {
        assert_eq!(DocumentKind::from_name("Contract"), Some(DocumentKind::Contract));
        assert_eq!(DocumentKind::General.as_str(), "general");
        assert_eq!(DocumentKind::from_name("invoice"), None);
    }
}
