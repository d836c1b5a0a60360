//! Upstream distribution partners whose CSV exports we ingest.

use serde::{Deserialize, Serialize};

use crate::dates::DateOrder;
use crate::import::DecimalMark;

/// An aggregator (distribution partner) a statement or record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregator {
    Virgin,
    #[serde(rename = "tustreams")]
    TuStreams,
    Ada,
    /// Unknown source. Files must use the canonical column names.
    NoDefinida,
}

impl Aggregator {
    /// Every aggregator, in display order.
    pub const ALL: &'static [Aggregator] = &[
        Aggregator::Virgin,
        Aggregator::TuStreams,
        Aggregator::Ada,
        Aggregator::NoDefinida,
    ];

    /// Return the aggregator name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Virgin => "virgin",
            Self::TuStreams => "tustreams",
            Self::Ada => "ada",
            Self::NoDefinida => "no_definida",
        }
    }

    /// Human-readable label shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Virgin => "Virgin",
            Self::TuStreams => "TuStreams",
            Self::Ada => "Ada",
            Self::NoDefinida => "No definida",
        }
    }

    /// Parse an aggregator from its stored name or its label
    /// (case-insensitive). Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "virgin" => Some(Self::Virgin),
            "tustreams" | "tu_streams" => Some(Self::TuStreams),
            "ada" => Some(Self::Ada),
            "no_definida" | "nodefinida" => Some(Self::NoDefinida),
            _ => None,
        }
    }

    /// How this aggregator writes ambiguous `a/b/yyyy` dates.
    pub fn date_order(&self) -> DateOrder {
        match self {
            Self::Ada => DateOrder::MonthFirst,
            Self::Virgin | Self::TuStreams | Self::NoDefinida => DateOrder::DayFirst,
        }
    }

    /// Decimal mark used in amount columns. TuStreams writes Spanish
    /// locale numbers (`3,125` is three and an eighth).
    pub fn decimal_mark(&self) -> DecimalMark {
        match self {
            Self::TuStreams => DecimalMark::Comma,
            Self::Virgin | Self::Ada | Self::NoDefinida => DecimalMark::Either,
        }
    }
}

impl std::fmt::Display for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
