//! Aggregation of mapped report lines into distribution statements.
//!
//! A statement is one track in one month for one aggregator, with totals
//! plus a per-territory and per-platform breakdown.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregator::Aggregator;
use crate::dates::period_start;
use crate::import::statement::{StatementLine, DEFAULT_CURRENCY};

/// Units and revenue for one territory or platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub name: String,
    pub units: i64,
    pub revenue: f64,
}

/// A statement ready to be inserted, children included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementDraft {
    pub aggregator: Aggregator,
    pub period: NaiveDate,
    pub track_title: Option<String>,
    pub isrc: Option<String>,
    pub upc: Option<String>,
    pub artist_name: Option<String>,
    pub release_title: Option<String>,
    pub total_units: i64,
    pub total_revenue: f64,
    pub currency: String,
    pub territories: Vec<Breakdown>,
    pub platforms: Vec<Breakdown>,
}

#[derive(Default)]
struct Accumulator {
    track_title: Option<String>,
    isrc: Option<String>,
    upc: Option<String>,
    artist_name: Option<String>,
    release_title: Option<String>,
    currency: Option<String>,
    units: i64,
    revenue: f64,
    territories: BTreeMap<String, (i64, f64)>,
    platforms: BTreeMap<String, (i64, f64)>,
}

impl Accumulator {
    fn add(&mut self, line: &StatementLine) {
        // First non-empty value wins for descriptive fields.
        fill(&mut self.track_title, &line.track_title);
        fill(&mut self.isrc, &line.isrc);
        fill(&mut self.upc, &line.upc);
        fill(&mut self.artist_name, &line.artist_name);
        fill(&mut self.release_title, &line.release_title);
        if self.currency.is_none() {
            self.currency = Some(line.currency.clone());
        }

        self.units += line.units;
        self.revenue += line.revenue;

        let territory = self.territories.entry(line.territory.clone()).or_default();
        territory.0 += line.units;
        territory.1 += line.revenue;

        let platform = self.platforms.entry(line.platform.clone()).or_default();
        platform.0 += line.units;
        platform.1 += line.revenue;
    }
}

fn fill(slot: &mut Option<String>, value: &Option<String>) {
    if slot.is_none() {
        slot.clone_from(value);
    }
}

/// Group lines by (month, ISRC or lowercased title) and total them.
///
/// Drafts come out ordered by period then grouping key. Breakdowns are
/// ordered by revenue descending, ties by name.
pub fn aggregate_statements(aggregator: Aggregator, lines: &[StatementLine]) -> Vec<StatementDraft> {
    let mut groups: BTreeMap<(NaiveDate, String), Accumulator> = BTreeMap::new();

    for line in lines {
        let key = match (&line.isrc, &line.track_title) {
            (Some(isrc), _) => isrc.clone(),
            (None, Some(title)) => format!("title:{}", title.trim().to_lowercase()),
            (None, None) => continue,
        };
        groups
            .entry((period_start(line.sale_date), key))
            .or_default()
            .add(line);
    }

    groups
        .into_iter()
        .map(|((period, _), acc)| StatementDraft {
            aggregator,
            period,
            track_title: acc.track_title,
            isrc: acc.isrc,
            upc: acc.upc,
            artist_name: acc.artist_name,
            release_title: acc.release_title,
            total_units: acc.units,
            total_revenue: round_revenue(acc.revenue),
            currency: acc.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            territories: into_breakdowns(acc.territories),
            platforms: into_breakdowns(acc.platforms),
        })
        .collect()
}

fn into_breakdowns(map: BTreeMap<String, (i64, f64)>) -> Vec<Breakdown> {
    let mut out: Vec<Breakdown> = map
        .into_iter()
        .map(|(name, (units, revenue))| Breakdown {
            name,
            units,
            revenue: round_revenue(revenue),
        })
        .collect();
    out.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.name.cmp(&b.name))
    });
    out
}

/// Round to 6 decimal places, the precision royalty reports carry.
pub fn round_revenue(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(date: (i32, u32, u32), isrc: Option<&str>, title: &str, platform: &str, territory: &str, units: i64, revenue: f64) -> StatementLine {
        StatementLine {
            sale_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            platform: platform.into(),
            territory: territory.into(),
            isrc: isrc.map(str::to_string),
            upc: None,
            track_title: Some(title.into()),
            artist_name: None,
            release_title: None,
            units,
            revenue,
            currency: "EUR".into(),
        }
    }

    #[test]
    fn groups_by_month_and_isrc() {
        let lines = vec![
            line((2023, 3, 2), Some("ESA011700123"), "Malamente", "Spotify", "ES", 10, 0.1),
            line((2023, 3, 28), Some("ESA011700123"), "Malamente", "Deezer", "ES", 5, 0.05),
            line((2023, 3, 28), Some("ESA011700123"), "Malamente", "Spotify", "MX", 20, 0.3),
            line((2023, 4, 1), Some("ESA011700123"), "Malamente", "Spotify", "ES", 1, 0.01),
        ];
        let drafts = aggregate_statements(Aggregator::Virgin, &lines);

        assert_eq!(drafts.len(), 2);
        let march = &drafts[0];
        assert_eq!(march.period, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
        assert_eq!(march.total_units, 35);
        assert_eq!(march.total_revenue, 0.45);
        assert_eq!(march.aggregator, Aggregator::Virgin);

        let territories: Vec<(&str, i64)> = march.territories.iter().map(|t| (t.name.as_str(), t.units)).collect();
        assert_eq!(territories, vec![("MX", 20), ("ES", 15)]);
        let platforms: Vec<(&str, f64)> = march.platforms.iter().map(|p| (p.name.as_str(), p.revenue)).collect();
        assert_eq!(platforms, vec![("Spotify", 0.4), ("Deezer", 0.05)]);
    }

    #[test]
    fn lines_without_isrc_group_by_title_case_insensitively() {
        let lines = vec![
            line((2023, 1, 5), None, "Intro", "YouTube", "WW", 3, 0.0),
            line((2023, 1, 9), None, "INTRO ", "YouTube", "WW", 4, 0.0),
            line((2023, 1, 9), Some("USRC17607839"), "Intro", "YouTube", "WW", 1, 0.0),
        ];
        let drafts = aggregate_statements(Aggregator::NoDefinida, &lines);
        assert_eq!(drafts.len(), 2);
        let by_title = drafts.iter().find(|d| d.isrc.is_none()).unwrap();
        assert_eq!(by_title.total_units, 7);
        assert_eq!(by_title.track_title.as_deref(), Some("Intro"));
    }

    #[test]
    fn revenue_is_rounded() {
        assert_eq!(round_revenue(0.1 + 0.2), 0.3);
        assert_eq!(round_revenue(1.23456789), 1.234568);
    }
}
