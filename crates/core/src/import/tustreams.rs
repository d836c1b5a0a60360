//! TuStreams record import: the TuStreams report layout plus download counts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::statement::map_statement_row;
use super::{parse_integer, CsvData, HeaderIndex, MappedRows};
use crate::aggregator::Aggregator;
use crate::dates::period_start;

/// Headers carrying download counts in TuStreams exports.
const DOWNLOAD_HEADERS: &[&str] = &["Descargas", "Downloads"];

/// One TuStreams report row in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TustreamsLine {
    /// First day of the reported month.
    pub period: NaiveDate,
    pub platform: String,
    pub country: String,
    pub isrc: Option<String>,
    pub upc: Option<String>,
    pub track_title: Option<String>,
    pub artist_name: Option<String>,
    pub release_title: Option<String>,
    pub streams: i64,
    pub downloads: i64,
    pub revenue: f64,
    pub currency: String,
}

/// Map one TuStreams record.
pub fn map_tustreams_row(index: &HeaderIndex, record: &[String]) -> Result<TustreamsLine, String> {
    let line = map_statement_row(Aggregator::TuStreams, index, record)?;
    let downloads = match index.value(record, DOWNLOAD_HEADERS) {
        Some(raw) => parse_integer(raw).ok_or_else(|| format!("Invalid downloads '{raw}'"))?,
        None => 0,
    };

    Ok(TustreamsLine {
        period: period_start(line.sale_date),
        platform: line.platform,
        country: line.territory,
        isrc: line.isrc,
        upc: line.upc,
        track_title: line.track_title,
        artist_name: line.artist_name,
        release_title: line.release_title,
        streams: line.units,
        downloads,
        revenue: line.revenue,
        currency: line.currency,
    })
}

/// Map every record of a TuStreams export.
pub fn map_tustreams_rows(data: &CsvData) -> MappedRows<TustreamsLine> {
    super::map_rows(data, map_tustreams_row)
}
