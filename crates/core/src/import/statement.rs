//! Per-aggregator mapping of sales/royalty report rows to [`StatementLine`]s.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{parse_decimal, parse_integer, CsvData, HeaderIndex, MappedRows};
use crate::aggregator::Aggregator;
use crate::dates::parse_flexible_date;
use crate::identifiers::{normalize_isrc, normalize_upc};

/// Territory used when a report line carries none.
pub const DEFAULT_TERRITORY: &str = "WW";

/// Currency used when a report line carries none.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// A single sales line in canonical form, regardless of source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub sale_date: NaiveDate,
    pub platform: String,
    pub territory: String,
    pub isrc: Option<String>,
    pub upc: Option<String>,
    pub track_title: Option<String>,
    pub artist_name: Option<String>,
    pub release_title: Option<String>,
    pub units: i64,
    pub revenue: f64,
    pub currency: String,
}

/// Canonical statement fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementField {
    SaleDate,
    Platform,
    Territory,
    Isrc,
    Upc,
    TrackTitle,
    ArtistName,
    ReleaseTitle,
    Units,
    Revenue,
    Currency,
}

impl StatementField {
    pub const ALL: &'static [StatementField] = &[
        Self::SaleDate,
        Self::Platform,
        Self::Territory,
        Self::Isrc,
        Self::Upc,
        Self::TrackTitle,
        Self::ArtistName,
        Self::ReleaseTitle,
        Self::Units,
        Self::Revenue,
        Self::Currency,
    ];

    /// Fields a file must provide a column for.
    pub const REQUIRED: &'static [StatementField] = &[Self::SaleDate, Self::Platform];

    /// Canonical snake_case name (also the header used by "No definida").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaleDate => "sale_date",
            Self::Platform => "platform",
            Self::Territory => "territory",
            Self::Isrc => "isrc",
            Self::Upc => "upc",
            Self::TrackTitle => "track_title",
            Self::ArtistName => "artist_name",
            Self::ReleaseTitle => "release_title",
            Self::Units => "units",
            Self::Revenue => "revenue",
            Self::Currency => "currency",
        }
    }
}

/// Headers an aggregator uses for a canonical field, most specific first.
pub fn header_aliases(aggregator: Aggregator, field: StatementField) -> &'static [&'static str] {
    use StatementField as F;
    match aggregator {
        Aggregator::Virgin => match field {
            F::SaleDate => &["Reporting Period", "Sales Period", "Period"],
            F::Platform => &["Store", "DSP", "Service"],
            F::Territory => &["Country", "Territory", "Country Code"],
            F::Isrc => &["ISRC"],
            F::Upc => &["UPC", "EAN"],
            F::TrackTitle => &["Track Title", "Track"],
            F::ArtistName => &["Artist", "Track Artist"],
            F::ReleaseTitle => &["Release Title", "Release"],
            F::Units => &["Quantity", "Units"],
            F::Revenue => &["Net Revenue (EUR)", "Net Revenue", "Revenue"],
            F::Currency => &["Currency"],
        },
        Aggregator::TuStreams => match field {
            F::SaleDate => &["Fecha", "Periodo", "Mes"],
            F::Platform => &["Plataforma", "Tienda"],
            F::Territory => &["País", "Territorio"],
            F::Isrc => &["ISRC"],
            F::Upc => &["UPC", "EAN"],
            F::TrackTitle => &["Canción", "Título", "Tema"],
            F::ArtistName => &["Artista"],
            F::ReleaseTitle => &["Álbum", "Lanzamiento"],
            F::Units => &["Reproducciones", "Cantidad", "Streams"],
            F::Revenue => &["Ingresos", "Importe", "Ingresos netos"],
            F::Currency => &["Moneda", "Divisa"],
        },
        Aggregator::Ada => match field {
            F::SaleDate => &["Transaction Date", "Sales Month", "Statement Period"],
            F::Platform => &["Retailer", "Store"],
            F::Territory => &["Territory", "Country"],
            F::Isrc => &["ISRC"],
            F::Upc => &["UPC", "EAN"],
            F::TrackTitle => &["Track", "Track Name"],
            F::ArtistName => &["Artist", "Track Artist"],
            F::ReleaseTitle => &["Product", "Product Title"],
            F::Units => &["Units", "Quantity"],
            F::Revenue => &["Net Amount", "Payable", "Net Payable"],
            F::Currency => &["Currency"],
        },
        Aggregator::NoDefinida => match field {
            F::SaleDate => &["sale_date"],
            F::Platform => &["platform"],
            F::Territory => &["territory"],
            F::Isrc => &["isrc"],
            F::Upc => &["upc"],
            F::TrackTitle => &["track_title"],
            F::ArtistName => &["artist_name"],
            F::ReleaseTitle => &["release_title"],
            F::Units => &["units"],
            F::Revenue => &["revenue"],
            F::Currency => &["currency"],
        },
    }
}

/// Canonical names of required fields with no matching column.
pub fn missing_required_headers(aggregator: Aggregator, index: &HeaderIndex) -> Vec<&'static str> {
    StatementField::REQUIRED
        .iter()
        .filter(|field| index.find(header_aliases(aggregator, **field)).is_none())
        .map(|field| field.as_str())
        .collect()
}

/// Map one record from an aggregator report to a [`StatementLine`].
pub fn map_statement_row(
    aggregator: Aggregator,
    index: &HeaderIndex,
    record: &[String],
) -> Result<StatementLine, String> {
    let get = |field: StatementField| index.value(record, header_aliases(aggregator, field));

    let raw_date = get(StatementField::SaleDate).ok_or("Missing sale date")?;
    let sale_date = parse_flexible_date(raw_date, aggregator.date_order())
        .ok_or_else(|| format!("Invalid sale date '{raw_date}'"))?;

    let platform = get(StatementField::Platform)
        .ok_or("Missing platform")?
        .to_string();

    let isrc = get(StatementField::Isrc).and_then(normalize_isrc);
    let track_title = get(StatementField::TrackTitle).map(str::to_string);
    if isrc.is_none() && track_title.is_none() {
        return Err("Row needs an ISRC or a track title".to_string());
    }

    let units = match get(StatementField::Units) {
        Some(raw) => parse_integer(raw).ok_or_else(|| format!("Invalid units '{raw}'"))?,
        None => 0,
    };
    let revenue = match get(StatementField::Revenue) {
        Some(raw) => parse_decimal(raw, aggregator.decimal_mark())
            .ok_or_else(|| format!("Invalid revenue '{raw}'"))?,
        None => 0.0,
    };

    Ok(StatementLine {
        sale_date,
        platform,
        territory: get(StatementField::Territory)
            .map(|t| t.to_uppercase())
            .unwrap_or_else(|| DEFAULT_TERRITORY.to_string()),
        isrc,
        upc: get(StatementField::Upc).and_then(normalize_upc),
        track_title,
        artist_name: get(StatementField::ArtistName).map(str::to_string),
        release_title: get(StatementField::ReleaseTitle).map(str::to_string),
        units,
        revenue,
        currency: get(StatementField::Currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
    })
}

/// Map every record of a report.
pub fn map_statement_rows(aggregator: Aggregator, data: &CsvData) -> MappedRows<StatementLine> {
    super::map_rows(data, |index, record| map_statement_row(aggregator, index, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parse_csv;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn maps_virgin_report() {
        let csv = "Reporting Period,Store,Country,ISRC,UPC,Track Title,Artist,Release Title,Quantity,Net Revenue (EUR)\n\
                   2023-03,Spotify,es,ES-A01-17-00123,036000291452,Malamente,Rosalía,El Mal Querer,1200,3.45\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        let mapped = map_statement_rows(Aggregator::Virgin, &data);

        assert!(mapped.report.errors.is_empty());
        let line = &mapped.rows[0];
        assert_eq!(line.sale_date, ymd(2023, 3, 1));
        assert_eq!(line.platform, "Spotify");
        assert_eq!(line.territory, "ES");
        assert_eq!(line.isrc.as_deref(), Some("ESA011700123"));
        assert_eq!(line.upc.as_deref(), Some("036000291452"));
        assert_eq!(line.units, 1200);
        assert_eq!(line.revenue, 3.45);
        assert_eq!(line.currency, "EUR");
    }

    #[test]
    fn maps_tustreams_report_with_spanish_headers() {
        let csv = "Fecha;Plataforma;País;ISRC;Canción;Artista;Reproducciones;Ingresos;Moneda\n\
                   05/04/2023;Deezer;MX;;Tusa;Karol G;1.500;2,75;usd\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        let mapped = map_statement_rows(Aggregator::TuStreams, &data);

        assert!(mapped.report.errors.is_empty(), "{:?}", mapped.report.errors);
        let line = &mapped.rows[0];
        assert_eq!(line.sale_date, ymd(2023, 4, 5));
        assert_eq!(line.platform, "Deezer");
        assert_eq!(line.isrc, None);
        assert_eq!(line.track_title.as_deref(), Some("Tusa"));
        assert_eq!(line.units, 1500);
        assert_eq!(line.revenue, 2.75);
        assert_eq!(line.currency, "USD");
    }

    #[test]
    fn tustreams_revenue_uses_a_decimal_comma() {
        let csv = "Fecha;Plataforma;Canción;Ingresos\n2023-02-01;Spotify;Tema;3,125\n";
        let data = parse_csv(csv.as_bytes()).unwrap();

        let tustreams = map_statement_rows(Aggregator::TuStreams, &data);
        assert_eq!(tustreams.rows[0].revenue, 3.125);

        let csv = "sale_date,platform,track_title,revenue\n2023-02-01,Spotify,Tema,\"3,125\"\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        let generic = map_statement_rows(Aggregator::NoDefinida, &data);
        assert_eq!(generic.rows[0].revenue, 3125.0);
    }

    #[test]
    fn ada_dates_are_month_first() {
        let csv = "Transaction Date,Retailer,Territory,ISRC,Track,Units,Net Amount\n\
                   04/05/2023,Apple Music,US,USRC17607839,Song,3,0.03\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        let mapped = map_statement_rows(Aggregator::Ada, &data);
        assert_eq!(mapped.rows[0].sale_date, ymd(2023, 4, 5));
    }

    #[test]
    fn no_definida_uses_canonical_headers_and_defaults() {
        let csv = "sale_date,platform,track_title\n2023-01-31,YouTube,Intro\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        let mapped = map_statement_rows(Aggregator::NoDefinida, &data);
        let line = &mapped.rows[0];
        assert_eq!(line.territory, DEFAULT_TERRITORY);
        assert_eq!(line.units, 0);
        assert_eq!(line.revenue, 0.0);
    }

    #[test]
    fn rows_without_identity_or_date_are_errors() {
        let csv = "sale_date,platform,track_title,isrc\n\
                   ,Spotify,Intro,\n\
                   2023-01-01,Spotify,,\n\
                   garbage,Spotify,Intro,\n\
                   2023-01-01,Spotify,Intro,\n";
        let data = parse_csv(csv.as_bytes()).unwrap();
        let mapped = map_statement_rows(Aggregator::NoDefinida, &data);

        assert_eq!(mapped.rows.len(), 1);
        assert_eq!(mapped.report.error_count, 3);
        assert_eq!(mapped.report.errors[0].row, 1);
        assert_eq!(mapped.report.errors[1].message, "Row needs an ISRC or a track title");
        assert!(mapped.report.errors[2].message.contains("garbage"));
    }

    #[test]
    fn missing_required_headers_lists_canonical_names() {
        let index = HeaderIndex::new(&["DSP".into(), "ISRC".into()]);
        assert_eq!(missing_required_headers(Aggregator::Virgin, &index), vec!["sale_date"]);
        assert_eq!(
            missing_required_headers(Aggregator::Ada, &index),
            vec!["sale_date", "platform"]
        );
    }
}
