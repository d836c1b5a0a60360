//! CSV import: reading files, matching headers, and converting cell values.
//!
//! Every importable entity declares a table of [`ColumnSpec`]s (canonical
//! field name, the header it is exported under, accepted aliases and the
//! value kind). [`map_columns`] turns one CSV record into a JSON object keyed
//! by canonical field names, ready to deserialize into a create DTO.
//!
//! Statement files are header-keyed per [`Aggregator`](crate::aggregator::Aggregator)
//! instead; see [`statement`].

pub mod isrc;
pub mod lpm;
pub mod statement;
pub mod tustreams;

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::dates::{parse_flexible_date, DateOrder};
use crate::error::CoreError;

/// Maximum number of data rows accepted in a single CSV file.
pub const MAX_IMPORT_ROWS: usize = 50_000;

/// Maximum number of row errors kept in an [`ImportReport`].
pub const MAX_REPORTED_ERRORS: usize = 100;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// A parsed CSV file: header row plus data records.
#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
    /// Data row number of each record in the file (1-based, header
    /// excluded), counting the blank lines that were dropped.
    pub row_numbers: Vec<usize>,
}

impl CsvData {
    pub fn header_index(&self) -> HeaderIndex {
        HeaderIndex::new(&self.headers)
    }

    /// Row number reported for the record at `position`.
    pub fn row_number(&self, position: usize) -> usize {
        self.row_numbers.get(position).copied().unwrap_or(position + 1)
    }
}

/// Parse raw CSV bytes. The delimiter (`,`, `;` or tab) is detected from the
/// header line; invalid UTF-8 is replaced; fully blank records are dropped.
pub fn parse_csv(bytes: &[u8]) -> Result<CsvData, CoreError> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.trim().is_empty() {
        return Err(CoreError::Validation("CSV file is empty".into()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(first_line))
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CoreError::Validation(format!("Invalid CSV header: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    let mut row_numbers = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| CoreError::Validation(format!("Invalid CSV at row {}: {e}", i + 1)))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        // Line 1 is the header, so a record starting on line N is data row N - 1.
        let row = record
            .position()
            .map(|p| p.line().saturating_sub(1) as usize)
            .filter(|row| *row > 0)
            .unwrap_or(i + 1);
        if records.len() == MAX_IMPORT_ROWS {
            return Err(CoreError::Validation(format!(
                "CSV file exceeds the maximum of {MAX_IMPORT_ROWS} rows"
            )));
        }
        records.push(record.iter().map(str::to_string).collect());
        row_numbers.push(row);
    }

    Ok(CsvData {
        headers,
        records,
        row_numbers,
    })
}

fn detect_delimiter(header_line: &str) -> u8 {
    let count = |c: char| header_line.matches(c).count();
    let (semicolons, commas, tabs) = (count(';'), count(','), count('\t'));
    if tabs > commas && tabs > semicolons {
        b'\t'
    } else if semicolons > commas {
        b';'
    } else {
        b','
    }
}

// ---------------------------------------------------------------------------
// Header matching
// ---------------------------------------------------------------------------

/// Normalize a header for comparison: lowercase, accents stripped,
/// punctuation collapsed to single spaces.
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.trim_start_matches('\u{feff}').chars() {
        let c = strip_accent(c.to_lowercase().next().unwrap_or(c));
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Lookup from normalized header name to column position.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new(headers: &[String]) -> Self {
        let mut positions = HashMap::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            // First occurrence wins for duplicated headers.
            positions.entry(normalize_header(header)).or_insert(i);
        }
        Self { positions }
    }

    /// Position of the first alias present in the header row.
    pub fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.positions.get(&normalize_header(alias)).copied())
    }

    /// Trimmed, non-empty cell for the first matching alias.
    pub fn value<'r>(&self, record: &'r [String], aliases: &[&str]) -> Option<&'r str> {
        let pos = self.find(aliases)?;
        record
            .get(pos)
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Column tables
// ---------------------------------------------------------------------------

/// How a cell is converted before it lands in the JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Integer,
    Boolean,
    /// `mm:ss`, `h:mm:ss`, `PT3M45S` or plain seconds.
    Duration,
}

/// One importable/exportable column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Canonical field name (DTO field and database column).
    pub field: &'static str,
    /// Header written on export.
    pub header: &'static str,
    /// Additional headers accepted on import.
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
}

impl ColumnSpec {
    fn lookup(&self, index: &HeaderIndex, record: &[String]) -> Option<String> {
        index
            .value(record, &[self.field, self.header])
            .or_else(|| index.value(record, self.aliases))
            .map(str::to_string)
    }
}

/// Convert one record into a JSON object keyed by canonical field names.
/// Absent or blank cells are omitted. Unparseable values are row errors.
pub fn map_columns(
    columns: &[ColumnSpec],
    index: &HeaderIndex,
    record: &[String],
    order: DateOrder,
) -> Result<Map<String, Value>, String> {
    let mut out = Map::new();
    for column in columns {
        let Some(raw) = column.lookup(index, record) else {
            continue;
        };
        let value = match column.kind {
            FieldKind::Text => Value::String(raw),
            FieldKind::Date => parse_flexible_date(&raw, order)
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .ok_or_else(|| format!("Invalid date '{raw}' in column '{}'", column.header))?,
            FieldKind::Integer => parse_integer(&raw)
                .map(Value::from)
                .ok_or_else(|| format!("Invalid number '{raw}' in column '{}'", column.header))?,
            FieldKind::Boolean => parse_bool(&raw)
                .map(Value::Bool)
                .ok_or_else(|| format!("Invalid yes/no value '{raw}' in column '{}'", column.header))?,
            FieldKind::Duration => parse_duration_secs(&raw)
                .map(Value::from)
                .ok_or_else(|| format!("Invalid duration '{raw}' in column '{}'", column.header))?,
        };
        out.insert(column.field.to_string(), value);
    }
    Ok(out)
}

/// `(field, header)` pairs for CSV export, in table order.
pub fn export_columns(columns: &[ColumnSpec]) -> Vec<(&'static str, &'static str)> {
    columns.iter().map(|c| (c.field, c.header)).collect()
}

// ---------------------------------------------------------------------------
// Value parsing
// ---------------------------------------------------------------------------

/// Which character a source uses as its decimal mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalMark {
    /// Guess per value: a lone `,` followed by exactly three digits is a
    /// thousands separator (`1,234`), otherwise a decimal mark.
    Either,
    /// `,` is always the decimal mark and `.` groups thousands (`1.234,5`).
    Comma,
}

/// Parse a number written with either decimal convention.
///
/// Accepts `1234.56`, `1,234.56`, `1.234,56`, `1234,56`, currency symbols,
/// and accounting negatives `(12.50)`. Empty input yields `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    parse_decimal(raw, DecimalMark::Either)
}

/// [`parse_number`] for a source with a known decimal mark.
pub fn parse_decimal(raw: &str, mark: DecimalMark) -> Option<f64> {
    let trimmed = raw.trim();
    let negative_parens = trimmed.starts_with('(') && trimmed.ends_with(')');
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');
    let normalized = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(comma)) => {
            let commas = cleaned.matches(',').count();
            let decimals = cleaned.len() - comma - 1;
            let int_part = cleaned[..comma].trim_start_matches('-');
            let grouped = decimals == 3 && !int_part.is_empty() && int_part != "0";
            if commas > 1 || (mark == DecimalMark::Either && grouped) {
                cleaned.replace(',', "")
            } else {
                cleaned.replace(',', ".")
            }
        }
        (Some(_), None) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        (Some(dot), None) if mark == DecimalMark::Comma && cleaned.len() - dot - 1 == 3 => {
            cleaned.replace('.', "")
        }
        _ => cleaned,
    };

    let value: f64 = normalized.parse().ok()?;
    Some(if negative_parens { -value.abs() } else { value })
}

/// Parse an integer cell; fractional values are rejected.
///
/// Digit groups of exactly three after a `.` or `,` are thousands
/// separators (`1.500` is fifteen hundred, not one and a half).
pub fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Some(grouped) = parse_grouped_integer(trimmed) {
        return Some(grouped);
    }
    let value = parse_number(trimmed)?;
    (value.fract() == 0.0).then_some(value as i64)
}

fn parse_grouped_integer(raw: &str) -> Option<i64> {
    let groups: Vec<&str> = raw.split(['.', ',']).collect();
    let (first, rest) = groups.split_first()?;
    let first_digits = first.strip_prefix('-').unwrap_or(first);
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if rest.is_empty()
        || !is_digits(first_digits)
        || first_digits.len() > 3
        || !rest.iter().all(|g| g.len() == 3 && is_digits(g))
    {
        return None;
    }
    groups.concat().parse().ok()
}

/// Parse a yes/no cell in English or Spanish.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "si" | "sí" | "s" | "explicit" | "x" => Some(true),
        "no" | "n" | "false" | "0" | "clean" | "not explicit" => Some(false),
        _ => None,
    }
}

/// Parse a track duration into whole seconds.
pub fn parse_duration_secs(raw: &str) -> Option<i64> {
    let value = raw.trim();
    if let Some(iso) = value.strip_prefix("PT").or_else(|| value.strip_prefix("pt")) {
        return parse_iso_duration(iso);
    }
    if value.contains(':') {
        let mut total: i64 = 0;
        for part in value.split(':') {
            let n: i64 = part.trim().parse().ok()?;
            total = total.checked_mul(60)?.checked_add(n)?;
        }
        return Some(total);
    }
    parse_number(value).and_then(whole_seconds)
}

/// Round to whole seconds; `None` when the value does not fit an `i64`.
fn whole_seconds(secs: f64) -> Option<i64> {
    let rounded = secs.round();
    (rounded.is_finite() && rounded.abs() < i64::MAX as f64).then_some(rounded as i64)
}

fn parse_iso_duration(body: &str) -> Option<i64> {
    let mut total = 0.0;
    let mut number = String::new();
    for c in body.chars() {
        match c.to_ascii_uppercase() {
            d if d.is_ascii_digit() || d == '.' => number.push(d),
            unit @ ('H' | 'M' | 'S') => {
                let n: f64 = number.parse().ok()?;
                number.clear();
                total += match unit {
                    'H' => n * 3600.0,
                    'M' => n * 60.0,
                    _ => n,
                };
            }
            _ => return None,
        }
    }
    if !number.is_empty() {
        return None;
    }
    whole_seconds(total)
}

/// Split a multi-artist credit into individual names, preserving order and
/// dropping duplicates (case-insensitive).
///
/// Names split on `,`, `;`, ` & `, ` feat. `, ` ft. ` and ` x `. Spanish
/// ` y ` is not a separator: it is part of act names like "Jesse y Joy".
pub fn split_artists(raw: &str) -> Vec<String> {
    const SEPARATORS: &[&str] = &[" feat. ", " ft. ", " & ", " x "];

    let mut normalized = format!(" {} ", raw.trim());
    for sep in SEPARATORS {
        normalized = replace_case_insensitive(&normalized, sep, ";");
    }

    let mut names: Vec<String> = Vec::new();
    for part in normalized.split([',', ';']) {
        let name = part.trim();
        if name.is_empty() {
            continue;
        }
        if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            names.push(name.to_string());
        }
    }
    names
}

fn replace_case_insensitive(haystack: &str, needle: &str, replacement: &str) -> String {
    let lower = haystack.to_lowercase();
    if lower.len() != haystack.len() {
        // Lowercasing changed byte offsets; fall back to an exact match.
        return haystack.replace(needle, replacement);
    }
    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0;
    while let Some(found) = lower[cursor..].find(needle) {
        let start = cursor + found;
        out.push_str(&haystack[cursor..start]);
        out.push_str(replacement);
        cursor = start + needle.len();
    }
    out.push_str(&haystack[cursor..]);
    out
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// A rejected data row. `row` is 1-based and excludes the header line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Outcome of an import, returned to the UI.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    pub error_count: usize,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub fn new(total_rows: usize) -> Self {
        Self {
            total_rows,
            ..Self::default()
        }
    }

    /// Record a rejected row. Only the first [`MAX_REPORTED_ERRORS`] keep
    /// their message.
    pub fn record_error(&mut self, row: usize, message: impl Into<String>) {
        self.skipped += 1;
        self.error_count += 1;
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(RowError {
                row,
                message: message.into(),
            });
        }
    }
}

/// Rows that mapped cleanly plus the report of those that did not.
#[derive(Debug, Clone)]
pub struct MappedRows<T> {
    pub rows: Vec<T>,
    pub report: ImportReport,
}

/// Apply `map` to every record, collecting successes and row errors.
pub fn map_rows<T, F>(data: &CsvData, mut map: F) -> MappedRows<T>
where
    F: FnMut(&HeaderIndex, &[String]) -> Result<T, String>,
{
    let index = data.header_index();
    let mut report = ImportReport::new(data.records.len());
    let mut rows = Vec::with_capacity(data.records.len());
    for (i, record) in data.records.iter().enumerate() {
        match map(&index, record) {
            Ok(row) => rows.push(row),
            Err(message) => report.record_error(data.row_number(i), message),
        }
    }
    MappedRows { rows, report }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_detects_semicolons_and_strips_bom() {
        let data = parse_csv("\u{feff}ISRC;Título\nESA011700123;Canción\n;\n".as_bytes()).unwrap();
        assert_eq!(data.headers, vec!["ISRC", "Título"]);
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.records[0][1], "Canción");
    }

    #[test]
    fn parse_csv_rejects_empty_input() {
        assert!(parse_csv(b"").is_err());
    }

    #[test]
    fn normalize_header_collapses_punctuation_and_accents() {
        assert_eq!(normalize_header("  Net Revenue (EUR) "), "net revenue eur");
        assert_eq!(normalize_header("País"), "pais");
        assert_eq!(normalize_header("sale_date"), "sale date");
        assert_eq!(normalize_header("(P) Year"), "p year");
    }

    #[test]
    fn header_index_finds_first_matching_alias() {
        let index = HeaderIndex::new(&["Store".into(), "Country".into()]);
        let record = vec!["Spotify".to_string(), "  ".to_string()];
        assert_eq!(index.value(&record, &["DSP", "store"]), Some("Spotify"));
        assert_eq!(index.value(&record, &["Country"]), None);
        assert_eq!(index.find(&["Territory"]), None);
    }

    #[test]
    fn parse_number_handles_both_conventions() {
        assert_eq!(parse_number("1234.56"), Some(1234.56));
        assert_eq!(parse_number("1,234.56"), Some(1234.56));
        assert_eq!(parse_number("1.234,56"), Some(1234.56));
        assert_eq!(parse_number("1234,56"), Some(1234.56));
        assert_eq!(parse_number("0,123"), Some(0.123));
        assert_eq!(parse_number("1,234"), Some(1234.0));
        assert_eq!(parse_number("1.234.567"), Some(1_234_567.0));
        assert_eq!(parse_number("€ 12,50"), Some(12.5));
        assert_eq!(parse_number("(3.25)"), Some(-3.25));
        assert_eq!(parse_number("-0.5"), Some(-0.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
    }

    #[test]
    fn decimal_comma_sources_never_group_with_commas() {
        assert_eq!(parse_decimal("3,125", DecimalMark::Comma), Some(3.125));
        assert_eq!(parse_decimal("3,125", DecimalMark::Either), Some(3125.0));
        assert_eq!(parse_decimal("1.234,5", DecimalMark::Comma), Some(1234.5));
        assert_eq!(parse_decimal("1.500", DecimalMark::Comma), Some(1500.0));
        assert_eq!(parse_decimal("0.25", DecimalMark::Comma), Some(0.25));
    }

    #[test]
    fn parse_integer_rejects_fractions() {
        assert_eq!(parse_integer("1,500"), Some(1500));
        assert_eq!(parse_integer("1.500"), Some(1500));
        assert_eq!(parse_integer("-2.000.000"), Some(-2_000_000));
        assert_eq!(parse_integer("12"), Some(12));
        assert_eq!(parse_integer("12.5"), None);
    }

    #[test]
    fn parse_bool_accepts_spanish() {
        assert_eq!(parse_bool("Sí"), Some(true));
        assert_eq!(parse_bool("explicit"), Some(true));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parse_duration_formats() {
        assert_eq!(parse_duration_secs("3:45"), Some(225));
        assert_eq!(parse_duration_secs("1:02:03"), Some(3723));
        assert_eq!(parse_duration_secs("PT3M45S"), Some(225));
        assert_eq!(parse_duration_secs("PT1H0M5.4S"), Some(3605));
        assert_eq!(parse_duration_secs("225"), Some(225));
        assert_eq!(parse_duration_secs("3:xx"), None);
    }

    #[test]
    fn oversized_durations_are_rejected() {
        assert_eq!(parse_duration_secs("9223372036854775807:59"), None);
        assert_eq!(parse_duration_secs("99999999999999999:00:00"), None);
        assert_eq!(parse_duration_secs("PT99999999999999999999H"), None);
    }

    #[test]
    fn split_artists_handles_features_and_duplicates() {
        assert_eq!(
            split_artists("Rosalía feat. J Balvin, Rosalía; El Guincho"),
            vec!["Rosalía", "J Balvin", "El Guincho"]
        );
        assert_eq!(split_artists("Simon & Garfunkel"), vec!["Simon", "Garfunkel"]);
        assert_eq!(split_artists("Bad Bunny x Jhay Cortez"), vec!["Bad Bunny", "Jhay Cortez"]);
        assert_eq!(split_artists("  "), Vec::<String>::new());
    }

    #[test]
    fn split_artists_keeps_spanish_act_names_whole() {
        assert_eq!(split_artists("Jesse y Joy"), vec!["Jesse y Joy"]);
        assert_eq!(
            split_artists("Jesse y Joy ft. Alejandro Sanz"),
            vec!["Jesse y Joy", "Alejandro Sanz"]
        );
    }

    #[test]
    fn row_errors_point_at_file_rows_past_blank_lines() {
        let data = parse_csv(b"ISRC,Title
USRC17607839,One

bad,Two
,
USRC17607840,Three
").unwrap();
        assert_eq!(data.records.len(), 3);
        assert_eq!(data.row_numbers, vec![1, 3, 5]);

        let mapped = map_rows(&data, |index, record| {
            let isrc = index.value(record, &["ISRC"]).unwrap_or_default();
            if isrc == "bad" {
                Err("Invalid ISRC".to_string())
            } else {
                Ok(isrc.to_string())
            }
        });
        assert_eq!(mapped.rows.len(), 2);
        assert_eq!(mapped.report.errors[0].row, 3);
    }

    #[test]
    fn report_caps_retained_errors() {
        let mut report = ImportReport::new(500);
        for row in 1..=150 {
            report.record_error(row, "bad");
        }
        assert_eq!(report.error_count, 150);
        assert_eq!(report.skipped, 150);
        assert_eq!(report.errors.len(), MAX_REPORTED_ERRORS);
    }

    #[test]
    fn map_columns_converts_kinds() {
        const COLUMNS: &[ColumnSpec] = &[
            ColumnSpec { field: "title", header: "Title", aliases: &["Título"], kind: FieldKind::Text },
            ColumnSpec { field: "release_date", header: "Release Date", aliases: &[], kind: FieldKind::Date },
            ColumnSpec { field: "explicit", header: "Explicit", aliases: &[], kind: FieldKind::Boolean },
            ColumnSpec { field: "duration_seconds", header: "Duration", aliases: &[], kind: FieldKind::Duration },
        ];
        let headers = vec!["Título".into(), "Release Date".into(), "Explicit".into(), "Duration".into()];
        let index = HeaderIndex::new(&headers);
        let record = vec!["Malamente".into(), "30/05/2018".into(), "no".into(), "2:30".into()];

        let map = map_columns(COLUMNS, &index, &record, DateOrder::DayFirst).unwrap();
        assert_eq!(map["title"], "Malamente");
        assert_eq!(map["release_date"], "2018-05-30");
        assert_eq!(map["explicit"], false);
        assert_eq!(map["duration_seconds"], 150);
    }

    #[test]
    fn map_columns_reports_bad_dates() {
        const COLUMNS: &[ColumnSpec] = &[ColumnSpec {
            field: "release_date",
            header: "Release Date",
            aliases: &[],
            kind: FieldKind::Date,
        }];
        let index = HeaderIndex::new(&["Release Date".into()]);
        let err = map_columns(COLUMNS, &index, &["soon".into()], DateOrder::DayFirst).unwrap_err();
        assert!(err.contains("Release Date"));
    }
}
