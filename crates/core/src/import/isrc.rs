//! ISRC song sheet layout.

use serde_json::{Map, Value};

use super::{map_columns, map_rows, split_artists, ColumnSpec, CsvData, FieldKind, HeaderIndex, MappedRows};
use crate::dates::DateOrder;
use crate::identifiers::normalize_isrc;

/// Every ISRC song column, in export order.
pub const ISRC_SONG_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        field: "isrc",
        header: "ISRC",
        aliases: &["Código ISRC", "ISRC Code"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "title",
        header: "Title",
        aliases: &["Track Title", "Song Title", "Título", "Canción", "Tema"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "version",
        header: "Version",
        aliases: &["Mix Version", "Versión"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "duration_seconds",
        header: "Duration",
        aliases: &["Length", "Track Duration", "Duración"],
        kind: FieldKind::Duration,
    },
    ColumnSpec {
        field: "genre",
        header: "Genre",
        aliases: &["Primary Genre", "Género"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "language",
        header: "Language",
        aliases: &["Lyrics Language", "Idioma"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "release_date",
        header: "Release Date",
        aliases: &["Fecha de lanzamiento", "Fecha"],
        kind: FieldKind::Date,
    },
    ColumnSpec {
        field: "label",
        header: "Label",
        aliases: &["Label Name", "Record Label", "Sello"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "explicit",
        header: "Explicit",
        aliases: &["Parental Advisory", "Explícito"],
        kind: FieldKind::Boolean,
    },
    ColumnSpec {
        field: "iswc",
        header: "ISWC",
        aliases: &[],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "composers",
        header: "Composers",
        aliases: &["Composer", "Compositores", "Compositor", "Autores"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "publisher",
        header: "Publisher",
        aliases: &["Publishers", "Editorial", "Editora"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "notes",
        header: "Notes",
        aliases: &["Comments", "Notas", "Observaciones"],
        kind: FieldKind::Text,
    },
];

/// Headers carrying the artist credit. Not stored on the song row itself.
pub const ARTIST_HEADERS: &[&str] = &["artists", "Artists", "Artist", "Artista", "Artistas", "Main Artist"];

/// A mapped ISRC song row: DTO fields plus the artist names to link.
#[derive(Debug, Clone, PartialEq)]
pub struct IsrcRowData {
    pub fields: Map<String, Value>,
    pub artists: Vec<String>,
}

/// Map one ISRC song record. A valid ISRC is required.
pub fn map_isrc_row(
    index: &HeaderIndex,
    record: &[String],
    order: DateOrder,
) -> Result<IsrcRowData, String> {
    let mut fields = map_columns(ISRC_SONG_COLUMNS, index, record, order)?;

    let raw_isrc = fields
        .get("isrc")
        .and_then(Value::as_str)
        .ok_or("Missing ISRC")?;
    let isrc = normalize_isrc(raw_isrc).ok_or_else(|| format!("Invalid ISRC '{raw_isrc}'"))?;
    fields.insert("isrc".into(), Value::String(isrc));

    if !fields.contains_key("title") {
        return Err("Missing title".to_string());
    }

    let artists = index
        .value(record, ARTIST_HEADERS)
        .map(split_artists)
        .unwrap_or_default();

    Ok(IsrcRowData { fields, artists })
}

/// Map every record of an ISRC song sheet.
pub fn map_isrc_rows(data: &CsvData, order: DateOrder) -> MappedRows<IsrcRowData> {
    map_rows(data, |index, record| map_isrc_row(index, record, order))
}
