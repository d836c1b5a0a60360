//! LPM (label/product metadata) sheet layout.
//!
//! One row per track: product-level columns repeat for every track of a
//! release. The table below drives both import (header matching and value
//! conversion) and export (column order and headers).

use serde_json::{Map, Value};

use super::{map_columns, map_rows, split_artists, ColumnSpec, CsvData, FieldKind, HeaderIndex, MappedRows};
use crate::dates::DateOrder;
use crate::identifiers::{normalize_isrc, normalize_upc};

/// Every LPM column, in export order.
pub const LPM_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        field: "upc",
        header: "UPC",
        aliases: &["EAN", "Barcode", "Código de barras"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "catalog_number",
        header: "Catalog Number",
        aliases: &["Cat No", "Catalog #", "Número de catálogo", "Referencia"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "release_title",
        header: "Release Title",
        aliases: &["Album", "Album Title", "Título del lanzamiento", "Álbum"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "release_version",
        header: "Release Version",
        aliases: &["Album Version", "Versión del lanzamiento"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "release_artist",
        header: "Release Artist",
        aliases: &["Album Artist", "Main Artist", "Artista principal"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "label_name",
        header: "Label",
        aliases: &["Label Name", "Record Label", "Sello"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "release_type",
        header: "Release Type",
        aliases: &["Product Type", "Tipo de lanzamiento"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "release_format",
        header: "Release Format",
        aliases: &["Format", "Formato"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "genre",
        header: "Genre",
        aliases: &["Primary Genre", "Género"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "subgenre",
        header: "Subgenre",
        aliases: &["Secondary Genre", "Subgénero"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "release_date",
        header: "Release Date",
        aliases: &["Digital Release Date", "Street Date", "Fecha de lanzamiento"],
        kind: FieldKind::Date,
    },
    ColumnSpec {
        field: "original_release_date",
        header: "Original Release Date",
        aliases: &["Fecha de lanzamiento original"],
        kind: FieldKind::Date,
    },
    ColumnSpec {
        field: "pre_order_date",
        header: "Pre-order Date",
        aliases: &["Preorder Date", "Fecha de preventa"],
        kind: FieldKind::Date,
    },
    ColumnSpec {
        field: "p_line_year",
        header: "P Line Year",
        aliases: &["(P) Year", "Año P"],
        kind: FieldKind::Integer,
    },
    ColumnSpec {
        field: "p_line_text",
        header: "P Line",
        aliases: &["(P) Line", "P Line Text", "Línea P"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "c_line_year",
        header: "C Line Year",
        aliases: &["(C) Year", "Año C"],
        kind: FieldKind::Integer,
    },
    ColumnSpec {
        field: "c_line_text",
        header: "C Line",
        aliases: &["(C) Line", "C Line Text", "Línea C"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "territories",
        header: "Territories",
        aliases: &["Territory Rights", "Territorios"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "excluded_territories",
        header: "Excluded Territories",
        aliases: &["Territorios excluidos"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "price_tier",
        header: "Price Tier",
        aliases: &["Price Code", "Precio"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "explicit_content",
        header: "Explicit",
        aliases: &["Parental Advisory", "Release Explicit", "Explícito"],
        kind: FieldKind::Boolean,
    },
    ColumnSpec {
        field: "language",
        header: "Language",
        aliases: &["Release Language", "Idioma"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "total_volumes",
        header: "Total Volumes",
        aliases: &["Volumes", "Discos"],
        kind: FieldKind::Integer,
    },
    ColumnSpec {
        field: "total_tracks",
        header: "Total Tracks",
        aliases: &["Track Count", "Número de pistas"],
        kind: FieldKind::Integer,
    },
    ColumnSpec {
        field: "artwork_file",
        header: "Artwork File",
        aliases: &["Cover Art", "Artwork", "Portada"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "dsp_exclusions",
        header: "Excluded Stores",
        aliases: &["DSP Exclusions", "Tiendas excluidas"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "aggregator",
        header: "Aggregator",
        aliases: &["Distributor", "Distribuidora", "Agregador"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "delivery_status",
        header: "Delivery Status",
        aliases: &["Status", "Estado"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "notes",
        header: "Notes",
        aliases: &["Comments", "Notas", "Observaciones"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "isrc",
        header: "ISRC",
        aliases: &["Track ISRC"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "track_title",
        header: "Track Title",
        aliases: &["Title", "Song Title", "Título", "Canción"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "track_version",
        header: "Track Version",
        aliases: &["Version", "Mix Version", "Versión"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "track_artist",
        header: "Track Artist",
        aliases: &["Artist", "Artista"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "featured_artists",
        header: "Featured Artists",
        aliases: &["Featuring", "Feat", "Artistas invitados"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "track_number",
        header: "Track Number",
        aliases: &["Track No", "Track #", "Número de pista"],
        kind: FieldKind::Integer,
    },
    ColumnSpec {
        field: "volume_number",
        header: "Volume Number",
        aliases: &["Disc Number", "Volume", "Disco"],
        kind: FieldKind::Integer,
    },
    ColumnSpec {
        field: "duration_seconds",
        header: "Duration",
        aliases: &["Track Duration", "Length", "Duración"],
        kind: FieldKind::Duration,
    },
    ColumnSpec {
        field: "track_genre",
        header: "Track Genre",
        aliases: &["Género de pista"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "track_language",
        header: "Track Language",
        aliases: &["Lyrics Language", "Idioma de la letra"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "track_explicit",
        header: "Track Explicit",
        aliases: &["Track Parental Advisory", "Pista explícita"],
        kind: FieldKind::Boolean,
    },
    ColumnSpec {
        field: "preview_start_seconds",
        header: "Preview Start",
        aliases: &["Preview Start Time", "Clip Start", "Inicio de preview"],
        kind: FieldKind::Duration,
    },
    ColumnSpec {
        field: "composers",
        header: "Composers",
        aliases: &["Composer", "Compositores", "Compositor"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "lyricists",
        header: "Lyricists",
        aliases: &["Lyricist", "Letristas", "Autor"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "arrangers",
        header: "Arrangers",
        aliases: &["Arranger", "Arreglistas"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "producers",
        header: "Producers",
        aliases: &["Producer", "Productores"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "publishers",
        header: "Publishers",
        aliases: &["Publisher", "Editorial", "Editoras"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "iswc",
        header: "ISWC",
        aliases: &[],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "track_p_line_year",
        header: "Track P Line Year",
        aliases: &["Track (P) Year"],
        kind: FieldKind::Integer,
    },
    ColumnSpec {
        field: "track_p_line_text",
        header: "Track P Line",
        aliases: &["Track (P) Line"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "audio_file",
        header: "Audio File",
        aliases: &["Audio", "Archivo de audio"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "recording_year",
        header: "Recording Year",
        aliases: &["Año de grabación"],
        kind: FieldKind::Integer,
    },
    ColumnSpec {
        field: "recording_country",
        header: "Recording Country",
        aliases: &["Country of Recording", "País de grabación"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "available_separately",
        header: "Available Separately",
        aliases: &["Sell Separately", "Venta individual"],
        kind: FieldKind::Boolean,
    },
    ColumnSpec {
        field: "primary_artist_spotify_id",
        header: "Spotify Artist ID",
        aliases: &["Spotify ID", "ID Spotify"],
        kind: FieldKind::Text,
    },
    ColumnSpec {
        field: "primary_artist_apple_id",
        header: "Apple Artist ID",
        aliases: &["Apple ID", "Apple Music ID", "ID Apple"],
        kind: FieldKind::Text,
    },
];

/// Fields whose values are artist credits.
const ARTIST_FIELDS: &[&str] = &["release_artist", "track_artist", "featured_artists"];

/// A mapped LPM row: DTO fields plus the artist names to link.
#[derive(Debug, Clone, PartialEq)]
pub struct LpmRowData {
    pub fields: Map<String, Value>,
    pub artists: Vec<String>,
}

/// Map one LPM record. The UPC is required; UPC and ISRC are normalized.
pub fn map_lpm_row(
    index: &HeaderIndex,
    record: &[String],
    order: DateOrder,
) -> Result<LpmRowData, String> {
    let mut fields = map_columns(LPM_COLUMNS, index, record, order)?;

    let raw_upc = fields
        .get("upc")
        .and_then(Value::as_str)
        .ok_or("Missing UPC")?;
    let upc = normalize_upc(raw_upc).ok_or_else(|| format!("Invalid UPC '{raw_upc}'"))?;
    fields.insert("upc".into(), Value::String(upc));

    if let Some(raw_isrc) = fields.get("isrc").and_then(Value::as_str) {
        let isrc = normalize_isrc(raw_isrc).ok_or_else(|| format!("Invalid ISRC '{raw_isrc}'"))?;
        fields.insert("isrc".into(), Value::String(isrc));
    }

    let mut artists: Vec<String> = Vec::new();
    for field in ARTIST_FIELDS {
        if let Some(credit) = fields.get(*field).and_then(Value::as_str) {
            for name in split_artists(credit) {
                if !artists.iter().any(|a| a.eq_ignore_ascii_case(&name)) {
                    artists.push(name);
                }
            }
        }
    }

    Ok(LpmRowData { fields, artists })
}

/// Map every record of an LPM sheet.
pub fn map_lpm_rows(data: &CsvData, order: DateOrder) -> MappedRows<LpmRowData> {
    map_rows(data, |index, record| map_lpm_row(index, record, order))
}
