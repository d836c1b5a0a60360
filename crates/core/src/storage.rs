//! Object-storage keys and upload validation for team documents.

use std::time::Duration;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Largest accepted upload (50 MiB).
pub const MAX_UPLOAD_BYTES: i64 = 50 * 1024 * 1024;

/// Lifetime of presigned upload and download URLs.
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(15 * 60);

/// Longest sanitized file name kept in a key.
pub const MAX_FILE_NAME_CHARS: usize = 128;

pub const CONTENT_TYPE_PDF: &str = "application/pdf";

/// Content types accepted for upload.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    CONTENT_TYPE_PDF,
    "text/csv",
    "text/plain",
    "image/png",
    "image/jpeg",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the declared content type and size of an upload.
pub fn validate_upload(content_type: &str, size_bytes: i64) -> Result<(), CoreError> {
    let base = content_type.split(';').next().unwrap_or_default().trim();
    if !ALLOWED_CONTENT_TYPES.contains(&base) {
        return Err(CoreError::Validation(format!(
            "Unsupported content type '{content_type}'"
        )));
    }
    if size_bytes <= 0 {
        return Err(CoreError::Validation("File is empty".into()));
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "File too large: {size_bytes} bytes (maximum {MAX_UPLOAD_BYTES})"
        )));
    }
    Ok(())
}

/// Whether `bytes` start with the PDF magic number.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Make a file name safe for an object key.
///
/// Characters outside `[A-Za-z0-9._-]` become `_`, runs of `_` collapse,
/// and the result is capped at [`MAX_FILE_NAME_CHARS`]. Never empty.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches(|c| c == '_' || c == '.');
    let capped: String = trimmed.chars().take(MAX_FILE_NAME_CHARS).collect();
    if capped.is_empty() {
        "file".to_string()
    } else {
        capped
    }
}

/// `teams/{team_id}/documents/{object_id}/{sanitized file name}`.
pub fn document_key(team_id: DbId, object_id: &str, file_name: &str) -> String {
    format!(
        "teams/{team_id}/documents/{object_id}/{}",
        sanitize_file_name(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn sanitize_replaces_and_collapses() {
        assert_eq!(sanitize_file_name("Contrato Sony (2023).pdf"), "Contrato_Sony_2023_.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("año   nuevo.pdf"), "a_o_nuevo.pdf");
        assert_eq!(sanitize_file_name("???"), "file");
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "a".repeat(300);
        assert_eq!(sanitize_file_name(&long).len(), MAX_FILE_NAME_CHARS);
    }

    #[test]
    fn document_key_layout() {
        assert_eq!(
            document_key(7, "0b5e", "deal memo.pdf"),
            "teams/7/documents/0b5e/deal_memo.pdf"
        );
    }

    #[test]
    fn upload_validation() {
        assert_matches!(validate_upload("application/pdf", 1024), Ok(()));
        assert_matches!(validate_upload("text/csv; charset=utf-8", 10), Ok(()));
        assert_matches!(validate_upload("application/zip", 10), Err(CoreError::Validation(_)));
        assert_matches!(validate_upload(CONTENT_TYPE_PDF, 0), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_upload(CONTENT_TYPE_PDF, MAX_UPLOAD_BYTES + 1),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn pdf_magic() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(!looks_like_pdf(b"PK\x03\x04"));
    }
}
