//! ISRC and UPC/EAN normalization and validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// `CC-XXX-YY-NNNNN` without separators: country, registrant, year, designation.
static ISRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{3}\d{7}$").expect("valid ISRC regex"));

/// Normalize an ISRC (strip separators, uppercase). Returns `None` when the
/// result is not a well-formed ISRC.
pub fn normalize_isrc(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '-' | ' ' | '.' | '_'))
        .collect::<String>()
        .to_uppercase();
    ISRC_RE.is_match(&cleaned).then_some(cleaned)
}

/// Normalize a UPC-A (12 digits) or EAN-13 barcode. Non-digits are dropped.
/// Returns `None` on a wrong length or a bad check digit.
pub fn normalize_upc(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if !matches!(digits.len(), 12 | 13) {
        return None;
    }
    gs1_check_digit_ok(&digits).then_some(digits)
}

/// Validate and normalize an ISRC.
pub fn validate_isrc(raw: &str) -> Result<String, CoreError> {
    normalize_isrc(raw).ok_or_else(|| CoreError::Validation(format!("Invalid ISRC '{raw}'")))
}

/// Validate and normalize a UPC/EAN.
pub fn validate_upc(raw: &str) -> Result<String, CoreError> {
    normalize_upc(raw).ok_or_else(|| CoreError::Validation(format!("Invalid UPC '{raw}'")))
}

/// GS1 mod-10: weights alternate 3,1 starting from the digit left of the
/// check digit.
fn gs1_check_digit_ok(digits: &str) -> bool {
    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    let Some((&check, body)) = values.split_last() else {
        return false;
    };
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();
    (10 - sum % 10) % 10 == check
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn isrc_accepts_hyphenated_and_lowercase() {
        assert_eq!(normalize_isrc("us-rc1-76-07839").as_deref(), Some("USRC17607839"));
        assert_eq!(normalize_isrc("ESA011700123").as_deref(), Some("ESA011700123"));
    }

    #[test]
    fn isrc_rejects_bad_shapes() {
        assert_eq!(normalize_isrc("USRC1760783"), None);
        assert_eq!(normalize_isrc("12RC17607839"), None);
        assert_eq!(normalize_isrc(""), None);
    }

    #[test]
    fn upc_a_and_ean13_check_digits() {
        assert_eq!(normalize_upc("036000291452").as_deref(), Some("036000291452"));
        assert_eq!(normalize_upc("4006381333931").as_deref(), Some("4006381333931"));
        assert_eq!(normalize_upc("0 36000 29145 2").as_deref(), Some("036000291452"));
    }

    #[test]
    fn upc_rejects_wrong_check_digit_or_length() {
        assert_eq!(normalize_upc("036000291453"), None);
        assert_eq!(normalize_upc("12345"), None);
    }

    #[test]
    fn validate_wraps_errors() {
        assert_matches!(validate_isrc("nope"), Err(CoreError::Validation(_)));
        assert_matches!(validate_upc("036000291452"), Ok(ref v) if v == "036000291452");
    }
}
