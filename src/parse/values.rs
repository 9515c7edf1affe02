//! Shared amount and date normalizers
//!
//! Every format parser routes monetary text through [`parse_signed_amount`]
//! so the sign convention (debit positive, credit negative) is uniform
//! regardless of which serialization the upload used.

use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDate};
use std::str::FromStr;

/// Date formats attempted after the explicit `YYYYMMDD` check, most common
/// in source exports first
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d %b %Y",
];

/// Parse signed "Dr/Cr" monetary text into a signed decimal
///
/// `"Dr 1000"` → +1000, `"Cr 1000"` → −1000, bare numeric text parses as-is,
/// and anything empty or unparsable coerces to 0. Grouping commas are
/// stripped first (exports use Indian digit grouping, `1,00,000.00`). The
/// marker is accepted as prefix or suffix.
pub fn parse_signed_amount(raw: &str) -> BigDecimal {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return BigDecimal::from(0);
    }

    let (credit, numeric) = if let Some(rest) = lowered.strip_prefix("cr") {
        (true, rest)
    } else if let Some(rest) = lowered.strip_prefix("dr") {
        (false, rest)
    } else if let Some(rest) = lowered.strip_suffix("cr") {
        (true, rest)
    } else if let Some(rest) = lowered.strip_suffix("dr") {
        (false, rest)
    } else {
        (false, lowered.as_str())
    };

    let cleaned = numeric.trim().replace(',', "");
    let value = BigDecimal::from_str(&cleaned).unwrap_or_else(|_| BigDecimal::from(0));
    if credit {
        -value
    } else {
        value
    }
}

/// Parse a date token from any source format
///
/// An 8-digit token is always read as explicit `YYYYMMDD` (the XML export's
/// encoding; generic parsing would misread it). A shorter all-digit token is
/// treated as a spreadsheet serial number. Everything else goes through the
/// fixed format list.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if text.chars().all(|c| c.is_ascii_digit()) {
        if text.len() == 8 {
            let year = text[0..4].parse().ok()?;
            let month = text[4..6].parse().ok()?;
            let day = text[6..8].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
        if let Ok(serial) = text.parse::<i64>() {
            return from_spreadsheet_serial(serial as f64);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Convert a spreadsheet serial number to a date
///
/// Uses `epoch(1899-12-31) + (serial − 1) days`. Known limitation: serials
/// are not corrected for the spreadsheet 1900 leap-year bug, so dates in
/// January/February 1900 land one day off.
pub fn from_spreadsheet_serial(serial: f64) -> Option<NaiveDate> {
    if serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 31)?;
    epoch.checked_add_signed(Duration::days(serial as i64 - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_prefix_is_positive() {
        assert_eq!(parse_signed_amount("Dr 1000"), BigDecimal::from(1000));
    }

    #[test]
    fn credit_prefix_is_negative() {
        assert_eq!(parse_signed_amount("Cr 1000"), BigDecimal::from(-1000));
    }

    #[test]
    fn bare_numbers_parse_as_is() {
        assert_eq!(parse_signed_amount("500"), BigDecimal::from(500));
        assert_eq!(parse_signed_amount("-500"), BigDecimal::from(-500));
    }

    #[test]
    fn empty_and_garbage_coerce_to_zero() {
        assert_eq!(parse_signed_amount(""), BigDecimal::from(0));
        assert_eq!(parse_signed_amount("   "), BigDecimal::from(0));
        assert_eq!(parse_signed_amount("n/a"), BigDecimal::from(0));
    }

    #[test]
    fn grouping_commas_are_stripped() {
        assert_eq!(
            parse_signed_amount("Dr 1,00,000.50"),
            BigDecimal::from_str("100000.50").unwrap()
        );
    }

    #[test]
    fn suffix_markers_are_accepted() {
        assert_eq!(parse_signed_amount("1000 Cr"), BigDecimal::from(-1000));
        assert_eq!(parse_signed_amount("1000 Dr"), BigDecimal::from(1000));
    }

    #[test]
    fn eight_digit_tokens_parse_as_ymd() {
        assert_eq!(
            parse_date("20240315"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        // Not a valid calendar date
        assert_eq!(parse_date("20241301"), None);
    }

    #[test]
    fn common_formats_parse() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date("15-03-2024"), expected);
        assert_eq!(parse_date("15/03/2024"), expected);
    }

    #[test]
    fn short_numeric_tokens_are_serials() {
        // 2 = 1900-01-01 under the 1899-12-31 epoch rule
        assert_eq!(parse_date("2"), NaiveDate::from_ymd_opt(1900, 1, 1));
    }

    #[test]
    fn serial_epoch_rule() {
        assert_eq!(
            from_spreadsheet_serial(1.0),
            NaiveDate::from_ymd_opt(1899, 12, 31)
        );
        assert_eq!(from_spreadsheet_serial(0.0), None);
        assert_eq!(
            from_spreadsheet_serial(45366.0),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
    }
}
