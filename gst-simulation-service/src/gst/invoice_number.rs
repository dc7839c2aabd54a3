//! Invoice number format: `INV` + `YYYYMMDD` + 4-digit zero-padded sequence.

use chrono::{Datelike, NaiveDate};

const PREFIX: &str = "INV";
const SEQUENCE_WIDTH: usize = 4;

/// Largest sequence representable in the 4-digit field.
pub const MAX_SEQUENCE: u32 = 9999;

/// Date-scoped prefix, e.g. `INV20261019`.
pub fn invoice_prefix(date: NaiveDate) -> String {
    format!(
        "{}{:04}{:02}{:02}",
        PREFIX,
        date.year(),
        date.month(),
        date.day()
    )
}

pub fn format_invoice_number(prefix: &str, sequence: u32) -> String {
    format!("{}{:0width$}", prefix, sequence, width = SEQUENCE_WIDTH)
}

/// Sequence encoded in the last four characters of an invoice number.
pub fn parse_sequence(invoice_number: &str) -> Option<u32> {
    let start = invoice_number.len().checked_sub(SEQUENCE_WIDTH)?;
    invoice_number.get(start..)?.parse().ok()
}

/// Sequence that follows the latest stored number, or 1 when there is none.
///
/// An unparseable latest number restarts the day at 1.
pub fn sequence_after(latest: Option<&str>) -> u32 {
    latest.and_then(parse_sequence).map_or(1, |seq| seq + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
    }

    #[test]
    fn prefix_is_zero_padded_date() {
        assert_eq!(invoice_prefix(day()), "INV20260307");
    }

    #[test]
    fn sequence_is_padded_to_four_digits() {
        assert_eq!(format_invoice_number("INV20260307", 1), "INV202603070001");
        assert_eq!(format_invoice_number("INV20260307", 42), "INV202603070042");
        assert_eq!(format_invoice_number("INV20260307", 9999), "INV202603079999");
    }

    #[test]
    fn first_invoice_of_the_day_starts_at_one() {
        assert_eq!(sequence_after(None), 1);
    }

    #[test]
    fn next_sequence_increments_latest() {
        assert_eq!(sequence_after(Some("INV202603070007")), 8);
        assert_eq!(sequence_after(Some("INV202603070099")), 100);
    }

    #[test]
    fn parse_rejects_short_or_non_numeric_suffix() {
        assert_eq!(parse_sequence("007"), None);
        assert_eq!(parse_sequence("INV20260307ABCD"), None);
        assert_eq!(sequence_after(Some("INV20260307ABCD")), 1);
    }
}
