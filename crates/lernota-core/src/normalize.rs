//! Locale normalization helpers shared by the text-based extractors.
//!
//! Brazilian invoices write amounts as `1.234,56` (dot for thousands, comma
//! for decimals) and dates as `dd/mm/yyyy`. The canonical forms are
//! dot-decimal numbers and `yyyy-mm-dd` strings.

/// Convert a Brazilian-locale amount to a dot-decimal number.
///
/// All `.` are removed as grouping separators, then the `,` becomes the
/// decimal point: `"1.250,50"` -> `1250.5`. Returns `None` when the cleaned
/// text is not a number.
pub fn parse_brl_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace('.', "").replace(',', ".");
    cleaned.parse::<f64>().ok()
}

/// Reorder a `dd/mm/yyyy` date to `yyyy-mm-dd`.
///
/// Purely textual: components are swapped as written, zero-padding included,
/// with no calendar validation. Returns `None` unless the input has exactly
/// three `/`-separated components.
pub fn dmy_to_iso(raw: &str) -> Option<String> {
    let mut parts = raw.trim().split('/');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || day.is_empty() || month.is_empty() || year.is_empty() {
        return None;
    }
    Some(format!("{year}-{month}-{day}"))
}

/// Trim leading zeros from a digit string, keeping the input when trimming
/// would leave nothing (`"000"` stays `"000"`).
pub fn trim_leading_zeros(raw: &str) -> &str {
    let trimmed = raw.trim_start_matches('0');
    if trimmed.is_empty() { raw } else { trimmed }
}
