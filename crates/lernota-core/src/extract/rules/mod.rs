//! Pattern-based fallback extraction from unstructured invoice text.
//!
//! Four independent searches, one per field. Each yields at most one value;
//! a failed search omits its field without affecting the others, so a record
//! with no fields at all is a valid outcome.

pub mod patterns;

use crate::models::record::{InvoiceRecord, Valor};
use crate::normalize::{dmy_to_iso, parse_brl_amount, trim_leading_zeros};
use patterns::{CNPJ, INVOICE_NUMBER, ISSUE_DATE, TOTAL_AMOUNT};
use tracing::debug;

/// First formatted CNPJ in the text.
pub fn extract_cnpj(text: &str) -> Option<String> {
    CNPJ.find(text).map(|m| m.as_str().to_string())
}

/// Total amount after a currency-total keyword, converted from Brazilian
/// locale to dot-decimal. A match that does not convert to a number is
/// discarded, not an error.
pub fn extract_total_amount(text: &str) -> Option<f64> {
    let caps = TOTAL_AMOUNT.captures(text)?;
    parse_brl_amount(&caps[1])
}

/// Issue date after an emission keyword, reordered to `yyyy-mm-dd`.
pub fn extract_issue_date(text: &str) -> Option<String> {
    let caps = ISSUE_DATE.captures(text)?;
    dmy_to_iso(&caps[1])
}

/// Invoice number after a number keyword.
///
/// The capture class admits grouping dots, so `Nº 000.001.234` captures the
/// whole dotted run. Dots are stripped, then leading zeros; when trimming
/// zeros would leave nothing, the dot-stripped value is kept instead.
pub fn extract_invoice_number(text: &str) -> Option<String> {
    let caps = INVOICE_NUMBER.captures(text)?;
    let digits = caps[1].replace('.', "");
    Some(trim_leading_zeros(&digits).to_string())
}

/// Best-effort extraction of all four pattern-matched fields.
pub fn extract_record(text: &str) -> InvoiceRecord {
    let record = InvoiceRecord {
        cnpj: extract_cnpj(text),
        valor: extract_total_amount(text).map(Valor::Amount),
        data_emissao: extract_issue_date(text),
        numero_nota: extract_invoice_number(text),
        ..Default::default()
    };

    debug!(
        "pattern fallback found {} field(s)",
        [
            record.cnpj.is_some(),
            record.valor.is_some(),
            record.data_emissao.is_some(),
            record.numero_nota.is_some(),
        ]
        .iter()
        .filter(|found| **found)
        .count()
    );
    record
}
