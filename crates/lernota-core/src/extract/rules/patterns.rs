//! Regex patterns for the pattern-based fallback extractor.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Formatted CNPJ: XX.XXX.XXX/YYYY-ZZ.
    pub static ref CNPJ: Regex = Regex::new(
        r"\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}"
    ).unwrap();

    /// Total-amount keyword followed (possibly across lines) by a currency
    /// amount after the R$ marker.
    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"(?is)(?:Valor Total|Total da Nota|Vlr\. Total).*?R\$\s*([\d.,]+)"
    ).unwrap();

    /// Emission-date keyword followed by a dd/mm/yyyy date on the same line.
    pub static ref ISSUE_DATE: Regex = Regex::new(
        r"(?i)(?:Data|Dt\.?)\s*(?:de)?\s*Emiss[ãa]o.*?(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    /// Invoice-number keyword followed by a digit run that may carry
    /// grouping dots.
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)(?:Nota Fiscal|NF-e|N[ºo])\.?\s*([0-9.]+)"
    ).unwrap();
}
