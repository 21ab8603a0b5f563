//! Core library for Brazilian NFe invoice reading.
//!
//! This crate provides:
//! - Type routing of uploaded documents (PDF vs. NFe XML) by extension
//! - PDF raw text extraction (embedded text layer only, no OCR)
//! - AI-assisted field extraction with a pattern-based fallback chain
//! - Namespace-agnostic structured extraction from NFe XML
//! - The unified six-field `InvoiceRecord` output

pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod pdf;
pub mod router;
pub mod xml;

pub use error::{LernotaError, PdfError, Result, StructuredError, XmlError};
pub use extract::{StructuredOutcome, extract_with_fallback, or_pattern_fallback};
pub use extract::structured::StructuredExtractor;
pub use models::{InvoiceRecord, PipelineConfig, Valor};
pub use router::{extract_from_pdf, extract_from_xml, extract_invoice};
