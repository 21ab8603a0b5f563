//! Error types for the lernota-core library.

use thiserror::Error;

/// Main error type for the lernota library.
#[derive(Error, Debug)]
pub enum LernotaError {
    /// File extension is neither `.pdf` nor `.xml`.
    #[error("unsupported file format: {0} (expected .pdf or .xml)")]
    UnsupportedFormat(String),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// NFe XML processing error.
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// AI-assisted extraction error.
    #[error("structured extraction error: {0}")]
    Structured(#[from] StructuredError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF text extraction.
///
/// These never cross the pipeline boundary: every PDF failure is demoted to
/// empty raw text by the extractor itself.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to NFe XML reading.
#[derive(Error, Debug)]
pub enum XmlError {
    /// Malformed XML document.
    #[error("failed to parse XML: {0}")]
    Parse(String),

    /// The mandatory `infNFe` element is missing.
    #[error("infNFe element not found in document")]
    MissingInfNfe,

    /// Could not read the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised inside the AI-assisted extraction stage.
///
/// None of these surface to callers of the pipeline: any of them makes the
/// chain fall back to the pattern-based extractor on the same raw text.
#[derive(Error, Debug)]
pub enum StructuredError {
    /// No API credential configured.
    #[error("missing GOOGLE_API_KEY (set it in the environment or .env)")]
    MissingApiKey,

    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The reply carried no text at all.
    #[error("empty response from model")]
    EmptyResponse,

    /// No JSON object could be recovered from the reply text.
    #[error("could not recover a JSON object from the reply: {0}")]
    JsonRecovery(String),
}

/// Result type for the lernota library.
pub type Result<T> = std::result::Result<T, LernotaError>;
