//! PDF raw text extraction using lopdf and pdf-extract.

use lopdf::Document;
use std::path::Path;
use tracing::{debug, trace};

use crate::error::PdfError;

/// Extract the embedded text layer of a PDF.
///
/// Pages are visited in document order and their text concatenated with a
/// newline after each page. A page with no extractable text (a scanned image
/// with no text layer) contributes nothing and is skipped. Any failure to
/// open or read the document yields an empty string: callers must treat empty
/// raw text as "no data to extract", never as a hard error.
pub fn extract_raw_text(path: &Path) -> String {
    match page_text_layer(path) {
        Ok(text) if !text.is_empty() => {
            debug!("extracted {} chars from {}", text.len(), path.display());
            text
        }
        Ok(_) => whole_document_text(path),
        Err(err) => {
            debug!("could not read PDF {}: {}", path.display(), err);
            whole_document_text(path)
        }
    }
}

/// Per-page text extraction via lopdf. Pages that fail or carry no text are
/// skipped; only document-level problems are errors.
fn page_text_layer(path: &Path) -> Result<String, PdfError> {
    let mut doc = Document::load(path).map_err(|e| PdfError::Parse(e.to_string()))?;

    // Files encrypted with an empty owner password are still readable.
    if doc.is_encrypted() {
        doc.decrypt("").map_err(|_| PdfError::Encrypted)?;
        debug!("decrypted PDF with empty password");
    }

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(PdfError::NoPages);
    }

    let mut full_text = String::new();
    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) if !text.trim().is_empty() => {
                full_text.push_str(&text);
                full_text.push('\n');
            }
            Ok(_) => trace!("page {} has no text layer, skipping", page_num),
            Err(err) => trace!("page {} text extraction failed: {}", page_num, err),
        }
    }

    Ok(full_text)
}

/// Whole-document pass with pdf-extract, for files lopdf cannot read
/// page-by-page. Still degrades to empty on failure.
fn whole_document_text(path: &Path) -> String {
    match pdf_extract::extract_text(path) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => String::new(),
        Err(err) => {
            debug!("pdf-extract failed on {}: {}", path.display(), err);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_empty_text() {
        let text = extract_raw_text(Path::new("/nonexistent/invoice.pdf"));
        assert_eq!(text, "");
    }

    #[test]
    fn non_pdf_bytes_yield_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a.pdf");
        std::fs::write(&path, b"plain text, no PDF header").unwrap();

        assert_eq!(extract_raw_text(&path), "");
    }

    #[test]
    fn page_layer_reports_parse_errors() {
        let err = page_text_layer(Path::new("/nonexistent/invoice.pdf")).unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }
}
