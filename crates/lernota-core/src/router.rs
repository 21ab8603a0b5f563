//! Type router: dispatches a document to the PDF chain or the XML reader.

use std::path::Path;
use tracing::info;

use crate::error::{LernotaError, Result};
use crate::extract;
use crate::models::config::PipelineConfig;
use crate::models::record::InvoiceRecord;
use crate::pdf;
use crate::xml;

/// Route a document by the extension of its original name and extract its
/// metadata.
///
/// `.pdf` goes through raw text extraction and the AI-or-fallback chain;
/// `.xml` goes through the structured NFe reader. The comparison is
/// case-insensitive and extension-only - content is never sniffed. Any other
/// extension is an [`LernotaError::UnsupportedFormat`].
pub async fn extract_invoice(
    path: &Path,
    file_name: &str,
    config: &PipelineConfig,
) -> Result<InvoiceRecord> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => Ok(extract_from_pdf(path, config).await),
        "xml" => Ok(extract_from_xml(path)),
        _ => Err(LernotaError::UnsupportedFormat(file_name.to_string())),
    }
}

/// PDF entry point: raw text, then the AI stage with pattern fallback.
///
/// Never fails: an unreadable file degrades to empty raw text, and the chain
/// itself has the fallback as its floor.
pub async fn extract_from_pdf(path: &Path, config: &PipelineConfig) -> InvoiceRecord {
    let raw_text = pdf::extract_raw_text(path);
    info!(
        "processing PDF {} ({} chars of raw text)",
        path.display(),
        raw_text.len()
    );
    extract::extract_with_fallback(&raw_text, config)
        .await
        .into_record()
}

/// XML entry point. See [`xml::extract_from_xml`].
pub fn extract_from_xml(path: &Path) -> InvoiceRecord {
    info!("processing NFe XML {}", path.display());
    xml::extract_from_xml(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn offline_config() -> PipelineConfig {
        PipelineConfig {
            api_key: None,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn rejects_unsupported_extensions() {
        let config = offline_config();
        for name in ["nota.txt", "nota.docx", "nota", "nota.pdf.bak"] {
            let err = extract_invoice(Path::new("/tmp/nota"), name, &config)
                .await
                .unwrap_err();
            assert!(matches!(err, LernotaError::UnsupportedFormat(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn extension_comparison_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NOTA.XML");
        std::fs::write(
            &path,
            r#"<NFe><infNFe><ide><nNF>9</nNF></ide></infNFe></NFe>"#,
        )
        .unwrap();

        let record = extract_invoice(&path, "NOTA.XML", &offline_config())
            .await
            .unwrap();
        assert_eq!(record.numero_nota.as_deref(), Some("9"));
    }

    #[tokio::test]
    async fn unreadable_pdf_degrades_to_an_empty_record() {
        // No credential and no text: the chain bottoms out at the pattern
        // fallback over an empty string.
        let record = extract_invoice(
            Path::new("/nonexistent/nota.pdf"),
            "nota.pdf",
            &offline_config(),
        )
        .await
        .unwrap();
        assert!(record.is_empty());
    }
}
