//! Field extraction from raw invoice text.
//!
//! Two strategies share one input and one output shape: the AI-assisted
//! extractor and the pattern-based fallback. The chain tries the AI stage
//! once and, on any failure, runs the fallback on the same text. The branch
//! taken is an explicit outcome, not a side effect of error propagation.

pub mod rules;
pub mod structured;

use tracing::warn;

use crate::error::StructuredError;
use crate::models::config::PipelineConfig;
use crate::models::record::InvoiceRecord;
use structured::StructuredExtractor;

/// Which strategy produced the record.
#[derive(Debug)]
pub enum StructuredOutcome {
    /// The AI stage answered with a recoverable JSON object.
    Structured(InvoiceRecord),
    /// The AI stage failed; the record comes from the pattern fallback.
    Fallback {
        record: InvoiceRecord,
        reason: StructuredError,
    },
}

impl StructuredOutcome {
    /// The record, whichever branch produced it.
    pub fn into_record(self) -> InvoiceRecord {
        match self {
            Self::Structured(record) => record,
            Self::Fallback { record, .. } => record,
        }
    }

    /// True when the fallback branch was taken.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Fallback combinator: keep a successful primary result, otherwise run the
/// pattern extractor over the same text and carry the failure reason along.
pub fn or_pattern_fallback(
    primary: Result<InvoiceRecord, StructuredError>,
    text: &str,
) -> StructuredOutcome {
    match primary {
        Ok(record) => StructuredOutcome::Structured(record),
        Err(reason) => StructuredOutcome::Fallback {
            record: rules::extract_record(text),
            reason,
        },
    }
}

/// Full text-extraction chain: AI stage first, pattern fallback on any
/// failure (missing credential included). This never fails; an empty record
/// is the floor.
pub async fn extract_with_fallback(text: &str, config: &PipelineConfig) -> StructuredOutcome {
    let primary = match StructuredExtractor::from_config(config) {
        Ok(extractor) => extractor.extract(text).await,
        Err(err) => Err(err),
    };

    let outcome = or_pattern_fallback(primary, text);
    if let StructuredOutcome::Fallback { reason, .. } = &outcome {
        warn!("structured extraction failed ({reason}), used pattern fallback");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "CNPJ: 12.345.678/0001-99\nDATA DE EMISSÃO: 15/05/2024";

    #[test]
    fn failure_yields_the_fallback_record() {
        let outcome = or_pattern_fallback(Err(StructuredError::MissingApiKey), TEXT);

        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_record(), rules::extract_record(TEXT));
    }

    #[test]
    fn failure_reason_is_carried() {
        let outcome = or_pattern_fallback(Err(StructuredError::EmptyResponse), TEXT);
        match outcome {
            StructuredOutcome::Fallback { reason, .. } => {
                assert!(matches!(reason, StructuredError::EmptyResponse));
            }
            StructuredOutcome::Structured(_) => panic!("expected the fallback branch"),
        }
    }

    #[test]
    fn success_passes_through_untouched() {
        let record = InvoiceRecord {
            fornecedor: Some("ACME LTDA".to_string()),
            ..Default::default()
        };
        let outcome = or_pattern_fallback(Ok(record.clone()), TEXT);

        assert!(!outcome.is_fallback());
        assert_eq!(outcome.into_record(), record);
    }

    #[tokio::test]
    async fn chain_without_credential_equals_the_fallback() {
        let config = PipelineConfig {
            api_key: None,
            ..Default::default()
        };

        let outcome = extract_with_fallback(TEXT, &config).await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_record(), rules::extract_record(TEXT));
    }
}
