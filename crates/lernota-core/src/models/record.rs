//! The unified invoice record produced by every extraction path.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Total invoice value.
///
/// The wire shape differs per extraction path and is kept that way on
/// purpose: the XML reader emits `vNF` verbatim as a string (`"150.00"`),
/// while the pattern fallback and the AI stage produce a plain number
/// (`1250.5`). Consumers must accept both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Valor {
    /// Dot-decimal amount (pattern fallback, AI reply).
    Amount(f64),
    /// Verbatim decimal text (NFe XML `vNF`).
    Text(String),
}

/// Structured metadata extracted from one invoice document.
///
/// The record is partial by design: any subset of the six fields may be
/// absent, and absence always means "not found". Absent fields are omitted
/// from serialization, never emitted as `null`. A record is built fresh per
/// extraction call and never mutated after being returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Invoice number, digits only on the text paths.
    #[serde(rename = "numeroNota", skip_serializing_if = "Option::is_none")]
    pub numero_nota: Option<String>,

    /// Supplier tax id, formatted `XX.XXX.XXX/YYYY-ZZ` or raw digits
    /// depending on the source document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,

    /// Supplier legal name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fornecedor: Option<String>,

    /// Total invoice value. See [`Valor`] for the cross-path type split.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor: Option<Valor>,

    /// Issue date, `YYYY-MM-DD`.
    #[serde(rename = "dataEmissao", skip_serializing_if = "Option::is_none")]
    pub data_emissao: Option<String>,

    /// Due date, `YYYY-MM-DD`.
    #[serde(rename = "dataVencimento", skip_serializing_if = "Option::is_none")]
    pub data_vencimento: Option<String>,

    /// Keys outside the recognized six. The AI reply is not validated
    /// against the schema, so anything extra it returns passes through
    /// untouched. The pipeline's own logic never populates this.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl InvoiceRecord {
    /// Record with no fields at all. Valid output for a document where
    /// nothing could be found.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when none of the six fields was found and no extra keys exist.
    pub fn is_empty(&self) -> bool {
        self.numero_nota.is_none()
            && self.cnpj.is_none()
            && self.fornecedor.is_none()
            && self.valor.is_none()
            && self.data_emissao.is_none()
            && self.data_vencimento.is_none()
            && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn absent_fields_are_omitted() {
        let record = InvoiceRecord {
            cnpj: Some("12.345.678/0001-99".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"cnpj": "12.345.678/0001-99"}));
    }

    #[test]
    fn valor_keeps_wire_shape_per_path() {
        let from_rules = InvoiceRecord {
            valor: Some(Valor::Amount(1250.5)),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&from_rules).unwrap(),
            r#"{"valor":1250.5}"#
        );

        let from_xml = InvoiceRecord {
            valor: Some(Valor::Text("150.00".to_string())),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&from_xml).unwrap(),
            r#"{"valor":"150.00"}"#
        );
    }

    #[test]
    fn extra_keys_survive_a_round_trip() {
        let reply = r#"{"numeroNota":"42","observacao":"sem ressalvas"}"#;
        let record: InvoiceRecord = serde_json::from_str(reply).unwrap();

        assert_eq!(record.numero_nota.as_deref(), Some("42"));
        assert_eq!(
            record.extra.get("observacao"),
            Some(&Value::String("sem ressalvas".to_string()))
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"numeroNota": "42", "observacao": "sem ressalvas"})
        );
    }

    #[test]
    fn null_deserializes_as_absent() {
        let record: InvoiceRecord =
            serde_json::from_str(r#"{"cnpj":null,"fornecedor":"ACME"}"#).unwrap();
        assert_eq!(record.cnpj, None);
        assert_eq!(record.fornecedor.as_deref(), Some("ACME"));
    }

    #[test]
    fn empty_record_is_empty() {
        assert!(InvoiceRecord::empty().is_empty());
        assert_eq!(serde_json::to_string(&InvoiceRecord::empty()).unwrap(), "{}");
    }
}
