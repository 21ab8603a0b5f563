//! Structured extraction from NFe XML documents using quick-xml.
//!
//! Traversal is namespace-agnostic: elements are matched by local name only,
//! so issuer-specific namespace URIs (or none at all) never block a lookup.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::warn;

use crate::error::XmlError;
use crate::models::record::{InvoiceRecord, Valor};

/// Extract invoice metadata from an NFe XML file.
///
/// Any failure (unreadable file, malformed document, missing `infNFe`) is
/// demoted to an empty record here at the boundary; see [`read_nfe`] for the
/// fallible inner reader.
pub fn extract_from_xml(path: &Path) -> InvoiceRecord {
    match read_nfe(path) {
        Ok(record) => record,
        Err(err) => {
            warn!("could not read NFe {}: {}", path.display(), err);
            InvoiceRecord::empty()
        }
    }
}

/// Parse an NFe document and read the fields under its first `infNFe`.
///
/// The four subtrees `ide`, `emit`, `total/ICMSTot` and `cobr/dup` are each
/// optional and read independently. A child element missing inside a present
/// subtree yields an empty string for that field (unlike the text-based
/// paths, which omit the key); `dhEmi` contributes `dataEmissao` only when
/// non-empty. `vNF` is emitted verbatim, not locale-converted. A `cobr`
/// block is present only on invoices billed via installment duplicates, so
/// its absence is normal.
pub fn read_nfe(path: &Path) -> Result<InvoiceRecord, XmlError> {
    let file = File::open(path)?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    let mut buf = Vec::new();

    // Path of local names from the root down to the current element.
    let mut path_names: Vec<String> = Vec::new();
    // Length of `path_names` just after the first infNFe was pushed.
    let mut inf_depth: Option<usize> = None;
    let mut fields = NfeFields::default();
    let mut dup_count = 0usize;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| XmlError::Parse(e.to_string()))?
        {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                path_names.push(name);

                if inf_depth.is_none() && path_names.last().map(String::as_str) == Some("infNFe") {
                    inf_depth = Some(path_names.len());
                } else if let Some(depth) = inf_depth {
                    fields.enter(&path_names[depth..], &mut dup_count);
                }
            }
            Event::Empty(e) => {
                if let Some(depth) = inf_depth {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    path_names.push(name);
                    fields.enter(&path_names[depth..], &mut dup_count);
                    path_names.pop();
                }
            }
            Event::Text(t) => {
                if let Some(depth) = inf_depth {
                    let text = t
                        .unescape()
                        .map_err(|e| XmlError::Parse(e.to_string()))?
                        .into_owned();
                    fields.text(&path_names[depth..], dup_count, text);
                }
            }
            Event::CData(t) => {
                if let Some(depth) = inf_depth {
                    let text = String::from_utf8_lossy(&t).into_owned();
                    fields.text(&path_names[depth..], dup_count, text);
                }
            }
            Event::End(_) => {
                path_names.pop();
                // The first infNFe closed; nothing after it matters.
                if let Some(depth) = inf_depth {
                    if path_names.len() < depth {
                        break;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if inf_depth.is_none() {
        return Err(XmlError::MissingInfNfe);
    }

    Ok(fields.into_record())
}

/// Raw captures from the subtrees of one `infNFe` element.
#[derive(Debug, Default)]
struct NfeFields {
    saw_ide: bool,
    saw_emit: bool,
    saw_icms_tot: bool,
    saw_dup: bool,
    n_nf: Option<String>,
    dh_emi: Option<String>,
    cnpj: Option<String>,
    x_nome: Option<String>,
    v_nf: Option<String>,
    d_venc: Option<String>,
}

impl NfeFields {
    /// Mark subtree presence for an element opened at `rel` (the path
    /// relative to `infNFe`, element included).
    fn enter(&mut self, rel: &[String], dup_count: &mut usize) {
        match rel_names(rel).as_slice() {
            ["ide"] => self.saw_ide = true,
            ["emit"] => self.saw_emit = true,
            ["total", "ICMSTot"] => self.saw_icms_tot = true,
            ["cobr", "dup"] => {
                *dup_count += 1;
                self.saw_dup = true;
            }
            _ => {}
        }
    }

    /// Capture text for a leaf at `rel`. The first occurrence of each leaf
    /// wins; the due date is read from the first duplicate only.
    fn text(&mut self, rel: &[String], dup_count: usize, text: String) {
        let slot = match rel_names(rel).as_slice() {
            ["ide", "nNF"] => &mut self.n_nf,
            ["ide", "dhEmi"] => &mut self.dh_emi,
            ["emit", "CNPJ"] => &mut self.cnpj,
            ["emit", "xNome"] => &mut self.x_nome,
            ["total", "ICMSTot", "vNF"] => &mut self.v_nf,
            ["cobr", "dup", "dVenc"] if dup_count == 1 => &mut self.d_venc,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(text);
        }
    }

    fn into_record(self) -> InvoiceRecord {
        let mut record = InvoiceRecord::empty();

        if self.saw_ide {
            record.numero_nota = Some(self.n_nf.unwrap_or_default());
            let dh_emi = self.dh_emi.unwrap_or_default();
            if !dh_emi.is_empty() {
                // YYYY-MM-DDTHH:MM:SS-OFFSET -> YYYY-MM-DD
                record.data_emissao =
                    Some(dh_emi.split('T').next().unwrap_or_default().to_string());
            }
        }

        if self.saw_emit {
            record.cnpj = Some(self.cnpj.unwrap_or_default());
            record.fornecedor = Some(self.x_nome.unwrap_or_default());
        }

        if self.saw_icms_tot {
            record.valor = Some(Valor::Text(self.v_nf.unwrap_or_default()));
        }

        if self.saw_dup {
            record.data_vencimento = Some(self.d_venc.unwrap_or_default());
        }

        record
    }
}

fn rel_names(rel: &[String]) -> Vec<&str> {
    rel.iter().map(String::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const NFE_BODY: &str = r#"
        <NFe>
            <infNFe Id="NFe35180404040404040404550010000000011000000001">
                <ide>
                    <nNF>12345</nNF>
                    <dhEmi>2023-10-27T14:30:00-03:00</dhEmi>
                </ide>
                <emit>
                    <CNPJ>12345678000199</CNPJ>
                    <xNome>Test Vendor Ltd</xNome>
                </emit>
                <total>
                    <ICMSTot>
                        <vNF>150.00</vNF>
                    </ICMSTot>
                </total>
            </infNFe>
        </NFe>"#;

    fn write_xml(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn expected_record() -> InvoiceRecord {
        InvoiceRecord {
            numero_nota: Some("12345".to_string()),
            cnpj: Some("12345678000199".to_string()),
            fornecedor: Some("Test Vendor Ltd".to_string()),
            valor: Some(Valor::Text("150.00".to_string())),
            data_emissao: Some("2023-10-27".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn reads_namespaced_document() {
        let dir = TempDir::new().unwrap();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">{NFE_BODY}</nfeProc>"#
        );
        let path = write_xml(&dir, "nota.xml", &xml);

        let record = read_nfe(&path).unwrap();
        assert_eq!(record, expected_record());
        // No cobr block: the due-date key must be absent, not empty.
        assert_eq!(record.data_vencimento, None);
    }

    #[test]
    fn extraction_is_invariant_under_namespace_choice() {
        let dir = TempDir::new().unwrap();

        let without_ns = format!(r#"<nfeProc versao="4.00">{NFE_BODY}</nfeProc>"#);
        let with_prefix = format!(
            r#"<nfe:nfeProc xmlns:nfe="http://www.portalfiscal.inf.br/nfe">{}</nfe:nfeProc>"#,
            NFE_BODY
                .replace("<", "<nfe:")
                .replace("<nfe:/", "</nfe:")
        );

        let plain = read_nfe(&write_xml(&dir, "plain.xml", &without_ns)).unwrap();
        let prefixed = read_nfe(&write_xml(&dir, "prefixed.xml", &with_prefix)).unwrap();

        assert_eq!(plain, expected_record());
        assert_eq!(prefixed, expected_record());
    }

    #[test]
    fn due_date_comes_from_the_first_duplicate() {
        let dir = TempDir::new().unwrap();
        let xml = r#"<NFe><infNFe>
            <cobr>
                <dup><nDup>001</nDup><dVenc>2024-06-10</dVenc></dup>
                <dup><nDup>002</nDup><dVenc>2024-07-10</dVenc></dup>
            </cobr>
        </infNFe></NFe>"#;
        let path = write_xml(&dir, "parcelada.xml", xml);

        let record = read_nfe(&path).unwrap();
        assert_eq!(record.data_vencimento.as_deref(), Some("2024-06-10"));
    }

    #[test]
    fn missing_child_in_present_subtree_is_an_empty_string() {
        let dir = TempDir::new().unwrap();
        let xml = r#"<NFe><infNFe>
            <emit><xNome>Sem CNPJ SA</xNome></emit>
        </infNFe></NFe>"#;
        let path = write_xml(&dir, "incompleta.xml", xml);

        let record = read_nfe(&path).unwrap();
        assert_eq!(record.cnpj.as_deref(), Some(""));
        assert_eq!(record.fornecedor.as_deref(), Some("Sem CNPJ SA"));
        // ide subtree absent entirely: its keys are omitted.
        assert_eq!(record.numero_nota, None);
    }

    #[test]
    fn missing_dh_emi_omits_the_issue_date() {
        let dir = TempDir::new().unwrap();
        let xml = r#"<NFe><infNFe><ide><nNF>77</nNF></ide></infNFe></NFe>"#;
        let path = write_xml(&dir, "sem-data.xml", xml);

        let record = read_nfe(&path).unwrap();
        assert_eq!(record.numero_nota.as_deref(), Some("77"));
        assert_eq!(record.data_emissao, None);
    }

    #[test]
    fn missing_inf_nfe_is_an_error_demoted_at_the_boundary() {
        let dir = TempDir::new().unwrap();
        let path = write_xml(&dir, "vazia.xml", "<root><other/></root>");

        assert!(matches!(read_nfe(&path), Err(XmlError::MissingInfNfe)));
        assert!(extract_from_xml(&path).is_empty());
    }

    #[test]
    fn malformed_document_is_demoted_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_xml(&dir, "quebrada.xml", "<NFe><infNFe><ide");

        assert!(extract_from_xml(&path).is_empty());
    }

    #[test]
    fn unreadable_file_is_demoted_to_empty() {
        assert!(extract_from_xml(Path::new("/nonexistent/nota.xml")).is_empty());
    }
}
