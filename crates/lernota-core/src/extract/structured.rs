//! AI-assisted structured extraction via the Gemini generateContent API.
//!
//! One bounded request per call, no retry. Every failure mode here is a
//! [`StructuredError`]; the chain combinator in the parent module maps any of
//! them to the pattern fallback, so callers never see these errors.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::StructuredError;
use crate::models::config::PipelineConfig;
use crate::models::record::InvoiceRecord;

lazy_static! {
    static ref FENCED_JSON: Regex = Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap();
    static ref FENCED_ANY: Regex = Regex::new(r"(?s)```\s*(.*?)\s*```").unwrap();
}

/// Invoice field extractor backed by a generative-text service.
#[derive(Debug)]
pub struct StructuredExtractor {
    client: Client,
    model: String,
    api_base: String,
    api_key: String,
    max_prompt_chars: usize,
}

impl StructuredExtractor {
    /// Build an extractor from the pipeline configuration.
    ///
    /// Fails with [`StructuredError::MissingApiKey`] when no credential is
    /// configured; the chain treats that like any other stage failure.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, StructuredError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(StructuredError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            max_prompt_chars: config.max_prompt_chars,
        })
    }

    /// Single extraction call: prompt the model with a bounded prefix of the
    /// raw text and recover the six-field JSON object from its reply.
    pub async fn extract(&self, raw_text: &str) -> Result<InvoiceRecord, StructuredError> {
        let prompt = self.build_prompt(raw_text);
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        debug!("requesting structured extraction from {}", self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StructuredError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: GenerateContentResponse = response.json().await?;
        let content = reply.text();
        if content.trim().is_empty() {
            return Err(StructuredError::EmptyResponse);
        }

        recover_record(content.trim())
    }

    /// Fixed-schema prompt over at most `max_prompt_chars` characters of the
    /// raw text. Anything beyond that prefix is never sent.
    fn build_prompt(&self, raw_text: &str) -> String {
        let prefix: String = raw_text.chars().take(self.max_prompt_chars).collect();

        format!(
            "Você é um assistente especializado em contabilidade. Analise o texto \
             desta Nota Fiscal e extraia os seguintes dados em formato JSON.\n\
             \n\
             Texto da Nota:\n\
             {prefix}\n\
             \n\
             Retorne APENAS um JSON válido com esta estrutura exata. Não use \
             Markdown (```json). Não inclua nenhuma explicação.\n\
             {{\n\
             \x20   \"numeroNota\": \"string (apenas números)\",\n\
             \x20   \"cnpj\": \"string (XX.XXX.XXX/YYYY-ZZ)\",\n\
             \x20   \"fornecedor\": \"string (nome da razão social)\",\n\
             \x20   \"valor\": 0.00,\n\
             \x20   \"dataEmissao\": \"YYYY-MM-DD\",\n\
             \x20   \"dataVencimento\": \"YYYY-MM-DD\"\n\
             }}"
        )
    }
}

/// Recover the JSON object from a model reply, tier by tier: strip a fenced
/// block if one exists, try a direct parse, then try the substring between
/// the first `{` and the last `}`.
pub fn recover_record(content: &str) -> Result<InvoiceRecord, StructuredError> {
    let content = strip_fences(content);

    match serde_json::from_str(content) {
        Ok(record) => Ok(record),
        Err(_) => {
            let start = content.find('{');
            let end = content.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str(&content[start..=end])
                        .map_err(|_| json_recovery_error(content))
                }
                _ => Err(json_recovery_error(content)),
            }
        }
    }
}

/// Innermost content of the first fence pair, with or without a language
/// tag. Text without a fence pair passes through unchanged.
fn strip_fences(content: &str) -> &str {
    if !content.contains("```") {
        return content;
    }
    if let Some(caps) = FENCED_JSON.captures(content) {
        return caps.get(1).unwrap().as_str();
    }
    if let Some(caps) = FENCED_ANY.captures(content) {
        return caps.get(1).unwrap().as_str();
    }
    content
}

fn json_recovery_error(content: &str) -> StructuredError {
    let prefix: String = content.chars().take(100).collect();
    StructuredError::JsonRecovery(format!("{prefix}..."))
}

/// Subset of the generateContent reply the pipeline cares about.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}
