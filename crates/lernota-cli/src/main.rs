//! CLI application for reading Brazilian invoice documents.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use console::style;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

use lernota_core::models::config::API_KEY_VAR;
use lernota_core::models::{InvoiceRecord, PipelineConfig, Valor};

/// Extract structured metadata from Brazilian invoices (PDF or NFe XML)
#[derive(Parser)]
#[command(name = "lernota")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file (.pdf or .xml)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Path to a pipeline config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model identifier for the AI-assisted stage
    #[arg(long)]
    model: Option<String>,

    /// Request timeout in seconds for the AI-assisted stage
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// JSON record
    Json,
    /// Plain text summary
    Text,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if !cli.input.exists() {
        anyhow::bail!("input file not found: {}", cli.input.display());
    }

    let config = build_config(&cli)?;
    if config.api_key.is_none() {
        debug!("{API_KEY_VAR} not set; PDF extraction will use the pattern fallback");
    }

    let file_name = cli
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let record = lernota_core::extract_invoice(&cli.input, &file_name, &config).await?;

    let output = match cli.format {
        OutputFormat::Json => serde_json::to_string_pretty(&record)?,
        OutputFormat::Text => format_text(&record),
    };

    if let Some(output_path) = &cli.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut loaded = PipelineConfig::from_file(path)?;
            if loaded.api_key.is_none() {
                loaded.api_key = std::env::var(API_KEY_VAR).ok().filter(|k| !k.is_empty());
            }
            loaded
        }
        None => PipelineConfig::from_env(),
    };

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }

    Ok(config)
}

fn format_text(record: &InvoiceRecord) -> String {
    let missing = style("not found").dim().to_string();
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| missing.clone());

    let valor = match &record.valor {
        Some(Valor::Amount(amount)) => amount.to_string(),
        Some(Valor::Text(text)) => text.clone(),
        None => missing.clone(),
    };

    let mut lines = vec![
        format!("Invoice number : {}", field(&record.numero_nota)),
        format!("CNPJ           : {}", field(&record.cnpj)),
        format!("Supplier       : {}", field(&record.fornecedor)),
        format!("Total value    : {}", valor),
        format!("Issue date     : {}", field(&record.data_emissao)),
        format!("Due date       : {}", field(&record.data_vencimento)),
    ];

    if !record.extra.is_empty() {
        lines.push(format!(
            "Extra keys     : {}",
            record
                .extra
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    lines.join("\n")
}
