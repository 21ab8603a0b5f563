//! Data models for the extraction pipeline.

pub mod config;
pub mod record;

pub use config::PipelineConfig;
pub use record::{InvoiceRecord, Valor};
