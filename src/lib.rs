//! Mining pipeline for scraped Computrabajo job postings: salary
//! normalization, an engineering-domain filter, skill detection against a
//! fixed catalogue, tiered career classification, SQLite persistence and
//! TTL-cached aggregate statistics.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod records;
pub mod stats;
pub mod text;

pub use cache::StatsCache;
pub use error::IngestError;
pub use pipeline::classify_batch;
pub use records::{AuditSummary, BatchOutput, ClassifiedRecord, NormalizedRecord, RawRecord};
