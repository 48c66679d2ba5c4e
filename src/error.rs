//! Ingestion failure modes. Everything past ingestion degrades per record
//! (unset salary, sentinel career) instead of failing the batch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The batch produced no usable header row under any supported encoding.
    #[error("could not decode batch (attempted encodings: {attempted})")]
    BatchDecode { attempted: &'static str },

    /// The header row is present but required columns are not.
    #[error("batch is missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}
