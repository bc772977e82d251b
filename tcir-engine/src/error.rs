//! Error types for tcir-engine
//!
//! Only structural and programmer errors surface as `Err`. Row-level
//! validation problems are accumulated as data in `IngestResult::errors`
//! and lookup misses are `Resolution::NoInterpretation`.

use thiserror::Error;

/// Scoring engine error type
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Unknown scoring convention name, or a profile used under the
    /// other convention
    #[error("Invalid convention: {0}")]
    InvalidConvention(String),

    /// Non-finite score where a number is required
    #[error("Invalid score for {scale}: {value}")]
    InvalidScore { scale: String, value: f64 },

    /// Composite code requested over an empty level sequence
    #[error("Composite code requires at least one level")]
    EmptyComposite,

    /// Required columns absent from the header (batch-fatal)
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Input had no header row
    #[error("Input contains no header row")]
    EmptyInput,

    /// Ingest session driven out of order
    #[error("Invalid ingest transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    /// Catalog file could not be interpreted
    #[error("Catalog format error: {0}")]
    CatalogFormat(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// tcir-common error
    #[error("Common error: {0}")]
    Common(#[from] tcir_common::Error),
}

/// Result type for scoring operations
pub type ScoringResult<T> = Result<T, ScoringError>;
