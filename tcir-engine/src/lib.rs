//! # TCI scoring and interpretation engine
//!
//! Turns validated TCI score tables into levels, type codes, pair
//! comparisons and personalized narratives:
//! - Score normalization (standardized / percentile conventions)
//! - Temperament and character type codes
//! - Batch ingestion with row-level error reporting
//! - Catalog lookup with generic fallback
//! - Paired (dyadic) comparison and resilience
//! - Individual and paired report assembly

pub mod classifier;
pub mod dyadic;
pub mod error;
pub mod ingest;
pub mod interpret;
pub mod normalizer;
pub mod profile;
pub mod report;

pub use crate::error::{ScoringError, ScoringResult};
pub use classifier::{CombinationKey, TypeCode};
pub use dyadic::{DyadicComparison, GapCategory, ResilienceBand};
pub use ingest::{ingest, IngestResult, IngestSession, IngestStage};
pub use interpret::{InterpretationCatalog, InterpretationRecord, LookupKey, Narrative};
pub use normalizer::{Convention, Level};
pub use profile::{ScoreRecord, SubjectProfile};
pub use report::{IndividualReport, PairReport};
