//! Tabular score ingestion
//!
//! An upload moves through `Upload → Parsed → Validated → Accepted`.
//! Structural problems (no header, missing required columns) stop the
//! session with an error; row problems are carried in the result.
//!
//! # Example
//! ```rust
//! use tcir_engine::ingest::{IngestSession, IngestStage};
//!
//! let csv = "name,ns_t,ha_t,rd_t,ps_t,sd_t,co_t,st_t\nKim,55,50,48,42,52,58,45\n";
//! let mut session = IngestSession::upload(csv);
//! session.parse()?;
//! let with_errors = session.validate()?.has_errors();
//! assert_eq!(session.stage(), IngestStage::Validated { with_errors });
//! let result = session.accept()?;
//! assert_eq!(result.valid_records.len(), 1);
//! # Ok::<(), tcir_engine::ScoringError>(())
//! ```

pub mod table;
pub mod validator;

pub use table::{parse_table, ParsedTable};
pub use validator::{IngestResult, IngestValidator};

use crate::error::{ScoringError, ScoringResult};
use serde::Serialize;
use tracing::debug;

/// Ingest session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum IngestStage {
    Upload,
    Parsed,
    Validated { with_errors: bool },
    Accepted,
}

impl IngestStage {
    fn name(&self) -> &'static str {
        match self {
            IngestStage::Upload => "upload",
            IngestStage::Parsed => "parsed",
            IngestStage::Validated { .. } => "validated",
            IngestStage::Accepted => "accepted",
        }
    }
}

/// One upload being driven through parsing and validation
#[derive(Debug, Clone)]
pub struct IngestSession {
    stage: IngestStage,
    source: String,
    table: Option<ParsedTable>,
    result: Option<IngestResult>,
}

impl IngestSession {
    /// Start a session from raw CSV text
    pub fn upload(source: impl Into<String>) -> Self {
        Self {
            stage: IngestStage::Upload,
            source: source.into(),
            table: None,
            result: None,
        }
    }

    pub fn stage(&self) -> IngestStage {
        self.stage
    }

    fn transition_error(&self, to: &'static str) -> ScoringError {
        ScoringError::InvalidTransition {
            from: self.stage.name(),
            to,
        }
    }

    /// Upload → Parsed
    ///
    /// # Errors
    /// `EmptyInput` when no header row exists; `InvalidTransition` when
    /// called out of order.
    pub fn parse(&mut self) -> ScoringResult<&ParsedTable> {
        if self.stage != IngestStage::Upload {
            return Err(self.transition_error("parsed"));
        }
        let table = parse_table(&self.source).ok_or(ScoringError::EmptyInput)?;
        debug!(columns = table.header.len(), rows = table.rows.len(), "Parsed upload");
        self.stage = IngestStage::Parsed;
        Ok(self.table.insert(table))
    }

    /// Parsed → Validated
    ///
    /// # Errors
    /// `MissingColumns` for structural failures (session stays Parsed);
    /// `InvalidTransition` when called out of order.
    pub fn validate(&mut self) -> ScoringResult<&IngestResult> {
        let table = match (&self.stage, &self.table) {
            (IngestStage::Parsed, Some(table)) => table,
            _ => return Err(self.transition_error("validated")),
        };
        let validator = IngestValidator::for_table(table)?;
        let result = validator.validate(table);
        self.stage = IngestStage::Validated {
            with_errors: result.has_errors(),
        };
        Ok(self.result.insert(result))
    }

    /// Validated → Accepted, handing the result to the caller
    pub fn accept(&mut self) -> ScoringResult<IngestResult> {
        if !matches!(self.stage, IngestStage::Validated { .. }) {
            return Err(self.transition_error("accepted"));
        }
        let result = self
            .result
            .take()
            .ok_or_else(|| self.transition_error("accepted"))?;
        self.stage = IngestStage::Accepted;
        Ok(result)
    }
}

/// Run a full session over CSV text
///
/// # Errors
/// Structural errors only; row errors are returned in `IngestResult::errors`.
pub fn ingest(source: &str) -> ScoringResult<IngestResult> {
    let mut session = IngestSession::upload(source);
    session.parse()?;
    session.validate()?;
    session.accept()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "name,ns_t,ha_t,rd_t,ps_t,sd_t,co_t,st_t\nKim,55,50,48,42,52,58,45\n";

    #[test]
    fn test_session_walks_all_stages() {
        let mut session = IngestSession::upload(VALID);
        assert_eq!(session.stage(), IngestStage::Upload);
        session.parse().unwrap();
        assert_eq!(session.stage(), IngestStage::Parsed);
        session.validate().unwrap();
        assert_eq!(session.stage(), IngestStage::Validated { with_errors: false });
        let result = session.accept().unwrap();
        assert_eq!(session.stage(), IngestStage::Accepted);
        assert_eq!(result.valid_records.len(), 1);
    }

    #[test]
    fn test_out_of_order_transitions_rejected() {
        let mut session = IngestSession::upload(VALID);
        assert!(matches!(
            session.validate(),
            Err(ScoringError::InvalidTransition { from: "upload", to: "validated" })
        ));
        assert!(session.accept().is_err());
        session.parse().unwrap();
        assert!(session.parse().is_err());
    }

    #[test]
    fn test_validated_with_errors_flag() {
        let mut session = IngestSession::upload(format!("{VALID}Lee,x,50,48,42,52,58,45\n"));
        session.parse().unwrap();
        session.validate().unwrap();
        assert_eq!(session.stage(), IngestStage::Validated { with_errors: true });
    }

    #[test]
    fn test_structural_failure_keeps_parsed_stage() {
        let mut session = IngestSession::upload("name,ns_t\nKim,55\n");
        session.parse().unwrap();
        assert!(matches!(session.validate(), Err(ScoringError::MissingColumns(_))));
        assert_eq!(session.stage(), IngestStage::Parsed);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(ingest(""), Err(ScoringError::EmptyInput)));
    }
}
