//! Row validation for tabular score uploads
//!
//! # Validation rules
//! 1. **Structure**: `name` and all seven `<scale>_t` columns must be
//!    present. Missing columns fail the whole batch with one error that
//!    lists every missing name.
//! 2. **Quoting**: a row whose quoted field never closes is rejected;
//!    the reader resumes on the next line.
//! 3. **Name**: empty name rejects the row.
//! 4. **Standardized scores**: every `<scale>_t` must be numeric. Any
//!    invalid score rejects the row; all offending scales are named in a
//!    single message.
//! 5. **Percentiles**: `<scale>_p` is used when numeric and within
//!    [0, 100], otherwise back-filled from the T-score.
//! 6. **Subscales**: optional; non-numeric values are dropped silently.
//!
//! Rows are validated independently. Output order always follows input
//! order so error lists are stable.

use super::table::{ParsedTable, TableRow};
use crate::error::{ScoringError, ScoringResult};
use crate::normalizer::percentile_from_standardized;
use crate::profile::{ScaleScore, ScoreRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tcir_common::scales::{required_columns, subscale_owner, ScaleCode, NAME_COLUMN};
use tracing::{debug, info, warn};

const PERCENTILE_MIN: f64 = 0.0;
const PERCENTILE_MAX: f64 = 100.0;

/// Outcome of validating a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestResult {
    /// Rows that passed validation, in input order
    pub valid_records: Vec<ScoreRecord>,
    /// Human-readable row-scoped messages, in input order
    pub errors: Vec<String>,
}

impl IngestResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Find a record by subject name (exact match after trimming)
    pub fn record(&self, name: &str) -> Option<&ScoreRecord> {
        let name = name.trim();
        self.valid_records.iter().find(|r| r.name == name)
    }
}

/// Column positions resolved from the normalized header
#[derive(Debug, Clone)]
struct ColumnMap {
    name: usize,
    t_scores: Vec<(ScaleCode, usize)>,
    percentiles: BTreeMap<ScaleCode, usize>,
    /// Subscale columns in header order
    subscales: Vec<(String, usize)>,
}

impl ColumnMap {
    /// # Errors
    /// `ScoringError::MissingColumns` listing every absent required column.
    fn resolve(table: &ParsedTable) -> ScoringResult<Self> {
        let missing: Vec<String> = required_columns()
            .into_iter()
            .filter(|column| table.column(column).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ScoringError::MissingColumns(missing));
        }

        let column = |name: &str| {
            table
                .column(name)
                .ok_or_else(|| ScoringError::MissingColumns(vec![name.to_string()]))
        };
        let name = column(NAME_COLUMN)?;
        let t_scores = ScaleCode::all()
            .iter()
            .map(|scale| Ok((*scale, column(&scale.t_column())?)))
            .collect::<ScoringResult<Vec<_>>>()?;

        let percentiles = ScaleCode::all()
            .iter()
            .filter_map(|scale| table.column(&scale.p_column()).map(|idx| (*scale, idx)))
            .collect();

        let subscales = table
            .header
            .iter()
            .enumerate()
            .filter(|(_, header)| subscale_owner(header).is_some())
            .map(|(idx, header)| (header.clone(), idx))
            .collect();

        Ok(Self {
            name,
            t_scores,
            percentiles,
            subscales,
        })
    }
}

/// Per-row outcome before partitioning
enum RowOutcome {
    Valid(ScoreRecord),
    Rejected(String),
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn describe_raw(raw: &str) -> String {
    if raw.trim().is_empty() {
        "missing".to_string()
    } else {
        format!("'{}'", raw.trim())
    }
}

/// Validates parsed tables into score records
#[derive(Debug, Clone)]
pub struct IngestValidator {
    columns: ColumnMap,
}

impl IngestValidator {
    /// Check table structure and prepare column positions
    ///
    /// # Errors
    /// `ScoringError::MissingColumns` when required columns are absent.
    pub fn for_table(table: &ParsedTable) -> ScoringResult<Self> {
        let columns = ColumnMap::resolve(table).map_err(|e| {
            warn!("Rejecting batch: {}", e);
            e
        })?;
        Ok(Self { columns })
    }

    /// Validate every row, accumulating errors without short-circuiting
    pub fn validate(&self, table: &ParsedTable) -> IngestResult {
        let mut result = IngestResult::default();

        for outcome in table.rows.iter().map(|row| self.validate_row(row)) {
            match outcome {
                RowOutcome::Valid(record) => result.valid_records.push(record),
                RowOutcome::Rejected(message) => {
                    warn!("{}", message);
                    result.errors.push(message);
                }
            }
        }

        info!(
            rows = table.rows.len(),
            valid = result.valid_records.len(),
            rejected = result.errors.len(),
            "Ingest validation complete"
        );

        result
    }

    fn validate_row(&self, row: &TableRow) -> RowOutcome {
        if row.unterminated_quote {
            return RowOutcome::Rejected(format!("Row {}: unterminated quoted field", row.line));
        }

        let name = row.get(self.columns.name).trim();
        if name.is_empty() {
            return RowOutcome::Rejected(format!("Row {}: missing name", row.line));
        }

        let mut scales = BTreeMap::new();
        let mut invalid = Vec::new();
        for (scale, idx) in &self.columns.t_scores {
            let raw = row.get(*idx);
            match parse_number(raw) {
                Some(t) => {
                    let percentile = self.percentile_for(row, *scale, t);
                    scales.insert(*scale, ScaleScore { t, percentile });
                }
                None => invalid.push(format!("{} ({})", scale.code(), describe_raw(raw))),
            }
        }

        if !invalid.is_empty() {
            return RowOutcome::Rejected(format!(
                "Row {} ({}): non-numeric or missing T-score for {}",
                row.line,
                name,
                invalid.join(", ")
            ));
        }

        let subscales = self
            .columns
            .subscales
            .iter()
            .filter_map(|(code, idx)| {
                let value = parse_number(row.get(*idx));
                if value.is_none() && !row.get(*idx).trim().is_empty() {
                    debug!(row = row.line, subscale = %code, "Dropping non-numeric subscale value");
                }
                value.map(|v| (code.to_string(), v))
            })
            .collect();

        RowOutcome::Valid(ScoreRecord {
            name: name.to_string(),
            scales,
            subscales,
        })
    }

    fn percentile_for(&self, row: &TableRow, scale: ScaleCode, t: f64) -> f64 {
        let supplied = self
            .columns
            .percentiles
            .get(&scale)
            .and_then(|idx| parse_number(row.get(*idx)))
            .filter(|p| {
                let in_range = (PERCENTILE_MIN..=PERCENTILE_MAX).contains(p);
                if !in_range {
                    debug!(row = row.line, scale = %scale, percentile = *p, "Ignoring out-of-range percentile");
                }
                in_range
            });

        supplied.unwrap_or_else(|| {
            let filled = f64::from(percentile_from_standardized(t));
            debug!(row = row.line, scale = %scale, t, percentile = filled, "Back-filled percentile");
            filled
        })
    }
}
