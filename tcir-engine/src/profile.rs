//! Subject records and scoring profiles
//!
//! `ScoreRecord` is what ingestion produces: both the standardized and
//! percentile value for every primary scale plus any subscales that
//! parsed. `SubjectProfile` is the single-convention view the scoring
//! components work on.

use crate::error::{ScoringError, ScoringResult};
use crate::normalizer::{level_of, Convention, Level};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tcir_common::scales::ScaleCode;
use tracing::debug;

/// Neutral midpoint substituted for absent scale scores
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Standardized and percentile value of one primary scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleScore {
    /// Standardized (T) score
    pub t: f64,
    /// Percentile, supplied or back-filled from `t`
    pub percentile: f64,
}

/// Validated subject record produced by ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub scales: BTreeMap<ScaleCode, ScaleScore>,
    /// Subscale raw scores keyed by column name (`ns1`, `co5`, ...)
    #[serde(default)]
    pub subscales: BTreeMap<String, f64>,
}

impl ScoreRecord {
    /// Project the record onto one convention
    pub fn to_profile(&self, convention: Convention) -> ScoringResult<SubjectProfile> {
        let scores = self.scales.iter().map(|(scale, score)| {
            let value = match convention {
                Convention::Standardized => score.t,
                Convention::Percentile => score.percentile,
            };
            (*scale, value)
        });
        SubjectProfile::from_scores(Some(self.name.clone()), convention, scores)
    }

    pub fn subscale(&self, code: &str) -> Option<f64> {
        self.subscales.get(code).copied()
    }
}

/// Scale scores under exactly one convention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub name: Option<String>,
    convention: Convention,
    scores: BTreeMap<ScaleCode, f64>,
}

impl SubjectProfile {
    /// Build a profile, rejecting non-finite scores
    ///
    /// # Errors
    /// `ScoringError::InvalidScore` for NaN or infinite values.
    pub fn from_scores(
        name: Option<String>,
        convention: Convention,
        scores: impl IntoIterator<Item = (ScaleCode, f64)>,
    ) -> ScoringResult<Self> {
        let mut map = BTreeMap::new();
        for (scale, value) in scores {
            if !value.is_finite() {
                return Err(ScoringError::InvalidScore {
                    scale: scale.code().to_string(),
                    value,
                });
            }
            map.insert(scale, value);
        }
        Ok(Self {
            name,
            convention,
            scores: map,
        })
    }

    pub fn convention(&self) -> Convention {
        self.convention
    }

    /// Raw score if present
    pub fn score(&self, scale: ScaleCode) -> Option<f64> {
        self.scores.get(&scale).copied()
    }

    /// Score with absent scales replaced by the neutral midpoint
    pub fn score_or_neutral(&self, scale: ScaleCode) -> f64 {
        self.score(scale).unwrap_or_else(|| {
            debug!(scale = %scale, "Scale absent from profile, using neutral midpoint");
            NEUTRAL_SCORE
        })
    }

    /// Guard against cross-convention use
    pub fn ensure_convention(&self, convention: Convention) -> ScoringResult<()> {
        if self.convention != convention {
            return Err(ScoringError::InvalidConvention(format!(
                "profile{} is scored as {}, requested {}",
                self.name
                    .as_deref()
                    .map(|n| format!(" '{}'", n))
                    .unwrap_or_default(),
                self.convention,
                convention
            )));
        }
        Ok(())
    }

    /// Level of one scale under the requested convention
    ///
    /// # Errors
    /// `ScoringError::InvalidConvention` if the profile uses the other convention.
    pub fn level(&self, scale: ScaleCode, convention: Convention) -> ScoringResult<Level> {
        self.ensure_convention(convention)?;
        Ok(level_of(self.score_or_neutral(scale), convention))
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ScoreRecord {
        let mut scales = BTreeMap::new();
        scales.insert(ScaleCode::NoveltySeeking, ScaleScore { t: 60.0, percentile: 84.0 });
        scales.insert(ScaleCode::HarmAvoidance, ScaleScore { t: 42.0, percentile: 21.0 });
        ScoreRecord {
            name: "Kim".to_string(),
            scales,
            subscales: BTreeMap::from([("ns1".to_string(), 12.0)]),
        }
    }

    #[test]
    fn test_to_profile_selects_convention_values() {
        let record = record();
        let standardized = record.to_profile(Convention::Standardized).unwrap();
        let percentile = record.to_profile(Convention::Percentile).unwrap();

        assert_eq!(standardized.score(ScaleCode::NoveltySeeking), Some(60.0));
        assert_eq!(percentile.score(ScaleCode::NoveltySeeking), Some(84.0));
        assert_eq!(percentile.display_name(), "Kim");
        assert_eq!(record.subscale("ns1"), Some(12.0));
        assert_eq!(record.subscale("ns2"), None);
    }

    #[test]
    fn test_level_requires_matching_convention() {
        let profile = record().to_profile(Convention::Standardized).unwrap();
        assert_eq!(
            profile.level(ScaleCode::NoveltySeeking, Convention::Standardized).unwrap(),
            Level::High
        );
        let err = profile
            .level(ScaleCode::NoveltySeeking, Convention::Percentile)
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidConvention(_)));
        assert!(err.to_string().contains("Kim"));
    }

    #[test]
    fn test_missing_scale_uses_neutral_midpoint() {
        let profile = record().to_profile(Convention::Percentile).unwrap();
        assert_eq!(profile.score(ScaleCode::Persistence), None);
        assert_eq!(profile.score_or_neutral(ScaleCode::Persistence), NEUTRAL_SCORE);
        assert_eq!(
            profile.level(ScaleCode::Persistence, Convention::Percentile).unwrap(),
            Level::Mid
        );
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let result = SubjectProfile::from_scores(
            None,
            Convention::Percentile,
            [(ScaleCode::Cooperativeness, f64::NAN)],
        );
        assert!(matches!(result, Err(ScoringError::InvalidScore { .. })));
    }
}
