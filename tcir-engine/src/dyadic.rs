//! Paired (dyadic) profile comparison
//!
//! Compares two percentile-convention profiles scale by scale.
//!
//! # Gap categories
//! - Similar: gap <= 10
//! - Moderate: 10 < gap <= 25 (11-25 for whole percentiles)
//! - Contrast: gap > 25 (26 and above for whole percentiles)
//!
//! # Resilience
//! Rounded mean of the pair's Self-Directedness average and
//! Cooperativeness average, banded as:
//! - High: >= 65
//! - Adequate: >= 50
//! - Caution: >= 35
//! - Low: below 35
//!
//! Absent scales are read as the neutral midpoint (50). Only non-finite
//! scores (rejected when the profile is built) and convention misuse are
//! errors.

use crate::classifier::{combination_key, CombinationKey};
use crate::error::ScoringResult;
use crate::normalizer::{level_of, Convention, Level};
use crate::profile::SubjectProfile;
use serde::{Deserialize, Serialize};
use tcir_common::scales::ScaleCode;
use tracing::debug;

/// Largest gap still considered similar
pub const SIMILAR_MAX_GAP: f64 = 10.0;
/// Largest gap still considered moderate
pub const MODERATE_MAX_GAP: f64 = 25.0;

pub const RESILIENCE_HIGH_MIN: f64 = 65.0;
pub const RESILIENCE_ADEQUATE_MIN: f64 = 50.0;
pub const RESILIENCE_CAUTION_MIN: f64 = 35.0;

/// Magnitude band of a per-scale gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapCategory {
    Similar,
    Moderate,
    Contrast,
}

/// Categorize an absolute score gap
pub fn gap_category(gap: f64) -> GapCategory {
    if gap <= SIMILAR_MAX_GAP {
        GapCategory::Similar
    } else if gap <= MODERATE_MAX_GAP {
        GapCategory::Moderate
    } else {
        GapCategory::Contrast
    }
}

/// Per-scale comparison of two subjects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapRecord {
    pub scale: ScaleCode,
    pub score_a: f64,
    pub score_b: f64,
    pub level_a: Level,
    pub level_b: Level,
    pub gap: f64,
    pub gap_category: GapCategory,
    pub combination_key: CombinationKey,
}

/// Resilience band, checked from the top down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResilienceBand {
    High,
    Adequate,
    Caution,
    Low,
}

impl ResilienceBand {
    pub fn from_score(score: f64) -> Self {
        if score >= RESILIENCE_HIGH_MIN {
            ResilienceBand::High
        } else if score >= RESILIENCE_ADEQUATE_MIN {
            ResilienceBand::Adequate
        } else if score >= RESILIENCE_CAUTION_MIN {
            ResilienceBand::Caution
        } else {
            ResilienceBand::Low
        }
    }

    /// Uppercase form used in catalog keys (`RESILIENCE-HIGH`)
    pub fn key_part(&self) -> &'static str {
        match self {
            ResilienceBand::High => "HIGH",
            ResilienceBand::Adequate => "ADEQUATE",
            ResilienceBand::Caution => "CAUTION",
            ResilienceBand::Low => "LOW",
        }
    }
}

/// Pair resilience metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resilience {
    pub score: f64,
    pub band: ResilienceBand,
}

/// Full comparison of two profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DyadicComparison {
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    /// One record per primary scale, in catalog order
    pub records: Vec<GapRecord>,
    /// Rounded mean gap over all scales
    pub overall_gap: f64,
    pub similar_scales: Vec<ScaleCode>,
    pub moderate_scales: Vec<ScaleCode>,
    pub contrast_scales: Vec<ScaleCode>,
    pub resilience: Resilience,
}

impl DyadicComparison {
    pub fn record(&self, scale: ScaleCode) -> Option<&GapRecord> {
        self.records.iter().find(|r| r.scale == scale)
    }

    pub fn similar_count(&self) -> usize {
        self.similar_scales.len()
    }

    pub fn contrast_count(&self) -> usize {
        self.contrast_scales.len()
    }
}

fn compare_scale(first: &SubjectProfile, second: &SubjectProfile, scale: ScaleCode) -> GapRecord {
    let score_a = first.score_or_neutral(scale);
    let score_b = second.score_or_neutral(scale);
    let level_a = level_of(score_a, Convention::Percentile);
    let level_b = level_of(score_b, Convention::Percentile);
    let gap = (score_a - score_b).abs();
    GapRecord {
        scale,
        score_a,
        score_b,
        level_a,
        level_b,
        gap,
        gap_category: gap_category(gap),
        combination_key: combination_key(level_a, level_b),
    }
}

/// Resilience from the pair's SD and CO averages
pub fn resilience(first: &SubjectProfile, second: &SubjectProfile) -> Resilience {
    let pair_mean = |scale| (first.score_or_neutral(scale) + second.score_or_neutral(scale)) / 2.0;
    let sd = pair_mean(ScaleCode::SelfDirectedness);
    let co = pair_mean(ScaleCode::Cooperativeness);
    let score = ((sd + co) / 2.0).round();
    Resilience {
        score,
        band: ResilienceBand::from_score(score),
    }
}

/// Compare two percentile-convention profiles across all seven scales
///
/// # Errors
/// `ScoringError::InvalidConvention` if either profile is not scored as
/// percentiles.
pub fn compare(first: &SubjectProfile, second: &SubjectProfile) -> ScoringResult<DyadicComparison> {
    first.ensure_convention(Convention::Percentile)?;
    second.ensure_convention(Convention::Percentile)?;

    let records: Vec<GapRecord> = ScaleCode::all()
        .iter()
        .map(|scale| compare_scale(first, second, *scale))
        .collect();

    let scales_in = |category: GapCategory| -> Vec<ScaleCode> {
        records
            .iter()
            .filter(|r| r.gap_category == category)
            .map(|r| r.scale)
            .collect()
    };
    let similar_scales = scales_in(GapCategory::Similar);
    let moderate_scales = scales_in(GapCategory::Moderate);
    let contrast_scales = scales_in(GapCategory::Contrast);

    let overall_gap = (records.iter().map(|r| r.gap).sum::<f64>() / records.len() as f64).round();
    let resilience = resilience(first, second);

    debug!(
        overall_gap,
        similar = similar_scales.len(),
        moderate = moderate_scales.len(),
        contrast = contrast_scales.len(),
        resilience = resilience.score,
        "Dyadic comparison complete"
    );

    Ok(DyadicComparison {
        first_name: first.name.clone(),
        second_name: second.name.clone(),
        records,
        overall_gap,
        similar_scales,
        moderate_scales,
        contrast_scales,
        resilience,
    })
}
