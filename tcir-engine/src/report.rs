//! Report assembly
//!
//! Builds the display data consumed by rendering layers. Individual
//! reports use the standardized convention; paired reports use the
//! percentile convention. Narrative keys:
//!
//! | Narrative | Key | Fallback |
//! |---|---|---|
//! | Scale level | `NS-High` | none |
//! | Temperament type | `TEMPERAMENT-HML` | none |
//! | Character type | `CHARACTER-HMM` | none |
//! | Temperament pair | `NSHA-HL` | `NS-High` / `NS-Low` |
//! | Paired scale | `NS-HL` | `NS-High` / `NS-Low` |
//! | Paired character | `CHARACTER-HL-MM` | none |
//! | Resilience | `RESILIENCE-HIGH` | none |

use crate::classifier::{
    character_code, combination_key, dyadic_character_code, temperament_code, CombinationKey, TypeCode,
};
use crate::dyadic::{compare, DyadicComparison};
use crate::error::ScoringResult;
use crate::interpret::resolver::{CHARACTER_PREFIX, TEMPERAMENT_PREFIX};
use crate::interpret::{CatalogSource, LookupKey, NameBindings, Narrative};
use crate::normalizer::{clamp_display, percentile_from_standardized, Convention, Level};
use crate::profile::{ScoreRecord, SubjectProfile};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tcir_common::scales::{ScaleCode, TEMPERAMENT_SCALES};
use tracing::info;

/// Key prefix for the pair resilience narrative
pub const RESILIENCE_PREFIX: &str = "RESILIENCE";

/// One primary scale in an individual report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleRow {
    pub scale: ScaleCode,
    pub label: &'static str,
    pub t_score: f64,
    pub percentile: f64,
    pub level: Level,
    /// Bar position in [0, 1] over the T-score display domain
    pub display_position: f64,
    pub narrative: Narrative,
}

/// One subscale value in an individual report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscaleRow {
    pub scale: ScaleCode,
    pub code: &'static str,
    pub label: &'static str,
    pub score: f64,
}

/// Interpretation of two temperament scales of the same subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperamentPair {
    pub first: ScaleCode,
    pub second: ScaleCode,
    pub combination_key: CombinationKey,
    pub narrative: Narrative,
}

/// Single-subject report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndividualReport {
    pub subject: String,
    pub generated_at: DateTime<Utc>,
    pub scales: Vec<ScaleRow>,
    pub subscales: Vec<SubscaleRow>,
    pub temperament_code: TypeCode,
    pub temperament: Narrative,
    pub character_code: TypeCode,
    pub character: Narrative,
    pub temperament_pairs: Vec<TemperamentPair>,
}

impl IndividualReport {
    /// Build from an ingested record under the standardized convention
    pub fn build<C: CatalogSource + ?Sized>(record: &ScoreRecord, catalog: &C) -> ScoringResult<Self> {
        let convention = Convention::Standardized;
        let profile = record.to_profile(convention)?;
        let bindings = NameBindings::single(&record.name);

        let scales = ScaleCode::all()
            .iter()
            .map(|scale| {
                let t_score = profile.score_or_neutral(*scale);
                let percentile = record
                    .scales
                    .get(scale)
                    .map(|s| s.percentile)
                    .unwrap_or_else(|| f64::from(percentile_from_standardized(t_score)));
                let level = profile.level(*scale, convention)?;
                Ok(ScaleRow {
                    scale: *scale,
                    label: scale.label(),
                    t_score,
                    percentile,
                    level,
                    display_position: clamp_display(t_score),
                    narrative: Narrative::lookup(&LookupKey::scale_level(*scale, level), catalog, &bindings),
                })
            })
            .collect::<ScoringResult<Vec<_>>>()?;

        let subscales = ScaleCode::all()
            .iter()
            .flat_map(|scale| scale.definition().subscales.iter().map(move |sub| (*scale, sub)))
            .filter_map(|(scale, sub)| {
                record.subscale(sub.code).map(|score| SubscaleRow {
                    scale,
                    code: sub.code,
                    label: sub.label,
                    score,
                })
            })
            .collect();

        let temperament_code = temperament_code(&profile, convention)?;
        let character_code = character_code(&profile, convention)?;
        let temperament = Narrative::lookup(
            &LookupKey::type_code(TEMPERAMENT_PREFIX, &temperament_code),
            catalog,
            &bindings,
        );
        let character = Narrative::lookup(
            &LookupKey::type_code(CHARACTER_PREFIX, &character_code),
            catalog,
            &bindings,
        );

        let temperament_pairs = temperament_pairs(&profile, convention, catalog, &bindings)?;

        info!(
            subject = %record.name,
            temperament = %temperament_code,
            character = %character_code,
            "Built individual report"
        );

        Ok(Self {
            subject: record.name.clone(),
            generated_at: Utc::now(),
            scales,
            subscales,
            temperament_code,
            temperament,
            character_code,
            character,
            temperament_pairs,
        })
    }

    pub fn scale(&self, scale: ScaleCode) -> Option<&ScaleRow> {
        self.scales.iter().find(|row| row.scale == scale)
    }
}

/// NS×HA, NS×RD, HA×RD combinations, each anchored on its first scale
fn temperament_pairs<C: CatalogSource + ?Sized>(
    profile: &SubjectProfile,
    convention: Convention,
    catalog: &C,
    bindings: &NameBindings,
) -> ScoringResult<Vec<TemperamentPair>> {
    let mut pairs = Vec::new();
    for (i, first) in TEMPERAMENT_SCALES.iter().enumerate() {
        for second in &TEMPERAMENT_SCALES[i + 1..] {
            let key = combination_key(profile.level(*first, convention)?, profile.level(*second, convention)?);
            pairs.push(TemperamentPair {
                first: *first,
                second: *second,
                combination_key: key,
                narrative: Narrative::lookup(&LookupKey::scale_pair(*first, *second, key), catalog, bindings),
            });
        }
    }
    Ok(pairs)
}

/// Per-scale narrative in a paired report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairScaleNarrative {
    pub scale: ScaleCode,
    pub combination_key: CombinationKey,
    pub narrative: Narrative,
}

/// Paired (dyadic) report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairReport {
    pub first_name: String,
    pub second_name: String,
    pub generated_at: DateTime<Utc>,
    pub comparison: DyadicComparison,
    pub scale_narratives: Vec<PairScaleNarrative>,
    /// Two-scale (SD, CO) character codes
    pub first_character_code: TypeCode,
    pub second_character_code: TypeCode,
    pub character_pair: Narrative,
    pub resilience: Narrative,
}

impl PairReport {
    /// Build from two ingested records under the percentile convention
    pub fn build<C: CatalogSource + ?Sized>(
        first: &ScoreRecord,
        second: &ScoreRecord,
        catalog: &C,
    ) -> ScoringResult<Self> {
        let first = first.to_profile(Convention::Percentile)?;
        let second = second.to_profile(Convention::Percentile)?;
        Self::from_profiles(&first, &second, catalog)
    }

    /// Build from percentile-convention profiles supplied by the caller
    ///
    /// # Errors
    /// `ScoringError::InvalidConvention` if either profile is standardized.
    pub fn from_profiles<C: CatalogSource + ?Sized>(
        first: &SubjectProfile,
        second: &SubjectProfile,
        catalog: &C,
    ) -> ScoringResult<Self> {
        let comparison = compare(first, second)?;
        let bindings = NameBindings::pair(first.display_name(), second.display_name());

        let scale_narratives = comparison
            .records
            .iter()
            .map(|record| PairScaleNarrative {
                scale: record.scale,
                combination_key: record.combination_key,
                narrative: Narrative::lookup(
                    &LookupKey::dyadic_scale(record.scale, record.combination_key),
                    catalog,
                    &bindings,
                ),
            })
            .collect();

        let first_character_code = dyadic_character_code(first, Convention::Percentile)?;
        let second_character_code = dyadic_character_code(second, Convention::Percentile)?;
        let character_pair = Narrative::lookup(
            &LookupKey::exact(format!(
                "{}-{}-{}",
                CHARACTER_PREFIX, first_character_code, second_character_code
            )),
            catalog,
            &bindings,
        );
        let resilience = Narrative::lookup(
            &LookupKey::exact(format!(
                "{}-{}",
                RESILIENCE_PREFIX,
                comparison.resilience.band.key_part()
            )),
            catalog,
            &bindings,
        );

        info!(
            first = first.display_name(),
            second = second.display_name(),
            overall_gap = comparison.overall_gap,
            "Built pair report"
        );

        Ok(Self {
            first_name: first.display_name().to_string(),
            second_name: second.display_name().to_string(),
            generated_at: Utc::now(),
            comparison,
            scale_narratives,
            first_character_code,
            second_character_code,
            character_pair,
            resilience,
        })
    }
}
