//! Composite type codes and combination keys
//!
//! Type codes are derived views over levels and are recomputed on
//! demand. The character code has two call shapes: three scales
//! (SD, CO, ST) in individual reports and two scales (SD, CO) in paired
//! reports. Both are supported explicitly.

use crate::error::{ScoringError, ScoringResult};
use crate::normalizer::{Convention, Level};
use crate::profile::SubjectProfile;
use serde::{Deserialize, Serialize};
use tcir_common::scales::{
    ScaleCode, CHARACTER_SCALES, DYADIC_CHARACTER_SCALES, TEMPERAMENT_SCALES,
};

/// Concatenated level symbols, e.g. "HML"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeCode(String);

impl TypeCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two level symbols, first operand first, e.g. "HL"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CombinationKey {
    first: Level,
    second: Level,
}

impl CombinationKey {
    pub fn first(&self) -> Level {
        self.first
    }

    pub fn second(&self) -> Level {
        self.second
    }

    pub fn as_string(&self) -> String {
        let mut key = String::with_capacity(2);
        key.push(self.first.symbol());
        key.push(self.second.symbol());
        key
    }
}

impl std::fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<CombinationKey> for String {
    fn from(key: CombinationKey) -> Self {
        key.as_string()
    }
}

/// Parse the two-symbol form
///
/// The string form is lossy: `L` and `H` read back as `Low` and `High`,
/// so a key built from `VeryLow` / `VeryHigh` keeps its symbols but not
/// its original levels.
impl TryFrom<String> for CombinationKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let parse = |c: char| match c {
            'L' => Ok(Level::Low),
            'M' => Ok(Level::Mid),
            'H' => Ok(Level::High),
            other => Err(format!("invalid level symbol '{}'", other)),
        };
        let mut chars = value.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) => Ok(combination_key(parse(a)?, parse(b)?)),
            _ => Err(format!("combination key must be two symbols, got '{}'", value)),
        }
    }
}

/// Concatenate level symbols in input order
///
/// # Errors
/// `ScoringError::EmptyComposite` for an empty sequence.
pub fn composite_code(levels: &[Level]) -> ScoringResult<TypeCode> {
    if levels.is_empty() {
        return Err(ScoringError::EmptyComposite);
    }
    Ok(TypeCode(levels.iter().map(Level::symbol).collect()))
}

/// Build a combination key from exactly two levels, first operand first
pub fn combination_key(first: Level, second: Level) -> CombinationKey {
    CombinationKey { first, second }
}

fn code_for(profile: &SubjectProfile, scales: &[ScaleCode], convention: Convention) -> ScoringResult<TypeCode> {
    let levels = scales
        .iter()
        .map(|scale| profile.level(*scale, convention))
        .collect::<ScoringResult<Vec<_>>>()?;
    composite_code(&levels)
}

/// Temperament type code over (NS, HA, RD)
pub fn temperament_code(profile: &SubjectProfile, convention: Convention) -> ScoringResult<TypeCode> {
    code_for(profile, &TEMPERAMENT_SCALES, convention)
}

/// Character type code over (SD, CO, ST), individual report shape
pub fn character_code(profile: &SubjectProfile, convention: Convention) -> ScoringResult<TypeCode> {
    code_for(profile, &CHARACTER_SCALES, convention)
}

/// Character type code over (SD, CO), paired report shape
pub fn dyadic_character_code(profile: &SubjectProfile, convention: Convention) -> ScoringResult<TypeCode> {
    code_for(profile, &DYADIC_CHARACTER_SCALES, convention)
}
