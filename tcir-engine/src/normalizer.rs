//! Score normalization
//!
//! Converts scale scores into categorical levels, percentiles and
//! display positions. Two scoring conventions coexist and are never
//! inferred from context:
//!
//! - **Standardized** (T-score, mean 50, SD 10): three levels
//!   - Low: score < 45
//!   - Mid: 45 <= score <= 55
//!   - High: score > 55
//! - **Percentile** (0-100): five levels, lower bound inclusive
//!   - Very Low: < 20
//!   - Low: 20 to < 40
//!   - Mid: 40 to < 60
//!   - High: 60 to < 80
//!   - Very High: >= 80
//!
//! # Percentile approximation
//! Standardized scores convert to percentiles through the standard
//! normal CDF using the Abramowitz-Stegun 7.1.26 rational approximation
//! of erf (absolute error below 1.5e-7). Coefficients are fixed so that
//! reports stay reproducible.

use crate::error::ScoringError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Standardized convention: scores below this are Low
pub const STANDARDIZED_LOW_BELOW: f64 = 45.0;
/// Standardized convention: scores above this are High
pub const STANDARDIZED_HIGH_ABOVE: f64 = 55.0;

/// Percentile convention lower bounds for L, M, H, VH
pub const PERCENTILE_CUTS: [f64; 4] = [20.0, 40.0, 60.0, 80.0];

/// Lower end of the bar display domain (T-score)
pub const DISPLAY_MIN: f64 = 20.0;
/// Upper end of the bar display domain (T-score)
pub const DISPLAY_MAX: f64 = 80.0;

const ERF_A1: f64 = 0.254829592;
const ERF_A2: f64 = -0.284496736;
const ERF_A3: f64 = 1.421413741;
const ERF_A4: f64 = -1.453152027;
const ERF_A5: f64 = 1.061405429;
const ERF_P: f64 = 0.3275911;

/// Scoring convention, required explicitly by every level computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Convention {
    /// T-score, mean 50, SD 10, three levels
    Standardized,
    /// Direct 0-100 percentile, five levels
    Percentile,
}

impl Convention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Convention::Standardized => "standardized",
            Convention::Percentile => "percentile",
        }
    }
}

impl FromStr for Convention {
    type Err = ScoringError;

    /// Accepts `standardized` / `t` / `t-score` and `percentile` / `p`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standardized" | "t" | "t-score" | "tscore" => Ok(Convention::Standardized),
            "percentile" | "p" => Ok(Convention::Percentile),
            other => Err(ScoringError::InvalidConvention(format!(
                "unrecognized convention '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Convention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered categorical level: VL < L < M < H < VH
///
/// The standardized convention only produces L, M and H.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "VL")]
    VeryLow,
    #[serde(rename = "L")]
    Low,
    #[serde(rename = "M")]
    Mid,
    #[serde(rename = "H")]
    High,
    #[serde(rename = "VH")]
    VeryHigh,
}

impl Level {
    /// Single-letter symbol used in type codes and combination keys
    ///
    /// Very-Low and Very-High share the Low/High letters so that codes
    /// built under either convention index the same three-band tables.
    pub fn symbol(&self) -> char {
        match self {
            Level::VeryLow | Level::Low => 'L',
            Level::Mid => 'M',
            Level::High | Level::VeryHigh => 'H',
        }
    }

    /// Short code as serialized ("VL", "L", "M", "H", "VH")
    pub fn code(&self) -> &'static str {
        match self {
            Level::VeryLow => "VL",
            Level::Low => "L",
            Level::Mid => "M",
            Level::High => "H",
            Level::VeryHigh => "VH",
        }
    }

    /// Generic band word used by scale-level catalog keys (`NS-High`)
    pub fn band_label(&self) -> &'static str {
        match self.symbol() {
            'L' => "Low",
            'M' => "Mid",
            _ => "High",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Level::VeryLow => "Very Low",
            Level::Low => "Low",
            Level::Mid => "Mid",
            Level::High => "High",
            Level::VeryHigh => "Very High",
        }
    }

    /// Levels a convention can produce, ascending
    pub fn variants_for(convention: Convention) -> &'static [Level] {
        match convention {
            Convention::Standardized => &[Level::Low, Level::Mid, Level::High],
            Convention::Percentile => &[
                Level::VeryLow,
                Level::Low,
                Level::Mid,
                Level::High,
                Level::VeryHigh,
            ],
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Classify a score under the given convention
///
/// Callers must pass finite scores; `SubjectProfile` rejects
/// non-finite values at construction.
pub fn level_of(score: f64, convention: Convention) -> Level {
    match convention {
        Convention::Standardized => {
            if score < STANDARDIZED_LOW_BELOW {
                Level::Low
            } else if score <= STANDARDIZED_HIGH_ABOVE {
                Level::Mid
            } else {
                Level::High
            }
        }
        Convention::Percentile => {
            let [low, mid, high, very_high] = PERCENTILE_CUTS;
            if score < low {
                Level::VeryLow
            } else if score < mid {
                Level::Low
            } else if score < high {
                Level::Mid
            } else if score < very_high {
                Level::High
            } else {
                Level::VeryHigh
            }
        }
    }
}

/// Classify a score under a convention given by name
///
/// # Errors
/// `ScoringError::InvalidConvention` when the name is not recognized.
pub fn level_of_named(score: f64, convention: &str) -> Result<Level, ScoringError> {
    Ok(level_of(score, convention.parse()?))
}

/// Standard normal CDF via the Abramowitz-Stegun erf approximation
pub fn standard_normal_cdf(z: f64) -> f64 {
    let sign = if z > 0.0 {
        1.0
    } else if z < 0.0 {
        -1.0
    } else {
        0.0
    };
    let x = z.abs() / std::f64::consts::SQRT_2;
    let t = 1.0 / (1.0 + ERF_P * x);
    let poly = ((((ERF_A5 * t + ERF_A4) * t + ERF_A3) * t + ERF_A2) * t + ERF_A1) * t;
    // e^(-x^2) == e^(-z^2 / 2)
    let y = 1.0 - poly * (-x * x).exp();
    0.5 * (1.0 + sign * y)
}

/// Convert a standardized (T) score to a whole percentile in [0, 100]
pub fn percentile_from_standardized(score: f64) -> u8 {
    let z = (score - 50.0) / 10.0;
    let percentile = (100.0 * standard_normal_cdf(z)).round();
    percentile.clamp(0.0, 100.0) as u8
}

/// Map a score onto the display domain [20, 80] as a bar fraction
///
/// Out-of-domain scores are clamped, not rejected.
pub fn clamp_display(score: f64) -> f64 {
    ((score - DISPLAY_MIN) / (DISPLAY_MAX - DISPLAY_MIN)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardized_boundaries() {
        assert_eq!(level_of(44.9, Convention::Standardized), Level::Low);
        assert_eq!(level_of(45.0, Convention::Standardized), Level::Mid);
        assert_eq!(level_of(55.0, Convention::Standardized), Level::Mid);
        assert_eq!(level_of(55.1, Convention::Standardized), Level::High);
    }

    #[test]
    fn test_percentile_boundaries() {
        assert_eq!(level_of(0.0, Convention::Percentile), Level::VeryLow);
        assert_eq!(level_of(19.9, Convention::Percentile), Level::VeryLow);
        assert_eq!(level_of(20.0, Convention::Percentile), Level::Low);
        assert_eq!(level_of(40.0, Convention::Percentile), Level::Mid);
        assert_eq!(level_of(59.0, Convention::Percentile), Level::Mid);
        assert_eq!(level_of(60.0, Convention::Percentile), Level::High);
        assert_eq!(level_of(80.0, Convention::Percentile), Level::VeryHigh);
        assert_eq!(level_of(100.0, Convention::Percentile), Level::VeryHigh);
    }

    #[test]
    fn test_standardized_level_monotonic() {
        let mut previous = level_of(0.0, Convention::Standardized);
        for tenth in 1..=1000 {
            let level = level_of(tenth as f64 / 10.0, Convention::Standardized);
            assert!(level >= previous, "level decreased at {}", tenth as f64 / 10.0);
            previous = level;
        }
    }

    #[test]
    fn test_standardized_never_produces_extremes() {
        for score in [0.0, 10.0, 90.0, 120.0] {
            let level = level_of(score, Convention::Standardized);
            assert!(Level::variants_for(Convention::Standardized).contains(&level));
        }
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::VeryLow < Level::Low);
        assert!(Level::Low < Level::Mid);
        assert!(Level::Mid < Level::High);
        assert!(Level::High < Level::VeryHigh);
    }

    #[test]
    fn test_level_symbols() {
        assert_eq!(Level::VeryLow.symbol(), 'L');
        assert_eq!(Level::Mid.symbol(), 'M');
        assert_eq!(Level::VeryHigh.symbol(), 'H');
        assert_eq!(Level::VeryHigh.band_label(), "High");
        assert_eq!(Level::Low.band_label(), "Low");
    }

    #[test]
    fn test_convention_parse() {
        assert_eq!("Percentile".parse::<Convention>().unwrap(), Convention::Percentile);
        assert_eq!(" t ".parse::<Convention>().unwrap(), Convention::Standardized);
        assert!(matches!(
            "stanine".parse::<Convention>(),
            Err(ScoringError::InvalidConvention(_))
        ));
    }

    #[test]
    fn test_level_of_named_rejects_unknown() {
        assert_eq!(level_of_named(60.0, "standardized").unwrap(), Level::High);
        assert!(matches!(
            level_of_named(60.0, "z"),
            Err(ScoringError::InvalidConvention(_))
        ));
    }

    #[test]
    fn test_percentile_midpoint() {
        assert_eq!(percentile_from_standardized(50.0), 50);
    }

    #[test]
    fn test_percentile_two_sd_bounds() {
        assert!(percentile_from_standardized(80.0) >= 97);
        assert!(percentile_from_standardized(20.0) <= 3);
    }

    #[test]
    fn test_percentile_known_values() {
        // Phi(1) = 0.8413, Phi(-1) = 0.1587, Phi(2) = 0.9772
        assert_eq!(percentile_from_standardized(60.0), 84);
        assert_eq!(percentile_from_standardized(40.0), 16);
        assert_eq!(percentile_from_standardized(70.0), 98);
        assert_eq!(percentile_from_standardized(55.0), 69);
    }

    #[test]
    fn test_percentile_non_decreasing() {
        let mut previous = 0;
        for tenth in 0..=1000 {
            let p = percentile_from_standardized(tenth as f64 / 10.0);
            assert!(p >= previous, "percentile decreased at {}", tenth as f64 / 10.0);
            previous = p;
        }
        assert!(previous <= 100);
    }

    #[test]
    fn test_cdf_symmetry() {
        for z in [0.25, 0.5, 1.0, 1.5, 2.5] {
            let sum = standard_normal_cdf(z) + standard_normal_cdf(-z);
            assert!((sum - 1.0).abs() < 1e-9, "asymmetric at {}", z);
        }
        assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-4);
    }

    #[test]
    fn test_clamp_display() {
        assert_eq!(clamp_display(20.0), 0.0);
        assert_eq!(clamp_display(50.0), 0.5);
        assert_eq!(clamp_display(80.0), 1.0);
        assert_eq!(clamp_display(5.0), 0.0);
        assert_eq!(clamp_display(95.0), 1.0);
    }
}
