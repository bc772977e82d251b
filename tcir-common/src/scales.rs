//! Scale catalog for the Temperament and Character Inventory
//!
//! Seven primary scales, four temperament and three character, each
//! decomposed into three to five subscales. The catalog is static and
//! shared read-only by every crate in the workspace.
//!
//! # Column naming
//! Tabular input names columns after the lowercase scale code:
//! - `<code>_t` standardized (T) score, e.g. `ns_t`
//! - `<code>_p` percentile, e.g. `ns_p`
//! - `<code><n>` subscale raw score, e.g. `ns1`

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Primary scale identifier
///
/// Declaration order is catalog order; `Ord` follows it so ordered maps
/// keyed by `ScaleCode` iterate NS, HA, RD, PS, SD, CO, ST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScaleCode {
    #[serde(rename = "NS")]
    NoveltySeeking,
    #[serde(rename = "HA")]
    HarmAvoidance,
    #[serde(rename = "RD")]
    RewardDependence,
    #[serde(rename = "PS")]
    Persistence,
    #[serde(rename = "SD")]
    SelfDirectedness,
    #[serde(rename = "CO")]
    Cooperativeness,
    #[serde(rename = "ST")]
    SelfTranscendence,
}

/// Temperament triple used for the temperament type code
pub const TEMPERAMENT_SCALES: [ScaleCode; 3] = [
    ScaleCode::NoveltySeeking,
    ScaleCode::HarmAvoidance,
    ScaleCode::RewardDependence,
];

/// Character triple used by individual reports
pub const CHARACTER_SCALES: [ScaleCode; 3] = [
    ScaleCode::SelfDirectedness,
    ScaleCode::Cooperativeness,
    ScaleCode::SelfTranscendence,
];

/// Character pair used by paired (dyadic) reports
pub const DYADIC_CHARACTER_SCALES: [ScaleCode; 2] = [
    ScaleCode::SelfDirectedness,
    ScaleCode::Cooperativeness,
];

impl ScaleCode {
    /// Canonical uppercase code ("NS", "HA", ...)
    pub fn code(&self) -> &'static str {
        match self {
            ScaleCode::NoveltySeeking => "NS",
            ScaleCode::HarmAvoidance => "HA",
            ScaleCode::RewardDependence => "RD",
            ScaleCode::Persistence => "PS",
            ScaleCode::SelfDirectedness => "SD",
            ScaleCode::Cooperativeness => "CO",
            ScaleCode::SelfTranscendence => "ST",
        }
    }

    /// Parse a scale code, case-insensitive and whitespace tolerant
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NS" => Some(ScaleCode::NoveltySeeking),
            "HA" => Some(ScaleCode::HarmAvoidance),
            "RD" => Some(ScaleCode::RewardDependence),
            "PS" => Some(ScaleCode::Persistence),
            "SD" => Some(ScaleCode::SelfDirectedness),
            "CO" => Some(ScaleCode::Cooperativeness),
            "ST" => Some(ScaleCode::SelfTranscendence),
            _ => None,
        }
    }

    /// All seven scales in catalog order
    pub fn all() -> &'static [ScaleCode] {
        &[
            ScaleCode::NoveltySeeking,
            ScaleCode::HarmAvoidance,
            ScaleCode::RewardDependence,
            ScaleCode::Persistence,
            ScaleCode::SelfDirectedness,
            ScaleCode::Cooperativeness,
            ScaleCode::SelfTranscendence,
        ]
    }

    /// Catalog entry for this scale
    pub fn definition(&self) -> &'static ScaleDefinition {
        // Catalog is declared in enum order
        &SCALE_CATALOG[*self as usize]
    }

    pub fn label(&self) -> &'static str {
        self.definition().label
    }

    /// Required standardized-score column name (`ns_t`)
    pub fn t_column(&self) -> String {
        format!("{}_t", self.code().to_ascii_lowercase())
    }

    /// Optional percentile column name (`ns_p`)
    pub fn p_column(&self) -> String {
        format!("{}_p", self.code().to_ascii_lowercase())
    }

    pub fn is_temperament(&self) -> bool {
        matches!(
            self,
            ScaleCode::NoveltySeeking
                | ScaleCode::HarmAvoidance
                | ScaleCode::RewardDependence
                | ScaleCode::Persistence
        )
    }
}

impl std::fmt::Display for ScaleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Subscale entry (`ns1` "Exploratory excitability", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubscaleDefinition {
    pub code: &'static str,
    pub label: &'static str,
}

/// Primary scale entry with its ordered subscales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScaleDefinition {
    pub scale: ScaleCode,
    pub label: &'static str,
    pub subscales: &'static [SubscaleDefinition],
}

impl ScaleDefinition {
    pub fn code(&self) -> &'static str {
        self.scale.code()
    }
}

const fn sub(code: &'static str, label: &'static str) -> SubscaleDefinition {
    SubscaleDefinition { code, label }
}

/// The fixed seven-scale catalog, in `ScaleCode` declaration order
pub static SCALE_CATALOG: [ScaleDefinition; 7] = [
    ScaleDefinition {
        scale: ScaleCode::NoveltySeeking,
        label: "Novelty Seeking",
        subscales: &[
            sub("ns1", "Exploratory excitability"),
            sub("ns2", "Impulsiveness"),
            sub("ns3", "Extravagance"),
            sub("ns4", "Disorderliness"),
        ],
    },
    ScaleDefinition {
        scale: ScaleCode::HarmAvoidance,
        label: "Harm Avoidance",
        subscales: &[
            sub("ha1", "Anticipatory worry"),
            sub("ha2", "Fear of uncertainty"),
            sub("ha3", "Shyness with strangers"),
            sub("ha4", "Fatigability"),
        ],
    },
    ScaleDefinition {
        scale: ScaleCode::RewardDependence,
        label: "Reward Dependence",
        subscales: &[
            sub("rd1", "Sentimentality"),
            sub("rd2", "Openness to warm communication"),
            sub("rd3", "Attachment"),
        ],
    },
    ScaleDefinition {
        scale: ScaleCode::Persistence,
        label: "Persistence",
        subscales: &[
            sub("ps1", "Eagerness of effort"),
            sub("ps2", "Work hardened"),
            sub("ps3", "Ambitious"),
            sub("ps4", "Perfectionist"),
        ],
    },
    ScaleDefinition {
        scale: ScaleCode::SelfDirectedness,
        label: "Self-Directedness",
        subscales: &[
            sub("sd1", "Responsibility"),
            sub("sd2", "Purposefulness"),
            sub("sd3", "Resourcefulness"),
            sub("sd4", "Self-acceptance"),
            sub("sd5", "Enlightened second nature"),
        ],
    },
    ScaleDefinition {
        scale: ScaleCode::Cooperativeness,
        label: "Cooperativeness",
        subscales: &[
            sub("co1", "Social acceptance"),
            sub("co2", "Empathy"),
            sub("co3", "Helpfulness"),
            sub("co4", "Compassion"),
            sub("co5", "Pure-hearted conscience"),
        ],
    },
    ScaleDefinition {
        scale: ScaleCode::SelfTranscendence,
        label: "Self-Transcendence",
        subscales: &[
            sub("st1", "Self-forgetful"),
            sub("st2", "Transpersonal identification"),
            sub("st3", "Spiritual acceptance"),
        ],
    },
];

/// Subscale column name → owning scale
static SUBSCALE_INDEX: Lazy<HashMap<&'static str, ScaleCode>> = Lazy::new(|| {
    SCALE_CATALOG
        .iter()
        .flat_map(|def| def.subscales.iter().map(move |s| (s.code, def.scale)))
        .collect()
});

/// Look up the scale owning a subscale column (`"co3"` → CO)
pub fn subscale_owner(code: &str) -> Option<ScaleCode> {
    SUBSCALE_INDEX.get(code).copied()
}

/// Subject name column
pub const NAME_COLUMN: &str = "name";

/// Required columns for tabular ingestion, in catalog order
pub fn required_columns() -> Vec<String> {
    std::iter::once(NAME_COLUMN.to_string())
        .chain(ScaleCode::all().iter().map(|s| s.t_column()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_matches_enum() {
        for (idx, scale) in ScaleCode::all().iter().enumerate() {
            assert_eq!(SCALE_CATALOG[idx].scale, *scale);
            assert_eq!(scale.definition().scale, *scale);
        }
    }

    #[test]
    fn test_subscale_counts() {
        let counts: Vec<usize> = SCALE_CATALOG.iter().map(|d| d.subscales.len()).collect();
        assert_eq!(counts, vec![4, 4, 3, 4, 5, 5, 3]);
        for def in SCALE_CATALOG.iter() {
            assert!((3..=5).contains(&def.subscales.len()), "{} out of range", def.code());
        }
    }

    #[test]
    fn test_from_code_case_insensitive() {
        assert_eq!(ScaleCode::from_code("ns"), Some(ScaleCode::NoveltySeeking));
        assert_eq!(ScaleCode::from_code(" Co "), Some(ScaleCode::Cooperativeness));
        assert_eq!(ScaleCode::from_code("XX"), None);
    }

    #[test]
    fn test_column_names() {
        assert_eq!(ScaleCode::HarmAvoidance.t_column(), "ha_t");
        assert_eq!(ScaleCode::HarmAvoidance.p_column(), "ha_p");
        assert_eq!(
            required_columns(),
            vec!["name", "ns_t", "ha_t", "rd_t", "ps_t", "sd_t", "co_t", "st_t"]
        );
    }

    #[test]
    fn test_subscale_owner() {
        assert_eq!(subscale_owner("sd5"), Some(ScaleCode::SelfDirectedness));
        assert_eq!(subscale_owner("rd3"), Some(ScaleCode::RewardDependence));
        assert_eq!(subscale_owner("rd4"), None);
        assert_eq!(subscale_owner("ns_t"), None);
    }

    #[test]
    fn test_serde_uses_short_codes() {
        let json = serde_json::to_string(&ScaleCode::SelfTranscendence).unwrap();
        assert_eq!(json, "\"ST\"");
        let parsed: ScaleCode = serde_json::from_str("\"PS\"").unwrap();
        assert_eq!(parsed, ScaleCode::Persistence);
    }

    #[test]
    fn test_temperament_partition() {
        let temperament: Vec<_> = ScaleCode::all().iter().filter(|s| s.is_temperament()).collect();
        assert_eq!(temperament.len(), 4);
        assert!(CHARACTER_SCALES.iter().all(|s| !s.is_temperament()));
    }
}
