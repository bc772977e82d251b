//! Interpretation resolution with fallback
//!
//! # Fallback chain
//! 1. Exact key
//! 2. Anchored keys only: the generic `<scale>-High` / `<scale>-Low`
//!    entry for the anchoring scale and level, ignoring the partner
//! 3. `NoInterpretation`; callers render a "no data" default
//!
//! A miss is data, never an error.

use super::catalog::{CatalogSource, InterpretationRecord};
use crate::classifier::{CombinationKey, TypeCode};
use crate::normalizer::Level;
use serde::Serialize;
use tcir_common::scales::ScaleCode;
use tracing::{debug, warn};

/// Key prefix for temperament type narratives
pub const TEMPERAMENT_PREFIX: &str = "TEMPERAMENT";
/// Key prefix for character type narratives
pub const CHARACTER_PREFIX: &str = "CHARACTER";

/// What to look up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Exact catalog key, no fallback
    Exact(String),
    /// Combination key anchored on one scale at one level
    Anchored {
        key: String,
        scale: ScaleCode,
        level: Level,
    },
}

impl LookupKey {
    pub fn exact(key: impl Into<String>) -> Self {
        LookupKey::Exact(key.into())
    }

    /// `<PREFIX>-<code>`, e.g. `TEMPERAMENT-HML`
    pub fn type_code(prefix: &str, code: &TypeCode) -> Self {
        LookupKey::Exact(format!("{}-{}", prefix, code))
    }

    /// Generic scale narrative, e.g. `NS-High`
    pub fn scale_level(scale: ScaleCode, level: Level) -> Self {
        LookupKey::Exact(generic_scale_key(scale, level))
    }

    /// Two scales of one subject, e.g. `NSHA-HH`, anchored on the first
    pub fn scale_pair(first: ScaleCode, second: ScaleCode, key: CombinationKey) -> Self {
        LookupKey::Anchored {
            key: format!("{}{}-{}", first.code(), second.code(), key),
            scale: first,
            level: key.first(),
        }
    }

    /// One scale across two subjects, e.g. `NS-HL`, anchored on the first subject
    pub fn dyadic_scale(scale: ScaleCode, key: CombinationKey) -> Self {
        LookupKey::Anchored {
            key: format!("{}-{}", scale.code(), key),
            scale,
            level: key.first(),
        }
    }

    /// The key as requested, before any fallback
    pub fn requested(&self) -> &str {
        match self {
            LookupKey::Exact(key) | LookupKey::Anchored { key, .. } => key,
        }
    }

    /// Generic fallback key, if this key has one
    pub fn fallback(&self) -> Option<String> {
        match self {
            LookupKey::Anchored { scale, level, .. } if level.symbol() != 'M' => {
                Some(generic_scale_key(*scale, *level))
            }
            _ => None,
        }
    }
}

/// `<SCALE>-<High|Mid|Low>`
pub fn generic_scale_key(scale: ScaleCode, level: Level) -> String {
    format!("{}-{}", scale.code(), level.band_label())
}

/// Outcome of a lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum Resolution<'c> {
    Exact {
        key: String,
        record: &'c InterpretationRecord,
    },
    Fallback {
        requested: String,
        key: String,
        record: &'c InterpretationRecord,
    },
    NoInterpretation {
        requested: String,
    },
}

impl<'c> Resolution<'c> {
    pub fn record(&self) -> Option<&'c InterpretationRecord> {
        match self {
            Resolution::Exact { record, .. } | Resolution::Fallback { record, .. } => Some(*record),
            Resolution::NoInterpretation { .. } => None,
        }
    }

    pub fn requested(&self) -> &str {
        match self {
            Resolution::Exact { key, .. } => key,
            Resolution::Fallback { requested, .. } | Resolution::NoInterpretation { requested } => {
                requested
            }
        }
    }

    /// Key of the catalog entry actually used
    pub fn matched_key(&self) -> Option<&str> {
        match self {
            Resolution::Exact { key, .. } | Resolution::Fallback { key, .. } => Some(key.as_str()),
            Resolution::NoInterpretation { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.record().is_some()
    }

    /// Matched record, or the "no data" default
    pub fn record_or_default(&self) -> InterpretationRecord {
        self.record().cloned().unwrap_or_else(InterpretationRecord::no_data)
    }
}

/// Resolves lookup keys against an injected catalog
#[derive(Debug, Clone, Copy)]
pub struct InterpretationResolver<'c, C: CatalogSource + ?Sized> {
    catalog: &'c C,
}

impl<'c, C: CatalogSource + ?Sized> InterpretationResolver<'c, C> {
    pub fn new(catalog: &'c C) -> Self {
        Self { catalog }
    }

    pub fn resolve(&self, key: &LookupKey) -> Resolution<'c> {
        resolve(key, self.catalog)
    }
}

/// Run the fallback chain for `key` against `catalog`
pub fn resolve<'c, C: CatalogSource + ?Sized>(key: &LookupKey, catalog: &'c C) -> Resolution<'c> {
    let requested = key.requested();

    if let Some(record) = catalog.lookup(requested) {
        debug!(key = requested, "Interpretation matched exactly");
        return Resolution::Exact {
            key: requested.to_string(),
            record,
        };
    }

    if let Some(fallback) = key.fallback() {
        if let Some(record) = catalog.lookup(&fallback) {
            debug!(requested, fallback = %fallback, "Interpretation resolved by generic fallback");
            return Resolution::Fallback {
                requested: requested.to_string(),
                key: fallback,
                record,
            };
        }
    }

    warn!(key = requested, "No interpretation available");
    Resolution::NoInterpretation {
        requested: requested.to_string(),
    }
}
