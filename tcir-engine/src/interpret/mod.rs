//! Narrative interpretation
//!
//! Lookup (`resolver`) and personalization (`placeholder`) are
//! independent steps: a record is resolved against the read-only
//! catalog first, then cloned with subject names substituted.

pub mod catalog;
pub mod placeholder;
pub mod resolver;

pub use catalog::{CatalogSource, InterpretationCatalog, InterpretationRecord};
pub use placeholder::{personalize, substitute, NameBindings};
pub use resolver::{resolve, InterpretationResolver, LookupKey, Resolution};

use serde::{Deserialize, Serialize};

/// Resolved, personalized narrative ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub requested_key: String,
    /// Catalog key actually used; `None` when nothing matched
    pub matched_key: Option<String>,
    pub fallback: bool,
    pub record: InterpretationRecord,
}

impl Narrative {
    /// Personalize a resolution, substituting "no data" for misses
    pub fn from_resolution(resolution: &Resolution<'_>, bindings: &NameBindings) -> Self {
        Self {
            requested_key: resolution.requested().to_string(),
            matched_key: resolution.matched_key().map(str::to_string),
            fallback: matches!(resolution, Resolution::Fallback { .. }),
            record: personalize(&resolution.record_or_default(), bindings),
        }
    }

    /// Resolve and personalize in one step
    pub fn lookup<C: CatalogSource + ?Sized>(key: &LookupKey, catalog: &C, bindings: &NameBindings) -> Self {
        Self::from_resolution(&resolve(key, catalog), bindings)
    }

    pub fn is_found(&self) -> bool {
        self.matched_key.is_some()
    }
}
