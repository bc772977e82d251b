//! Interpretation catalog
//!
//! The catalog is an opaque keyed table of narrative records supplied by
//! the caller. The engine never writes to it. Any type that can look up
//! a record by key can serve as a catalog through `CatalogSource`.

use crate::error::{ScoringError, ScoringResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

/// Narrative payload: label plus prose fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretationRecord {
    pub label: String,
    #[serde(default)]
    pub summary: String,
    /// Additional prose sections (strengths, cautions, advice, ...)
    #[serde(default)]
    pub sections: BTreeMap<String, String>,
}

impl InterpretationRecord {
    pub fn new(label: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            summary: summary.into(),
            sections: BTreeMap::new(),
        }
    }

    pub fn with_section(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.sections.insert(name.into(), text.into());
        self
    }

    /// Catalog-agnostic default shown when nothing matched
    pub fn no_data() -> Self {
        Self::new("No data", "No interpretation is available for this result.")
    }

    /// Apply `f` to every text field, returning a new record
    pub fn map_text(&self, mut f: impl FnMut(&str) -> String) -> Self {
        Self {
            label: f(&self.label),
            summary: f(&self.summary),
            sections: self
                .sections
                .iter()
                .map(|(name, text)| (name.clone(), f(text)))
                .collect(),
        }
    }
}

/// Read-only keyed lookup of interpretation records
pub trait CatalogSource {
    fn lookup(&self, key: &str) -> Option<&InterpretationRecord>;
}

impl CatalogSource for HashMap<String, InterpretationRecord> {
    fn lookup(&self, key: &str) -> Option<&InterpretationRecord> {
        self.get(key)
    }
}

impl CatalogSource for BTreeMap<String, InterpretationRecord> {
    fn lookup(&self, key: &str) -> Option<&InterpretationRecord> {
        self.get(key)
    }
}

/// Catalog loaded from a JSON or TOML document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterpretationCatalog {
    entries: BTreeMap<String, InterpretationRecord>,
}

impl InterpretationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, record: InterpretationRecord) {
        self.entries.insert(key.into(), record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn from_json_str(text: &str) -> ScoringResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_toml_str(text: &str) -> ScoringResult<Self> {
        toml::from_str(text).map_err(|e| ScoringError::CatalogFormat(e.to_string()))
    }

    /// Load a catalog file, choosing the format by extension
    ///
    /// # Errors
    /// - `Common(Io)` if the file cannot be read
    /// - `CatalogFormat` for unknown extensions or malformed TOML
    /// - `Json` for malformed JSON
    pub fn from_path(path: &Path) -> ScoringResult<Self> {
        let text = std::fs::read_to_string(path).map_err(tcir_common::Error::from)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let catalog = match extension.as_deref() {
            Some("json") => Self::from_json_str(&text)?,
            Some("toml") => Self::from_toml_str(&text)?,
            other => {
                return Err(ScoringError::CatalogFormat(format!(
                    "unsupported catalog extension {:?} for {}",
                    other,
                    path.display()
                )))
            }
        };

        info!(entries = catalog.len(), path = %path.display(), "Loaded interpretation catalog");
        Ok(catalog)
    }
}

impl CatalogSource for InterpretationCatalog {
    fn lookup(&self, key: &str) -> Option<&InterpretationRecord> {
        self.entries.get(key)
    }
}

impl FromIterator<(String, InterpretationRecord)> for InterpretationCatalog {
    fn from_iter<I: IntoIterator<Item = (String, InterpretationRecord)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_catalog() {
        let catalog = InterpretationCatalog::from_json_str(
            r#"{"NS-High": {"label": "Explorer", "summary": "Seeks novelty", "sections": {"advice": "Pace yourself"}}}"#,
        )
        .unwrap();
        let record = catalog.lookup("NS-High").unwrap();
        assert_eq!(record.label, "Explorer");
        assert_eq!(record.sections["advice"], "Pace yourself");
        assert!(catalog.lookup("NS-Low").is_none());
    }

    #[test]
    fn test_toml_catalog_defaults_optional_fields() {
        let catalog = InterpretationCatalog::from_toml_str("[\"HA-Low\"]\nlabel = \"Bold\"\n").unwrap();
        let record = catalog.lookup("HA-Low").unwrap();
        assert_eq!(record.summary, "");
        assert!(record.sections.is_empty());
    }

    #[test]
    fn test_malformed_toml_is_format_error() {
        let result = InterpretationCatalog::from_toml_str("label = ");
        assert!(matches!(result, Err(ScoringError::CatalogFormat(_))));
    }

    #[test]
    fn test_map_text_leaves_original_untouched() {
        let record = InterpretationRecord::new("A", "a").with_section("x", "aa");
        let upper = record.map_text(|s| s.to_uppercase());
        assert_eq!(upper.summary, "A");
        assert_eq!(upper.sections["x"], "AA");
        assert_eq!(record.summary, "a");
    }

    #[test]
    fn test_hashmap_is_catalog_source() {
        let mut map = HashMap::new();
        map.insert("CO-High".to_string(), InterpretationRecord::new("Warm", ""));
        assert_eq!(map.lookup("CO-High").map(|r| r.label.as_str()), Some("Warm"));
    }
}
