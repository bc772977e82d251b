//! Subject-name placeholder substitution
//!
//! Catalog prose addresses subjects as `A님` / `B님`. Substitution swaps
//! the token in front of the honorific for the subject's display name in
//! a single left-to-right pass, so a name that itself looks like a token
//! is never substituted twice.

use super::catalog::InterpretationRecord;

/// Honorific suffix that marks a placeholder token
pub const HONORIFIC: &str = "님";

/// Token → display name bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameBindings {
    patterns: Vec<(String, String)>,
}

impl NameBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `token` (e.g. "A") to `name`
    pub fn bind(mut self, token: &str, name: &str) -> Self {
        self.patterns
            .push((format!("{}{}", token, HONORIFIC), format!("{}{}", name, HONORIFIC)));
        // Longest pattern first so overlapping tokens resolve greedily
        self.patterns.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    /// Single-subject report: `A님` → name
    pub fn single(name: &str) -> Self {
        Self::new().bind("A", name)
    }

    /// Paired report: `A님` → first, `B님` → second
    pub fn pair(first: &str, second: &str) -> Self {
        Self::new().bind("A", first).bind("B", second)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Replace every bound placeholder in `text`
pub fn substitute(text: &str, bindings: &NameBindings) -> String {
    if bindings.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while !rest.is_empty() {
        for (pattern, replacement) in &bindings.patterns {
            if let Some(tail) = rest.strip_prefix(pattern.as_str()) {
                out.push_str(replacement);
                rest = tail;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

/// Clone `record` with placeholders substituted in every text field
pub fn personalize(record: &InterpretationRecord, bindings: &NameBindings) -> InterpretationRecord {
    record.map_text(|text| substitute(text, bindings))
}
