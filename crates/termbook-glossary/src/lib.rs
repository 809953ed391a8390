//! Glossary definition loading and JSON export.
//!
//! A glossary definition is a YAML document of the form
//!
//! ```yaml
//! terms:
//!   - term: api
//!     definition: Application Programming Interface
//! ```
//!
//! Records are folded into a key → definition mapping in document order, so a
//! later record with the same `term` replaces an earlier one.

pub mod error;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

pub use error::{GlossaryError, GlossaryResult};

/// Resolved term → definition lookup table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Glossary {
    terms: BTreeMap<String, String>,
    duplicates: Vec<String>,
}

/// Single `{term, definition}` record as it appears in the definition file.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Deserialize)]
struct RawGlossary {
    #[serde(default)]
    terms: Option<Vec<GlossaryEntry>>,
}

impl Glossary {
    /// Read and parse the definition file at `path`.
    pub fn load(path: &Path) -> GlossaryResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                GlossaryError::MissingFile { path: path.into() }
            } else {
                GlossaryError::Io {
                    path: path.into(),
                    source,
                }
            }
        })?;

        let glossary = Self::from_yaml_str(&contents).map_err(|source| GlossaryError::Parse {
            path: path.into(),
            source,
        })?;

        for term in &glossary.duplicates {
            warn!(path = %path.display(), term = %term, "duplicate glossary term; later definition wins");
        }
        debug!(path = %path.display(), terms = glossary.len(), "loaded glossary");

        Ok(glossary)
    }

    /// Parse a YAML definition document. An empty document is an empty glossary.
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawGlossary = serde_yaml::from_str(contents)?;
        Ok(Self::from_entries(raw.terms.unwrap_or_default()))
    }

    /// Fold records into a mapping; the last record for a term wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = GlossaryEntry>,
    {
        let mut glossary = Self::default();
        for GlossaryEntry { term, definition } in entries {
            if glossary.terms.contains_key(&term) {
                glossary.duplicates.push(term.clone());
            }
            glossary.terms.insert(term, definition);
        }
        glossary
    }

    pub fn get(&self, term: &str) -> Option<&str> {
        self.terms.get(term).map(String::as_str)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms and definitions, ordered by term.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.terms
            .iter()
            .map(|(term, definition)| (term.as_str(), definition.as_str()))
    }

    /// Terms that appeared more than once in the source, in the order the
    /// repeats were seen.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Render the flat JSON export: two-space indentation, non-ASCII kept as
    /// is, keys sorted, trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut rendered = serde_json::to_string_pretty(&self.terms)?;
        rendered.push('\n');
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(term: &str, definition: &str) -> GlossaryEntry {
        GlossaryEntry {
            term: term.into(),
            definition: definition.into(),
        }
    }

    #[test]
    fn later_duplicates_overwrite_earlier_ones() {
        let glossary = Glossary::from_entries([
            entry("api", "first"),
            entry("sdk", "Software Development Kit"),
            entry("api", "second"),
        ]);

        assert_eq!(glossary.len(), 2);
        assert_eq!(glossary.get("api"), Some("second"));
        assert_eq!(glossary.duplicates(), ["api".to_string()]);
    }

    #[test]
    fn keys_are_matched_exactly() {
        let glossary = Glossary::from_entries([entry("API", "upper")]);
        assert!(glossary.contains("API"));
        assert!(!glossary.contains("api"));
        assert!(!glossary.contains(" API"));
    }

    #[test]
    fn missing_terms_key_is_empty() {
        let glossary = Glossary::from_yaml_str("title: Book glossary\n").unwrap();
        assert!(glossary.is_empty());

        let glossary = Glossary::from_yaml_str("   \n").unwrap();
        assert!(glossary.is_empty());
    }

    #[test]
    fn records_without_definition_are_rejected() {
        let err = Glossary::from_yaml_str("terms:\n  - term: api\n").unwrap_err();
        assert!(err.to_string().contains("definition"), "{err}");
    }

    #[test]
    fn json_export_keeps_non_ascii_and_indents() {
        let glossary = Glossary::from_entries([
            entry("devrel", "Developer Relations — связи с разработчиками"),
            entry("api", "Application Programming Interface"),
        ]);

        let json = glossary.to_json().unwrap();
        assert_eq!(
            json,
            "{\n  \"api\": \"Application Programming Interface\",\n  \"devrel\": \"Developer Relations — связи с разработчиками\"\n}\n"
        );
    }
}
