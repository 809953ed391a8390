use std::sync::LazyLock;

use regex::{Captures, Regex};
use termbook_glossary::Glossary;

/// `<TERM:key>>` where the key is any run of characters other than `>`.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<TERM:([^>]+)>>").expect("placeholder pattern compiles"));

/// Result of resolving placeholders in one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    /// Placeholders replaced by a definition.
    pub replaced: usize,
    /// Keys with no glossary entry, first occurrence order, without repeats.
    pub unresolved: Vec<String>,
}

/// Replace every `<TERM:key>>` whose key is in `glossary` with its definition.
/// Unknown keys are left verbatim. Definitions are inserted literally and are
/// not scanned again.
pub fn resolve_placeholders(text: &str, glossary: &Glossary) -> Substitution {
    let mut replaced = 0;
    let mut unresolved: Vec<String> = Vec::new();

    let resolved = PLACEHOLDER_RE.replace_all(text, |caps: &Captures| {
        let key = &caps[1];
        match glossary.get(key) {
            Some(definition) => {
                replaced += 1;
                definition.to_string()
            }
            None => {
                if !unresolved.iter().any(|seen| seen == key) {
                    unresolved.push(key.to_string());
                }
                caps[0].to_string()
            }
        }
    });

    Substitution {
        text: resolved.into_owned(),
        replaced,
        unresolved,
    }
}
