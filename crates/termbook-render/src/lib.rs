//! Text transforms applied to a document before it is staged.

mod dash;
mod placeholder;

pub use dash::{normalize_dashes, DashNormalization};
pub use placeholder::{resolve_placeholders, Substitution};

use termbook_glossary::Glossary;

/// A document after placeholder resolution and dash normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub terms_replaced: usize,
    pub dashes_replaced: usize,
    pub unresolved: Vec<String>,
    pub unterminated_fence: bool,
}

/// Resolve placeholders first, then normalize dashes on the result.
pub fn render_document(text: &str, glossary: &Glossary) -> Rendered {
    let Substitution {
        text,
        replaced,
        unresolved,
    } = resolve_placeholders(text, glossary);
    let DashNormalization {
        text,
        replaced: dashes_replaced,
        unterminated_fence,
    } = normalize_dashes(&text);

    Rendered {
        text,
        terms_replaced: replaced,
        dashes_replaced,
        unresolved,
        unterminated_fence,
    }
}
