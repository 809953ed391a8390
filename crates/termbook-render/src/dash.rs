/// Literal fence marker that toggles between prose and code.
const FENCE: &str = "```";

const DOUBLE_HYPHEN: &str = "--";
const EM_DASH: &str = "—";

/// Result of dash normalization for one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DashNormalization {
    pub text: String,
    /// `--` sequences converted in prose.
    pub replaced: usize,
    /// The document ended while inside a fenced region.
    pub unterminated_fence: bool,
}

/// Convert `--` to an em-dash outside fenced code.
///
/// Every occurrence of [`FENCE`] flips the code state, wherever it appears on a
/// line, and any text after it (a language tag included) belongs to the new
/// state. Code is copied byte for byte. Conversion is left to right without
/// overlap, so `---` becomes `—-`. When the text ends inside a fence, the
/// trailing content stays code and `unterminated_fence` is set.
pub fn normalize_dashes(text: &str) -> DashNormalization {
    let mut output = String::with_capacity(text.len());
    let mut replaced = 0;
    let mut in_code = false;

    for (idx, segment) in text.split(FENCE).enumerate() {
        if idx > 0 {
            output.push_str(FENCE);
            in_code = !in_code;
        }

        if in_code {
            output.push_str(segment);
        } else {
            let hits = segment.matches(DOUBLE_HYPHEN).count();
            if hits == 0 {
                output.push_str(segment);
            } else {
                replaced += hits;
                output.push_str(&segment.replace(DOUBLE_HYPHEN, EM_DASH));
            }
        }
    }

    DashNormalization {
        text: output,
        replaced,
        unterminated_fence: in_code,
    }
}
