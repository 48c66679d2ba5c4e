//! Text normalization shared across the pipeline stages.

use std::sync::LazyLock;

use regex::Regex;

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").unwrap());

// Word characters, whitespace and ".,:/()-" survive; everything else is noise
// from the scrape (emoji, bullets, stray markup).
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s.,:/()-]").unwrap());

/// Collapse CR/LF runs into single spaces and lower-case the result.
pub fn flatten_lower(text: &str) -> String {
    LINE_BREAKS.replace_all(text, " ").to_lowercase()
}

/// Strip characters outside the allowed set. Accented letters are word
/// characters and pass through untouched.
pub fn sanitize(text: &str) -> String {
    DISALLOWED.replace_all(text, "").into_owned()
}

/// Case-insensitive whole-word pattern for a literal term. Spaces and
/// slashes inside the term match verbatim.
pub fn word_pattern(term: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))).unwrap()
}
