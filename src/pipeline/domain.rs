//! Engineering-domain pre-filter.
//!
//! Coarse on purpose: a false positive still ends up "No clasificado"
//! downstream, but a record rejected here never re-enters the pipeline.

/// Substring markers scanned over the lower-cased title and description.
const ENGINEERING_MARKERS: [&str; 8] = [
    "ingeniería",
    "ingeniero",
    "industrial",
    "sistemas",
    "civil",
    "ambiental",
    "agrónoma",
    "minas",
];

/// True when any marker appears in either field.
pub fn is_engineering(title: &str, description: &str) -> bool {
    ENGINEERING_MARKERS
        .iter()
        .any(|marker| title.contains(marker) || description.contains(marker))
}
