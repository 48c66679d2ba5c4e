//! Skill detection over the unified posting text.
//!
//! The catalogue is fixed: every entry becomes one boolean column keyed
//! `hard_<name>` or `soft_<name>`, so the storage schema and the statistics
//! layer can rely on the same key set in the same order. Patterns are
//! compiled once per process and are word-boundary delimited, so "r" matches
//! "lenguaje r" but never the inside of "react".

use std::sync::LazyLock;

use regex::Regex;

use crate::records::SkillVector;
use crate::text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillKind {
    Hard,
    Soft,
}

/// One catalogue entry: stable column key plus its compiled pattern.
pub struct SkillEntry {
    pub key: String,
    pub kind: SkillKind,
    pattern: Regex,
}

const HARD_SKILLS: [&str; 45] = [
    "python",
    "java",
    "sql",
    "_net",
    "javascript",
    "html",
    "css",
    "django",
    "flask",
    "react",
    "angular",
    "node",
    "power bi",
    "sap",
    "aws",
    "azure",
    "git",
    "github",
    "ci/cd",
    "linux",
    "docker",
    "kubernetes",
    "etl",
    "big data",
    "data lake",
    "postgresql",
    "mysql",
    "nosql",
    "mongodb",
    "cloud",
    "bash",
    "jira",
    "excel",
    "autocad",
    "r",
    "office",
    "google_workspace",
    "matlab",
    "project",
    "solidworks",
    "manejo_de_datos",
    "seguridad",
    "desarrollo_web",
    "gestión_proyectos",
    "mejora_procesos",
];

const SOFT_SKILLS: [&str; 11] = [
    "comunicación",
    "trabajo en equipo",
    "proactividad",
    "compromiso",
    "adaptabilidad",
    "liderazgo",
    "responsabilidad",
    "creatividad",
    "resolución de problemas",
    "orientación al cliente",
    "pensamiento crítico",
];

/// The compiled catalogue, hard entries first, in declaration order.
pub static CATALOGUE: LazyLock<Vec<SkillEntry>> = LazyLock::new(|| {
    let mut entries = Vec::with_capacity(HARD_SKILLS.len() + SOFT_SKILLS.len());
    entries.extend(HARD_SKILLS.iter().map(|term| entry(SkillKind::Hard, term)));
    entries.extend(SOFT_SKILLS.iter().map(|term| entry(SkillKind::Soft, term)));
    entries
});

fn entry(kind: SkillKind, term: &str) -> SkillEntry {
    let prefix = match kind {
        SkillKind::Hard => "hard",
        SkillKind::Soft => "soft",
    };
    SkillEntry {
        key: format!("{}_{}", prefix, term.replace(['/', ' '], "_").to_lowercase()),
        kind,
        pattern: text::word_pattern(term),
    }
}

/// Evaluate every catalogue pattern against one record's combined text.
pub fn detect(combined_text: &str) -> SkillVector {
    SkillVector::new(
        CATALOGUE
            .iter()
            .map(|entry| entry.pattern.is_match(combined_text))
            .collect(),
    )
}

/// Column keys in catalogue order.
pub fn keys() -> Vec<String> {
    CATALOGUE.iter().map(|entry| entry.key.clone()).collect()
}

/// Position of `key` in the catalogue, if it exists.
pub fn index_of(key: &str) -> Option<usize> {
    CATALOGUE.iter().position(|entry| entry.key == key)
}
