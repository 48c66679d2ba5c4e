//! Tiered career classification.
//!
//! Resolution order per record: principal program names by containment,
//! then word-boundary keyword scoring with an early exit, then the best
//! sub-threshold score, then a containment fallback gated on a generic
//! engineer mention. The category table is in canonical priority order and
//! that order breaks every tie.

use std::sync::LazyLock;

use regex::Regex;

use crate::text;

/// Sentinel label for records no category claims.
pub const UNCLASSIFIED: &str = "No clasificado";

/// Generic engineer mention that gates the tier-4 fallback. Matches both
/// "ingeniero" and "ingeniería".
const ENGINEER_MARKER: &str = "ingenier";

/// Keyword hits at or above this resolve a category outright.
const SCORE_THRESHOLD: usize = 2;

struct Category {
    label: &'static str,
    /// Unambiguous program names, checked first by plain containment.
    principals: &'static [&'static str],
    /// Scoring keywords; the leading two double as the tier-4 subset.
    keywords: &'static [&'static str],
}

const CATEGORIES: [Category; 6] = [
    Category {
        label: "Ingeniería de Sistemas",
        principals: &["ingeniería de sistemas"],
        keywords: &[
            "ingeniería de sistemas",
            "ing. sistemas",
            "sistemas",
            "informática",
            "python",
            "java",
            "sql",
        ],
    },
    Category {
        label: "Ingeniería de Minas",
        principals: &["ingeniería de minas"],
        keywords: &["ingeniería de minas", "minería", "voladura", "mina", "unidad minera"],
    },
    Category {
        label: "Ingeniería Industrial",
        principals: &["ingeniería industrial"],
        keywords: &[
            "ingeniería industrial",
            "procesos",
            "gestión de calidad",
            "producción",
            "logística",
        ],
    },
    Category {
        label: "Ingeniería Civil",
        principals: &["ingeniería civil"],
        keywords: &["ingeniería civil", "autocad", "estructuras", "obra", "planos"],
    },
    Category {
        label: "Ingeniería Ambiental",
        principals: &["ingeniería ambiental"],
        keywords: &["ingeniería ambiental", "medio ambiente", "impacto ambiental", "residuos"],
    },
    Category {
        label: "Ingeniería Agrónoma",
        principals: &["ingeniería agrónoma"],
        keywords: &["ingeniería agrónoma", "cultivos", "agronomía", "agroindustria", "agrícola"],
    },
];

/// Word-boundary patterns per category, compiled once.
static KEYWORD_PATTERNS: LazyLock<Vec<Vec<Regex>>> = LazyLock::new(|| {
    CATEGORIES
        .iter()
        .map(|cat| cat.keywords.iter().map(|k| text::word_pattern(k)).collect())
        .collect()
});

/// All category labels, in priority order.
pub fn labels() -> Vec<&'static str> {
    CATEGORIES.iter().map(|cat| cat.label).collect()
}

/// Classify one record from its lower-cased text fields.
pub fn classify(title: &str, subtitle: &str, description: &str, requirements: &str) -> &'static str {
    let fields = [title, subtitle, description, requirements];

    // Tier 1: a principal name anywhere resolves immediately.
    for cat in &CATEGORIES {
        if cat
            .principals
            .iter()
            .any(|p| fields.iter().any(|f| f.contains(p)))
        {
            return cat.label;
        }
    }

    let combined = fields.join(" ");

    // Tier 2: keyword scoring with an early exit at the threshold.
    let mut scores = vec![0usize; CATEGORIES.len()];
    for (i, patterns) in KEYWORD_PATTERNS.iter().enumerate() {
        let hits = patterns.iter().filter(|p| p.is_match(&combined)).count();
        if hits >= SCORE_THRESHOLD {
            return CATEGORIES[i].label;
        }
        scores[i] = hits;
    }

    // Tier 3: best sub-threshold score; a strictly greater score is needed
    // to displace an earlier category.
    let mut best: Option<usize> = None;
    for (i, score) in scores.iter().enumerate() {
        if *score > 0 && best.map_or(true, |b| *score > scores[b]) {
            best = Some(i);
        }
    }
    if let Some(i) = best {
        return CATEGORIES[i].label;
    }

    // Tier 4: a generic engineer mention falls back to the leading keywords
    // by containment.
    if combined.contains(ENGINEER_MARKER) {
        for cat in &CATEGORIES {
            if cat.keywords.iter().take(2).any(|k| combined.contains(k)) {
                return cat.label;
            }
        }
    }

    UNCLASSIFIED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_name_resolves_first() {
        let got = classify("egresado de ingeniería civil", "", "", "");
        assert_eq!(got, "Ingeniería Civil");
    }

    #[test]
    fn principal_beats_higher_keyword_score() {
        // Civil wins on the title even though the description scores
        // Sistemas well past the threshold.
        let got = classify(
            "residente de obra - ingeniería civil",
            "",
            "se valora python, java, sql e informática",
            "",
        );
        assert_eq!(got, "Ingeniería Civil");
    }

    #[test]
    fn threshold_score_resolves() {
        let got = classify("analista", "", "manejo de autocad y planos", "");
        assert_eq!(got, "Ingeniería Civil");
    }

    #[test]
    fn single_hit_falls_to_best_score() {
        let got = classify("supervisor", "", "trabajo en mina a tajo abierto", "");
        assert_eq!(got, "Ingeniería de Minas");
    }

    #[test]
    fn tie_goes_to_the_earlier_category() {
        // One word-boundary hit each for Minas ("mina") and Civil ("obra").
        let got = classify("supervisor", "", "obra cerca de la mina", "");
        assert_eq!(got, "Ingeniería de Minas");
    }

    #[test]
    fn generic_engineer_mention_uses_fallback() {
        // "ing. sistemas" scores via tier 2 on word boundaries, so embed it
        // where only containment sees it.
        let got = classify("se busca ingeniero", "", "perfil: ing. sistemasx", "");
        assert_eq!(got, "Ingeniería de Sistemas");
    }

    #[test]
    fn no_signal_is_unclassified() {
        let got = classify("ingeniero", "", "puesto administrativo", "");
        assert_eq!(got, UNCLASSIFIED);
    }

    #[test]
    fn unrelated_text_is_unclassified() {
        let got = classify("cocinero", "", "cocina criolla", "");
        assert_eq!(got, UNCLASSIFIED);
    }
}
