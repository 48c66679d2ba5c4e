//! Record types flowing through the pipeline, from raw scrape rows to the
//! final classified projection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One untyped row from the ingestion boundary. Values arrive exactly as
/// scraped; the pipeline never mutates a raw record, so a rejected one can
/// be surfaced verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub requirements: String,
    pub company: String,
    pub workday: String,
    pub modality: String,
    pub salary_text: String,
    /// Columns outside the known set, keyed by header name.
    pub extras: BTreeMap<String, String>,
}

/// A raw record plus its derived fields, computed once up front. Lower-cased
/// text feeds the domain filter, the classifier and the skill detector.
#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    pub raw: RawRecord,
    pub salary: Option<f64>,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub requirements: String,
    /// Description and requirements joined with a single space.
    pub combined_text: String,
}

/// One flag per skill-catalogue entry, in catalogue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillVector(Vec<bool>);

impl SkillVector {
    pub fn new(flags: Vec<bool>) -> Self {
        Self(flags)
    }

    pub fn flags(&self) -> &[bool] {
        &self.0
    }

    pub fn count_set(&self) -> usize {
        self.0.iter().filter(|f| **f).count()
    }
}

/// The accepted projection persisted for aggregation. Dropped source
/// columns do not appear here.
#[derive(Debug, Clone)]
pub struct ClassifiedRecord {
    pub career: String,
    pub title: String,
    pub company: String,
    pub workday: String,
    pub modality: String,
    pub salary: Option<f64>,
    pub skills: SkillVector,
}

/// Bookkeeping for one processing run. Field names on the wire stay in the
/// shape downstream consumers already parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    #[serde(rename = "originales")]
    pub original: usize,
    #[serde(rename = "eliminados")]
    pub rejected: usize,
    #[serde(rename = "finales")]
    pub accepted: usize,
    #[serde(rename = "transformaciones_salario")]
    pub salaries_parsed: usize,
    #[serde(rename = "rellenos")]
    pub filled_fields: Vec<String>,
    #[serde(rename = "columnas_eliminadas")]
    pub dropped_columns: Vec<String>,
    #[serde(rename = "caracteres_limpiados")]
    pub characters_sanitized: bool,
    #[serde(rename = "habilidades")]
    pub skill_columns: Vec<String>,
}

/// Everything one batch run produces. The three record sets partition the
/// input: every ingested record lands in exactly one of them.
#[derive(Debug)]
pub struct BatchOutput {
    pub accepted: Vec<ClassifiedRecord>,
    pub rejected_by_domain: Vec<RawRecord>,
    pub rejected_by_classification: Vec<NormalizedRecord>,
    pub summary: AuditSummary,
}
