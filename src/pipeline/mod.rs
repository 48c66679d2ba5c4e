//! The record-classification pipeline.
//!
//! Stage order per record: normalization (salary parse, case folding, line
//! flattening), the engineering-domain filter, then career classification
//! and skill detection, then projection into the stored shape. A record
//! rejected by the domain filter is kept verbatim; one no category claims
//! is kept in normalized form. Nothing is silently dropped.

pub mod career;
pub mod domain;
pub mod salary;
pub mod skills;

use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::records::{
    AuditSummary, BatchOutput, ClassifiedRecord, NormalizedRecord, RawRecord, SkillVector,
};
use crate::text;

/// Null-fill sentinel for text fields with no scraped value.
pub const UNSPECIFIED: &str = "No especificado";

/// Records evaluated per parallel chunk.
const CHUNK_SIZE: usize = 500;

/// Source columns that do not survive into the final projection. Reported
/// in the audit summary in this order.
pub const DROPPED_COLUMNS: [&str; 9] = [
    "Subtítulo",
    "Calificación",
    "URL_Empresa",
    "Región",
    "Requerimientos",
    "Contrato",
    "Descripción",
    "texto_skills",
    "Acerca_de_Empresa",
];

enum Outcome {
    Accepted {
        record: ClassifiedRecord,
        filled_company: bool,
        filled_modality: bool,
    },
    OutOfDomain(RawRecord),
    Unclassified(NormalizedRecord),
}

/// Classify a whole batch. Records are evaluated independently (and in
/// parallel), outcomes merged in input order, so two runs over the same
/// input produce identical output.
pub fn classify_batch(records: Vec<RawRecord>) -> BatchOutput {
    classify_batch_with_progress(records, |_| {})
}

/// Same as [`classify_batch`], reporting the number of records finished
/// after each chunk.
pub fn classify_batch_with_progress<F>(records: Vec<RawRecord>, mut on_chunk: F) -> BatchOutput
where
    F: FnMut(usize),
{
    let original = records.len();

    let mut accepted = Vec::new();
    let mut rejected_by_domain = Vec::new();
    let mut rejected_by_classification = Vec::new();
    let mut filled_company = false;
    let mut filled_modality = false;

    let chunks = records.into_iter().chunks(CHUNK_SIZE);
    for chunk in &chunks {
        let batch: Vec<RawRecord> = chunk.collect();
        let evaluated = batch.len();
        let outcomes: Vec<Outcome> = batch.into_par_iter().map(evaluate).collect();
        for outcome in outcomes {
            match outcome {
                Outcome::Accepted {
                    record,
                    filled_company: fc,
                    filled_modality: fm,
                } => {
                    filled_company |= fc;
                    filled_modality |= fm;
                    accepted.push(record);
                }
                Outcome::OutOfDomain(raw) => rejected_by_domain.push(raw),
                Outcome::Unclassified(normalized) => rejected_by_classification.push(normalized),
            }
        }
        on_chunk(evaluated);
    }

    let salaries_parsed = accepted.iter().filter(|r| r.salary.is_some()).count();
    let filled_salary = accepted.iter().any(|r| r.salary.is_none());

    let mut filled_fields = Vec::new();
    if filled_company {
        filled_fields.push("company".to_string());
    }
    if filled_salary {
        filled_fields.push("salary".to_string());
    }
    if filled_modality {
        filled_fields.push("modality".to_string());
    }

    let summary = AuditSummary {
        original,
        rejected: rejected_by_domain.len() + rejected_by_classification.len(),
        accepted: accepted.len(),
        salaries_parsed,
        filled_fields,
        dropped_columns: DROPPED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        characters_sanitized: true,
        skill_columns: skills::keys(),
    };

    info!(
        original,
        accepted = summary.accepted,
        out_of_domain = rejected_by_domain.len(),
        unclassified = rejected_by_classification.len(),
        "batch classified"
    );

    BatchOutput {
        accepted,
        rejected_by_domain,
        rejected_by_classification,
        summary,
    }
}

fn evaluate(raw: RawRecord) -> Outcome {
    let record = normalize(raw);

    if !domain::is_engineering(&record.title, &record.description) {
        debug!(title = %record.raw.title, "rejected by domain filter");
        return Outcome::OutOfDomain(record.raw);
    }

    let career = career::classify(
        &record.title,
        &record.subtitle,
        &record.description,
        &record.requirements,
    );
    if career == career::UNCLASSIFIED {
        debug!(title = %record.title, "no category claimed the record");
        return Outcome::Unclassified(record);
    }

    let skills = skills::detect(&record.combined_text);
    project(record, career, skills)
}

/// Derive the lower-cased and salary-parsed view of one raw record.
pub fn normalize(raw: RawRecord) -> NormalizedRecord {
    let salary = salary::parse(&raw.salary_text);
    let title = raw.title.to_lowercase();
    let subtitle = raw.subtitle.to_lowercase();
    let description = text::flatten_lower(&raw.description);
    let requirements = text::flatten_lower(&raw.requirements);
    let combined_text = format!("{} {}", description, requirements);
    NormalizedRecord {
        raw,
        salary,
        title,
        subtitle,
        description,
        requirements,
        combined_text,
    }
}

fn project(record: NormalizedRecord, career: &str, skills: SkillVector) -> Outcome {
    let company = text::sanitize(&record.raw.company);
    let workday = text::sanitize(&record.raw.workday);
    let modality = text::sanitize(&record.raw.modality);

    let filled_company = company.trim().is_empty();
    let filled_modality = modality.trim().is_empty();

    Outcome::Accepted {
        record: ClassifiedRecord {
            career: career.to_string(),
            title: text::sanitize(&record.title),
            company: if filled_company { UNSPECIFIED.to_string() } else { company },
            workday,
            modality: if filled_modality { UNSPECIFIED.to_string() } else { modality },
            salary: record.salary,
            skills,
        },
        filled_company,
        filled_modality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, description: &str, requirements: &str, salary: &str) -> RawRecord {
        RawRecord {
            title: title.to_string(),
            description: description.to_string(),
            requirements: requirements.to_string(),
            company: "Acme".to_string(),
            workday: "Completa".to_string(),
            modality: "Remoto".to_string(),
            salary_text: salary.to_string(),
            ..RawRecord::default()
        }
    }

    fn sample_batch() -> Vec<RawRecord> {
        vec![
            raw(
                "Desarrollador de Sistemas",
                "Equipo de ingeniería de sistemas",
                "Dominio de Python y Java",
                "S/ 2,500.00 (aprox)",
            ),
            raw(
                "Cocinero",
                "Restaurante de comida criolla",
                "Experiencia en cocina",
                "1800",
            ),
            raw(
                "Asistente de ingeniería",
                "Apoyo administrativo al área de ingeniería",
                "Sin requisitos",
                "",
            ),
        ]
    }

    #[test]
    fn batch_partitions_completely() {
        let output = classify_batch(sample_batch());
        assert_eq!(output.accepted.len(), 1);
        assert_eq!(output.rejected_by_domain.len(), 1);
        assert_eq!(output.rejected_by_classification.len(), 1);
        assert_eq!(
            output.accepted.len()
                + output.rejected_by_domain.len()
                + output.rejected_by_classification.len(),
            output.summary.original
        );
        assert_eq!(output.summary.rejected, 2);
        assert_eq!(output.summary.accepted, 1);
    }

    #[test]
    fn accepted_record_is_fully_derived() {
        let output = classify_batch(sample_batch());
        let rec = &output.accepted[0];
        assert_eq!(rec.career, "Ingeniería de Sistemas");
        assert_eq!(rec.title, "desarrollador de sistemas");
        assert_eq!(rec.salary, Some(2500.0));
        let python = skills::index_of("hard_python").unwrap();
        let java = skills::index_of("hard_java").unwrap();
        assert!(rec.skills.flags()[python]);
        assert!(rec.skills.flags()[java]);
    }

    #[test]
    fn domain_rejects_keep_the_raw_record() {
        let output = classify_batch(sample_batch());
        assert_eq!(output.rejected_by_domain[0].title, "Cocinero");
        assert_eq!(output.rejected_by_domain[0].salary_text, "1800");
    }

    #[test]
    fn rerun_is_deterministic() {
        let first = classify_batch(sample_batch());
        let second = classify_batch(sample_batch());
        assert_eq!(first.summary, second.summary);
        assert_eq!(
            first.accepted.iter().map(|r| &r.title).collect::<Vec<_>>(),
            second.accepted.iter().map(|r| &r.title).collect::<Vec<_>>()
        );
    }

    #[test]
    fn empty_fields_are_filled_and_reported() {
        let mut record = raw("Ingeniero de minas", "Operación en mina", "", "");
        record.company = String::new();
        record.modality = String::new();
        let output = classify_batch(vec![record]);
        let rec = &output.accepted[0];
        assert_eq!(rec.company, UNSPECIFIED);
        assert_eq!(rec.modality, UNSPECIFIED);
        assert_eq!(
            output.summary.filled_fields,
            vec!["company", "salary", "modality"]
        );
    }

    #[test]
    fn summary_counts_parsed_salaries_only() {
        // Rejected records never contribute to the salary tally, and no
        // accepted record here needed a fill.
        let output = classify_batch(sample_batch());
        assert_eq!(output.summary.salaries_parsed, 1);
        assert!(output.summary.filled_fields.is_empty());
    }

    #[test]
    fn rejected_by_classification_is_normalized() {
        let output = classify_batch(sample_batch());
        let rec = &output.rejected_by_classification[0];
        assert_eq!(rec.title, "asistente de ingeniería");
        assert_eq!(rec.salary, None);
    }
}
