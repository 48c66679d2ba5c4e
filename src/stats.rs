//! Aggregate statistics over the stored dataset, fronted by the TTL cache.
//!
//! Both queries share the flow: normalize the career parameter into a cache
//! key, serve a fresh entry if one exists, otherwise read matching rows,
//! aggregate, cache the result and return it.

use std::cmp::Ordering;

use anyhow::Result;
use itertools::Itertools;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::{cache_key, StatsCache};
use crate::db::{self, StoredRecord};
use crate::pipeline::skills::{self, SkillKind};
use crate::records::ClassifiedRecord;

/// Salaries at or below this are outliers (part-time and per-day postings)
/// and stay out of the distribution.
const SALARY_FLOOR: f64 = 1500.0;

/// One skill with its mention count, display-named for consumers.
#[derive(Debug, Clone, Serialize)]
pub struct SkillFrequency {
    pub nombre: String,
    pub frecuencia: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillStats {
    pub carrera: String,
    pub total_ofertas: usize,
    pub habilidades_tecnicas: Vec<SkillFrequency>,
    pub habilidades_blandas: Vec<SkillFrequency>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalaryEntry {
    pub puesto: String,
    pub salario: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalaryStats {
    pub salarios: Vec<SalaryEntry>,
}

/// Swap the stored dataset and drop every cached statistic computed from
/// the previous one. Callers holding a cache over the store must replace
/// through here, or reads may serve numbers from a dataset that no longer
/// exists.
pub fn replace_dataset(
    conn: &Connection,
    cache: &StatsCache,
    records: &[ClassifiedRecord],
) -> Result<usize> {
    let stored = db::replace_all(conn, records)?;
    cache.clear();
    Ok(stored)
}

/// Skill mention counts for postings whose career matches `career`.
pub fn skill_stats(conn: &Connection, cache: &StatsCache, career: &str) -> Result<Value> {
    let key = cache_key("habilidades", career);
    if let Some(hit) = cache.get(&key) {
        debug!(key, "skill stats served from cache");
        return Ok(hit);
    }
    let rows = db::fetch_by_career(conn, career)?;
    let value = serde_json::to_value(compute_skill_stats(career, &rows))?;
    cache.set(&key, value.clone());
    Ok(value)
}

/// Salary distribution for postings whose career matches `career`.
pub fn salary_stats(conn: &Connection, cache: &StatsCache, career: &str) -> Result<Value> {
    let key = cache_key("salarios", career);
    if let Some(hit) = cache.get(&key) {
        debug!(key, "salary stats served from cache");
        return Ok(hit);
    }
    let rows = db::fetch_by_career(conn, career)?;
    let value = serde_json::to_value(compute_salary_stats(&rows))?;
    cache.set(&key, value.clone());
    Ok(value)
}

fn compute_skill_stats(career: &str, rows: &[StoredRecord]) -> SkillStats {
    let mut counts = vec![0usize; skills::CATALOGUE.len()];
    for row in rows {
        for (count, set) in counts.iter_mut().zip(&row.skills) {
            if *set {
                *count += 1;
            }
        }
    }

    let ranked = |kind: SkillKind| -> Vec<SkillFrequency> {
        skills::CATALOGUE
            .iter()
            .zip(&counts)
            .filter(|(entry, _)| entry.kind == kind)
            .map(|(entry, count)| SkillFrequency {
                nombre: display_name(&entry.key),
                frecuencia: *count,
            })
            .sorted_by(|a, b| b.frecuencia.cmp(&a.frecuencia))
            .collect()
    };

    SkillStats {
        carrera: career.trim().to_string(),
        total_ofertas: rows.len(),
        habilidades_tecnicas: ranked(SkillKind::Hard),
        habilidades_blandas: ranked(SkillKind::Soft),
    }
}

/// Ascending salary list, one entry per distinct title. When a title
/// repeats, its highest salary wins.
fn compute_salary_stats(rows: &[StoredRecord]) -> SalaryStats {
    let salarios = rows
        .iter()
        .filter_map(|row| row.salary.map(|amount| (row.title.clone(), amount)))
        .filter(|(_, amount)| *amount > SALARY_FLOOR)
        .sorted_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal))
        .unique_by(|(title, _)| title.clone())
        .sorted_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .map(|(puesto, salario)| SalaryEntry { puesto, salario })
        .collect();
    SalaryStats { salarios }
}

/// Human-facing skill name: the column key minus its kind prefix, with the
/// leading letter upper-cased ("hard_power_bi" becomes "Power bi").
fn display_name(key: &str) -> String {
    let name = key
        .splitn(2, '_')
        .nth(1)
        .unwrap_or(key)
        .replace('_', " ");
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => name,
    }
}
