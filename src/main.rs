use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ct_miner::cache::StatsCache;
use ct_miner::config::Settings;
use ct_miner::pipeline::{self, career, skills};
use ct_miner::records::{BatchOutput, ClassifiedRecord};
use ct_miner::{db, ingest, stats};

#[derive(Parser)]
#[command(name = "ct_miner", version, about = "Computrabajo job-postings miner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a scraped export and replace the stored dataset
    Process {
        /// Semicolon-separated export with a header row
        file: PathBuf,
        /// Rows to show per preview section
        #[arg(short = 'n', long, default_value_t = 5)]
        preview: usize,
    },
    /// Skill-frequency statistics for a career
    Skills {
        /// Career substring to match, e.g. "sistemas"
        #[arg(short, long)]
        career: String,
    },
    /// Salary distribution for a career
    Salaries {
        /// Career substring to match, e.g. "sistemas"
        #[arg(short, long)]
        career: String,
    },
    /// Row counts and cache configuration
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load();
    let cli = Cli::parse();

    match cli.command {
        Commands::Process { file, preview } => process(&settings, &file, preview),
        Commands::Skills { career } => {
            let conn = db::open(settings.db_path.as_ref())?;
            db::init_schema(&conn)?;
            let cache = StatsCache::new(Duration::from_secs(settings.cache_ttl_secs));
            let value = stats::skill_stats(&conn, &cache, &career)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Commands::Salaries { career } => {
            let conn = db::open(settings.db_path.as_ref())?;
            db::init_schema(&conn)?;
            let cache = StatsCache::new(Duration::from_secs(settings.cache_ttl_secs));
            let value = stats::salary_stats(&conn, &cache, &career)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Commands::Stats => {
            let conn = db::open(settings.db_path.as_ref())?;
            db::init_schema(&conn)?;
            let counts = db::counts(&conn)?;
            println!("ofertas: {}", counts.ofertas);
            println!("runs: {}", counts.runs);
            println!("careers: {}", career::labels().join(", "));
            println!("cache ttl: {}s", settings.cache_ttl_secs);
            Ok(())
        }
    }
}

fn process(settings: &Settings, file: &Path, preview: usize) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let records = ingest::decode_batch(&bytes)?;
    info!(records = records.len(), file = %file.display(), "batch ingested");

    let pb = ProgressBar::new(records.len() as u64);
    let output = pipeline::classify_batch_with_progress(records, |done| pb.inc(done as u64));
    pb.finish_and_clear();

    let conn = db::open(settings.db_path.as_ref())?;
    db::init_schema(&conn)?;
    let stored = db::replace_all(&conn, &output.accepted)?;
    let run_id = db::new_run_id();
    db::insert_run(&conn, &run_id, &output.summary)?;
    info!(%run_id, stored, "dataset replaced");

    println!("{}", serde_json::to_string_pretty(&output.summary)?);
    print_previews(&output, preview);
    Ok(())
}

fn print_previews(output: &BatchOutput, n: usize) {
    if n == 0 {
        return;
    }
    println!("\naccepted ({}):", output.accepted.len());
    for rec in output.accepted.iter().take(n) {
        println!(
            "  [{}] {} | {} | {}",
            rec.career,
            rec.title,
            rec.company,
            fmt_salary(rec.salary)
        );
        let detected = detected_skills(rec);
        if !detected.is_empty() {
            println!("      skills: {}", detected.join(", "));
        }
    }
    println!("\nrejected by domain ({}):", output.rejected_by_domain.len());
    for rec in output.rejected_by_domain.iter().take(n) {
        println!("  {}", rec.title);
    }
    println!(
        "\nrejected by classification ({}):",
        output.rejected_by_classification.len()
    );
    for rec in output.rejected_by_classification.iter().take(n) {
        println!("  {}", rec.title);
    }
}

fn detected_skills(record: &ClassifiedRecord) -> Vec<String> {
    skills::keys()
        .into_iter()
        .zip(record.skills.flags())
        .filter(|(_, set)| **set)
        .map(|(key, _)| key)
        .collect()
}

fn fmt_salary(salary: Option<f64>) -> String {
    match salary {
        Some(amount) => format!("S/ {amount:.2}"),
        None => "-".to_string(),
    }
}
