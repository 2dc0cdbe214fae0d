mod db;
mod document;
mod normalize;
mod output;
mod parser;
mod record;
mod scraper;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use record::ExtractedRecord;

#[derive(Parser)]
#[command(
    name = "fispq_scraper",
    about = "Scrapes FISPQ/MSDS safety data sheets, extracts chemical-safety fields, stores them for lookup"
)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, default_value = "data/fispq.sqlite")]
    db: PathBuf,
    /// Directory for per-document and consolidated JSON output
    #[arg(long, global = true, default_value = "data/json")]
    out_dir: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download PDFs from the configured sources, extract and persist
    Run {
        /// Only scrape this source (cipa, labsynth)
        #[arg(short, long)]
        source: Option<String>,
        /// Max documents to process
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Load an existing consolidated JSON file into the store
    Load { path: PathBuf },
    /// Look up stored products
    Query {
        /// Exact UN number
        #[arg(long)]
        un: Option<String>,
        /// Substance name substring (case-insensitive)
        #[arg(long)]
        substance: Option<String>,
        /// Exact hazard class (e.g. "8" or "5.1")
        #[arg(long)]
        hazard_class: Option<String>,
    },
    /// Export the store to a JSON array of records
    Export {
        #[arg(default_value = "data/json/export_database.json")]
        output: PathBuf,
    },
    /// Show aggregate statistics
    Stats,
    /// Run extraction on a single PDF or text file
    Test { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { source, limit } => {
            run_batch(&cli.db, &cli.out_dir, source.as_deref(), limit).await
        }
        Commands::Load { path } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let report = db::load_from_json_file(&conn, &path)?;
            println!(
                "Loaded {} records into the store ({} errors).",
                report.success, report.errors
            );
            Ok(())
        }
        Commands::Query {
            un,
            substance,
            hazard_class,
        } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            query(&conn, un.as_deref(), substance.as_deref(), hazard_class.as_deref())
        }
        Commands::Export { output } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let records = db::export_all(&conn)?;
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&output, serde_json::to_string_pretty(&records)?)?;
            println!("Exported {} products to {}", records.len(), output.display());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            print_stats(&conn)
        }
        Commands::Test { file } => test_extraction(&cli.out_dir, &file),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

// ── Batch ──

struct BatchCounts {
    stored: usize,
    skipped: usize,
    failed: usize,
}

async fn run_batch(
    db_path: &Path,
    out_dir: &Path,
    source_filter: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    let conn = db::connect(db_path)?;
    db::init_schema(&conn)?;
    let client = scraper::client()?;

    let mut links = Vec::new();
    for source in scraper::SOURCES {
        if source_filter.is_some_and(|f| f != source.name) {
            continue;
        }
        match scraper::discover_links(&client, source).await {
            Ok(mut found) => links.append(&mut found),
            Err(e) => warn!("Skipping source {}: {e:#}", source.name),
        }
    }
    if let Some(n) = limit {
        links.truncate(n);
    }
    if links.is_empty() {
        anyhow::bail!("no documents found at any source");
    }

    println!("Processing {} documents...", links.len());
    let pb = ProgressBar::new(links.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let profile = &*parser::profile::STANDARD;
    let mut records: Vec<ExtractedRecord> = Vec::new();
    let mut counts = BatchCounts {
        stored: 0,
        skipped: 0,
        failed: 0,
    };

    // One document at a time: download, extract, write, persist. Whatever is
    // committed survives an interrupted batch.
    for link in &links {
        let record = match scraper::download_with_retry(&client, &link.url).await {
            Ok(bytes) => match document::text_from_pdf_bytes(&bytes) {
                Ok(text) => parser::process_document(&link.file_name, &text, profile),
                Err(e) => ExtractedRecord::error_stub(&link.file_name, e.to_string()),
            },
            Err(e) => {
                warn!("Download failed for {}: {e:#}", link.url);
                counts.failed += 1;
                pb.inc(1);
                continue;
            }
        };

        if let Err(e) = output::write_record(out_dir, &record) {
            warn!("Failed to write output for {}: {e:#}", record.source_file);
        }

        if record.is_eligible() {
            match db::insert_record(&conn, &record) {
                Ok(Some(_)) => counts.stored += 1,
                Ok(None) => counts.skipped += 1,
                // keep the record in the consolidated output even though the
                // store write failed; the two outputs may disagree
                Err(e) => warn!("Store insert failed for {}: {e:#}", record.source_file),
            }
            records.push(record);
        } else if record.error.is_some() {
            counts.failed += 1;
        } else {
            info!(
                "Skipping {} (no UN number or substance found)",
                record.source_file
            );
            counts.skipped += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let path = output::write_consolidated(out_dir, &records)?;
    println!("Consolidated output: {}", path.display());

    let removed = output::cleanup_invalid(out_dir)?;
    if removed > 0 {
        println!("Removed {removed} outputs without minimum data.");
    }

    println!(
        "Done: {} stored, {} skipped, {} failed of {} documents.",
        counts.stored,
        counts.skipped,
        counts.failed,
        links.len()
    );
    print_stats(&conn)
}

// ── Query / stats ──

fn query(
    conn: &rusqlite::Connection,
    un: Option<&str>,
    substance: Option<&str>,
    hazard_class: Option<&str>,
) -> Result<()> {
    let rows: Vec<db::ProductRow> = if let Some(un) = un {
        db::find_by_un_number(conn, un)?.into_iter().collect()
    } else if let Some(substance) = substance {
        db::find_by_substance(conn, substance)?
    } else if let Some(class) = hazard_class {
        db::find_by_hazard_class(conn, class)?
    } else {
        anyhow::bail!("pass one of --un, --substance, --hazard-class");
    };

    if rows.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    println!(
        "{:>3} | {:<6} | {:<30} | {:<5} | {:<4} | {:<24}",
        "#", "UN", "Substance", "Class", "Risk", "Source"
    );
    println!("{}", "-".repeat(86));
    for (i, r) in rows.iter().enumerate() {
        println!(
            "{:>3} | {:<6} | {:<30} | {:<5} | {:<4} | {:<24}",
            i + 1,
            r.un_number.as_deref().unwrap_or("-"),
            truncate(r.substance.as_deref().unwrap_or("-"), 30),
            r.hazard_class.as_deref().unwrap_or("-"),
            r.risk_number.as_deref().unwrap_or("-"),
            truncate(&r.source_file, 24),
        );
    }
    println!("\n{} products", rows.len());
    Ok(())
}

fn print_stats(conn: &rusqlite::Connection) -> Result<()> {
    let stats = db::get_stats(conn)?;
    println!("Products: {}", stats.total);
    if !stats.by_hazard_class.is_empty() {
        println!("By hazard class:");
        for (class, count) in &stats.by_hazard_class {
            println!("  Class {:<5} {:>5}", class, count);
        }
    }
    if !stats.most_recent.is_empty() {
        println!("Most recent:");
        for p in &stats.most_recent {
            println!(
                "  {} (UN {})",
                p.substance.as_deref().unwrap_or("-"),
                p.un_number.as_deref().unwrap_or("-"),
            );
        }
    }
    Ok(())
}

// ── Single-document test mode ──

fn test_extraction(out_dir: &Path, file: &Path) -> Result<()> {
    let text = document::read_document(file)?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let record = parser::process_document(&name, &text, &parser::profile::STANDARD);

    println!("{}", serde_json::to_string_pretty(&record)?);

    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    std::fs::create_dir_all(out_dir)?;
    let out_path = out_dir.join(format!("test_{stem}.json"));
    std::fs::write(&out_path, serde_json::to_string_pretty(&record)?)?;

    let id = record.identification.as_ref();
    println!("\nSubstance:    {}", field(id.and_then(|i| i.substance.as_deref())));
    println!("UN number:    {}", field(id.and_then(|i| i.un_number.as_deref())));
    println!("Hazard class: {}", field(id.and_then(|i| i.hazard_class.as_deref())));
    println!(
        "First aid:    {} fields",
        count_fields(record.first_aid.as_ref().map(|f| {
            [
                &f.inhalation,
                &f.skin_contact,
                &f.eye_contact,
                &f.ingestion,
                &f.symptoms,
                &f.physician_notes,
            ]
            .iter()
            .filter(|v| v.is_some())
            .count()
        }))
    );
    println!("Saved to:     {}", out_path.display());
    Ok(())
}

fn field(value: Option<&str>) -> &str {
    value.unwrap_or("NOT FOUND")
}

fn count_fields(count: Option<usize>) -> usize {
    count.unwrap_or(0)
}

// ── Helpers ──

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
