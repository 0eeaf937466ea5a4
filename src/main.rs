use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use bor_extract::extract::{ExtractorKind, VendorRules};
use bor_extract::pipeline;
use bor_extract::reference::ReferenceTables;

#[derive(Parser)]
#[command(name = "bor_extract", about = "Box-office report extraction pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, aggregate and append a batch of report documents
    Process {
        /// Destination workbook (also holds the reference sheets)
        #[arg(short, long)]
        workbook: PathBuf,
        /// Report documents (extracted text or vendor xlsx)
        #[arg(required = true)]
        documents: Vec<PathBuf>,
    },
    /// Extract one document and print its normalized rows as JSON lines
    Inspect {
        /// Workbook carrying the reference sheets
        #[arg(short, long)]
        workbook: PathBuf,
        document: PathBuf,
    },
    /// Validate the reference sheets and exhibitor routing
    Check {
        #[arg(short, long)]
        workbook: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process { workbook, documents } => {
            println!("Processing {} documents...", documents.len());
            let stats = pipeline::run_batch(&documents, &workbook)?;
            println!(
                "Done: {} processed ({} rows), {} skipped.",
                stats.processed,
                stats.rows,
                stats.skipped()
            );
            if stats.skipped() > 0 {
                println!(
                    "  unreadable: {}, no cinema match: {}, no extractor: {}, empty: {}, failed: {}",
                    stats.unreadable,
                    stats.no_cinema_match,
                    stats.no_extractor,
                    stats.empty_extraction,
                    stats.extractor_failed
                );
            }
            Ok(())
        }
        Commands::Inspect { workbook, document } => {
            let tables = ReferenceTables::load(&workbook)?;
            let rules = VendorRules::default();
            let extracted_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            match pipeline::extract_document(&document, &tables, &rules, &extracted_at) {
                Ok(rows) => {
                    for row in &rows {
                        println!("{}", serde_json::to_string(row)?);
                    }
                    eprintln!("{} rows", rows.len());
                }
                Err(reason) => {
                    eprintln!("skipped ({}): {}", reason.category(), reason);
                }
            }
            Ok(())
        }
        Commands::Check { workbook } => {
            let tables = ReferenceTables::load(&workbook)?;
            println!("Cinemas:  {}", tables.cinema_mapping.len());
            println!("Movies:   {}", tables.movies.len());
            println!("Formats:  {}", tables.formats.len());

            let unrouted: Vec<&str> = tables
                .cinema_mapping
                .iter()
                .filter(|e| ExtractorKind::for_exhibitor(&e.exhibitor).is_none())
                .map(|e| e.exhibitor.as_str())
                .collect();
            if unrouted.is_empty() {
                println!("All exhibitors route to an extractor.");
            } else {
                println!("Exhibitors without an extractor:");
                for name in unrouted {
                    println!("  {}", name);
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}
