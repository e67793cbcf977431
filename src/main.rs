mod consolidate;
mod input;
mod model;
mod pipeline;
mod sink;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};

use model::Catalog;
use pipeline::normalize::Normalizer;
use pipeline::taxonomy::Taxonomy;
use pipeline::DocumentOutcome;

#[derive(Parser)]
#[command(name = "aiverse_pipeline", about = "Catalog pipeline for scraped AI tool listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract from all input documents, consolidate, write the catalog
    Run {
        /// Directory of scraped blobs (.json / .md / .txt)
        #[arg(short, long)]
        input: PathBuf,
        /// Output catalog path
        #[arg(short, long, default_value = "data/catalog.json")]
        output: String,
        /// Target catalog size (a ceiling, not a guarantee)
        #[arg(short = 'n', long, default_value_t = 1000)]
        target_size: usize,
        /// Push the finished catalog to the sink afterwards
        #[arg(long)]
        push: bool,
        /// Rows per bulk-upsert call
        #[arg(long, default_value_t = sink::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Decode + extract + normalize only; show per-source counts
    Extract {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Push an existing catalog to the sink
    Push {
        #[arg(short, long)]
        catalog: String,
        #[arg(long, default_value_t = sink::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Catalog overview: categories, featured count, score spread
    Stats {
        #[arg(short, long)]
        catalog: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            target_size,
            push,
            batch_size,
        } => {
            let documents = input::load_documents(&input)?;
            println!("Processing {} documents...", documents.len());

            let normalizer = Normalizer::new(Taxonomy::default_catalog());
            let outcomes = process_documents(&documents, &normalizer);
            print_outcomes(&outcomes);

            let entries: Vec<_> = outcomes.into_iter().flat_map(|o| o.entries).collect();
            let final_entries = consolidate::consolidate(entries, target_size)?;
            println!("Consolidated catalog: {} entries", final_entries.len());

            let catalog = Catalog::new(final_entries);
            catalog.save(&output)?;
            println!("Catalog written to {}", output);

            if push {
                let client = sink::SinkClient::from_env()?;
                let report = client.push(&catalog.tools, batch_size).await?;
                report.print();
            }
            Ok(())
        }
        Commands::Extract { input } => {
            let documents = input::load_documents(&input)?;
            let normalizer = Normalizer::new(Taxonomy::default_catalog());
            let outcomes = process_documents(&documents, &normalizer);
            print_outcomes(&outcomes);
            Ok(())
        }
        Commands::Push {
            catalog,
            batch_size,
        } => {
            let catalog = Catalog::load(&catalog)?;
            if catalog.tools.is_empty() {
                println!("Catalog is empty, nothing to push.");
                return Ok(());
            }
            let client = sink::SinkClient::from_env()?;
            let report = client.push(&catalog.tools, batch_size).await?;
            report.print();
            Ok(())
        }
        Commands::Stats { catalog } => {
            let catalog = Catalog::load(&catalog)?;
            print_stats(&catalog);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Fan documents out over the thread pool in chunks, each one running the
/// full decode → extract → normalize pipeline independently.
fn process_documents(
    documents: &[model::RawDocument],
    normalizer: &Normalizer,
) -> Vec<DocumentOutcome> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut outcomes = Vec::with_capacity(documents.len());
    for chunk in documents.chunks(64) {
        let results: Vec<DocumentOutcome> = chunk
            .par_iter()
            .map(|doc| pipeline::process_document(doc, normalizer))
            .collect();
        outcomes.extend(results);
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    outcomes
}

fn print_outcomes(outcomes: &[DocumentOutcome]) {
    println!(
        "{:>3} | {:<28} | {:<17} | {:>10} | {:>6} | {:>8}",
        "#", "Source", "Decode", "Candidates", "Kept", "Rejected"
    );
    println!("{}", "-".repeat(88));

    let mut kept = 0usize;
    let mut rejected = 0usize;
    for (i, o) in outcomes.iter().enumerate() {
        kept += o.entries.len();
        rejected += o.rejected;
        println!(
            "{:>3} | {:<28} | {:<17} | {:>10} | {:>6} | {:>8}",
            i + 1,
            truncate(&o.source, 28),
            o.strategy.label(),
            o.candidates,
            o.entries.len(),
            o.rejected
        );
    }

    println!(
        "\n{} documents | {} entries kept | {} candidates rejected",
        outcomes.len(),
        kept,
        rejected
    );
}

fn print_stats(catalog: &Catalog) {
    let tools = &catalog.tools;
    println!("Total:      {}", catalog.metadata.total_tools);
    println!("Generated:  {}", catalog.metadata.generated_at);
    println!("Sources:    {}", catalog.metadata.sources.len());
    println!("Featured:   {}", tools.iter().filter(|t| t.featured).count());

    if !tools.is_empty() {
        let avg: f64 = tools.iter().map(|t| t.popularity_score).sum::<f64>() / tools.len() as f64;
        println!("Avg score:  {:.2}", avg);
    }

    // Category distribution, biggest first
    let mut counts: Vec<(&str, usize)> = catalog
        .metadata
        .categories
        .iter()
        .map(|c| {
            (
                c.as_str(),
                tools.iter().filter(|t| &t.category == c).count(),
            )
        })
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    println!("\n--- Categories ---");
    for (category, count) in counts {
        println!("{:<24} {:>5}", category, count);
    }

    println!("\n--- Top tools ---");
    for tool in tools.iter().take(10) {
        println!(
            "{:>3}. {:<24} {:<20} {:.2}",
            tool.id,
            truncate(&tool.name, 24),
            truncate(&tool.category, 20),
            tool.popularity_score
        );
    }
}

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
