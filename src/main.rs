mod extract;
mod report;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::error;

#[derive(Parser)]
#[command(name = "cibil_extract", about = "CIBIL credit report extractor (HTML + PDF)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one report to unified JSON
    Extract {
        /// Input report (.html, .htm or .pdf)
        file: PathBuf,
        /// Output JSON path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract every report in a directory
    Batch {
        /// Directory containing reports
        dir: PathBuf,
        /// Directory for the JSON outputs
        #[arg(short, long, default_value = "extracted")]
        out_dir: PathBuf,
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
        Commands::Extract { file, output } => {
            let report = extract::extract(&file)?;
            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Saved {}", path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
        Commands::Batch { dir, out_dir } => run_batch(&dir, &out_dir),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run_batch(dir: &Path, out_dir: &Path) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e.to_lowercase().as_str(), "pdf" | "html" | "htm"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        println!("No reports found in {}", dir.display());
        return Ok(());
    }

    std::fs::create_dir_all(out_dir)?;
    println!("Extracting {} reports...", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let results: Vec<(PathBuf, Result<(), String>)> = files
        .par_iter()
        .map(|file| {
            let outcome = extract_one(file, out_dir).map_err(|e| e.to_string());
            pb.inc(1);
            (file.clone(), outcome)
        })
        .collect();
    pb.finish_and_clear();

    let mut ok = 0usize;
    let mut errors = 0usize;
    for (file, outcome) in &results {
        match outcome {
            Ok(()) => ok += 1,
            Err(err) => {
                errors += 1;
                error!(file = %file.display(), %err, "extraction failed");
            }
        }
    }
    println!("Done: {} reports ({} ok, {} errors).", results.len(), ok, errors);
    Ok(())
}

fn extract_one(file: &Path, out_dir: &Path) -> anyhow::Result<()> {
    let report = extract::extract(file)?;
    let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("report");
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(out_dir.join(format!("{stem}.json")), json)?;
    Ok(())
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
