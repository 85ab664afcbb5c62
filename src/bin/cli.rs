//! Lottolab CLI - run draw normalization and prediction experiments

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use polars::prelude::{CsvWriter, SerWriter};
use std::path::{Path, PathBuf};

use lottolab::data::{normalize_any, read_table, to_dataframe};
use lottolab::error::validate_window;
use lottolab::experiment::run_experiment;
use lottolab::models::ExperimentResult;
use lottolab::storage::Storage;

#[derive(Parser)]
#[command(name = "lottolab")]
#[command(author, version, about = "Lottery draw experiment CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the three-model experiment on a draws file
    Run {
        /// Path to the draws file (.csv, .xlsx or .xls)
        #[arg(short, long)]
        file: PathBuf,

        /// Lottery type: viking or euro
        #[arg(long, default_value = "viking")]
        lottery: String,

        /// Input schema: raw or prepared
        #[arg(long, default_value = "raw")]
        format: String,

        /// Lag window (echoed into results)
        #[arg(long, default_value = "1")]
        window: String,

        /// Persist snapshots and run history into this directory
        #[arg(long)]
        outputs: Option<PathBuf>,
    },

    /// Normalize a draws file into the canonical schema
    Normalize {
        /// Path to the draws file (.csv, .xlsx or .xls)
        #[arg(short, long)]
        file: PathBuf,

        /// Lottery type: viking or euro
        #[arg(long, default_value = "viking")]
        lottery: String,

        /// Input schema: raw or prepared
        #[arg(long, default_value = "raw")]
        format: String,

        /// Output CSV path
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            lottery,
            format,
            window,
            outputs,
        } => run_command(&file, &lottery, &format, &window, outputs),
        Commands::Normalize {
            file,
            lottery,
            format,
            out,
        } => normalize_command(&file, &lottery, &format, &out),
    }
}

fn run_command(
    file: &Path,
    lottery: &str,
    format: &str,
    window: &str,
    outputs: Option<PathBuf>,
) -> Result<()> {
    let window = validate_window(window)?;

    let df = read_table(file).with_context(|| format!("Failed to load {:?}", file))?;
    let records = normalize_any(&df, lottery, format)?;
    println!(
        "{} {} draws normalized ({} – {})",
        "✓".green(),
        records.len(),
        records.first().map(|r| r.date.to_string()).unwrap_or_default(),
        records.last().map(|r| r.date.to_string()).unwrap_or_default(),
    );

    let results = run_experiment(&records, lottery, window)?;
    print_results(&results);

    if let Some(dir) = outputs {
        let storage = Storage::new(&dir)?;
        storage.save_normalized(&records)?;
        storage.save_results(&results)?;
        storage.append_history(&results, lottery, window)?;
        println!("{} outputs written to {:?}", "✓".green(), dir);
    }

    Ok(())
}

fn normalize_command(file: &Path, lottery: &str, format: &str, out: &Path) -> Result<()> {
    let df = read_table(file).with_context(|| format!("Failed to load {:?}", file))?;
    let records = normalize_any(&df, lottery, format)?;

    let mut canonical = to_dataframe(&records)?;
    let mut output = std::fs::File::create(out)
        .with_context(|| format!("Failed to create {:?}", out))?;
    CsvWriter::new(&mut output)
        .include_header(true)
        .finish(&mut canonical)?;

    println!(
        "{} wrote {} canonical rows to {:?}",
        "✓".green(),
        records.len(),
        out
    );
    Ok(())
}

fn print_results(results: &[ExperimentResult]) {
    println!();
    println!(
        "{}",
        format!(
            "{:<15} {:>9} {:>9} {:>9} {:>9}",
            "Model", "LogLoss", "Brier", "Hit@k", "Hit@10"
        )
        .yellow()
        .bold()
    );

    for r in results {
        println!(
            "{:<15} {:>9.4} {:>9.4} {:>9.4} {:>9.4}",
            r.model.cyan(),
            r.logloss,
            r.brier,
            r.hit_k_main,
            r.hit_10
        );
    }

    if let Some(first) = results.first() {
        println!();
        println!(
            "Train: {} rows ({} – {})   Test: {} rows ({} – {})",
            first.train_rows,
            first.train_date_from,
            first.train_date_to,
            first.test_rows,
            first.test_date_from,
            first.test_date_to
        );
    }
}
