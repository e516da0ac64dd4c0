//! `fdc-nutrients` — resolve food names against USDA FoodData Central and
//! tabulate their nutrient densities.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and set up logging.
//! 2. Load config ([`config::load_config`]) and apply CLI overrides.
//! 3. Resolve each food name to an FDC id by fuzzy matching ([`resolver`]).
//! 4. Fetch each record and extract the nutrient row ([`extractor`]).
//! 5. Rescale to a per-kcal basis unless `--raw` ([`normalizer`]).
//! 6. Render the requested report ([`report`]).
//! 7. Exit `0` (every food processed) or `1` (at least one failure).

mod cli;
mod config;
mod error;
mod extractor;
mod fdc;
mod matching;
mod models;
mod normalizer;
mod report;
mod resolver;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use config::{load_config, Config, DEMO_API_KEY};
use fdc::client::FdcClient;
use fdc::FoodDataSource;
use matching::Matcher;
use models::{FoodId, ItemFailure, NutrientTable, Stage};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let work_dir = std::env::current_dir()?;
    let mut config = load_config(&work_dir, cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    config.validate()?;

    let foods = cli.food_names()?;
    if foods.is_empty() {
        eprintln!("No food names given; pass them as arguments or with --input FILE");
        std::process::exit(1);
    }

    if config.api.api_key() == DEMO_API_KEY {
        tracing::warn!("no API key configured, using the rate-limited {}", DEMO_API_KEY);
    }

    let client = FdcClient::new(&config.api, config.search.restrict_data_type)?;
    let matcher = Matcher::new()?;
    let show_progress = !cli.quiet && matches!(cli.report, ReportFormat::Terminal);

    let run = run_pipeline(&client, &matcher, &foods, &config, show_progress).await?;

    let normalized = !cli.raw;
    let table = if normalized {
        normalizer::normalize(run.table)
    } else {
        run.table
    };

    match cli.report {
        ReportFormat::Terminal => {
            let summary = report::terminal::Summary {
                foods: &foods,
                resolved: &run.resolved,
                table: &table,
                failures: &run.failures,
                normalized,
            };
            report::terminal::render(&summary, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            let out = report::JsonReport {
                normalized,
                rows: &table.rows,
                failures: &run.failures,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ReportFormat::Csv => {
            report::csv::render(&table, &mut std::io::stdout().lock())?;
        }
    }

    if !run.failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

/// Outcome of resolving and extracting every requested food.
struct PipelineRun {
    resolved: Vec<(String, FoodId)>,
    table: NutrientTable,
    failures: Vec<ItemFailure>,
}

async fn run_pipeline<S: FoodDataSource>(
    source: &S,
    matcher: &Matcher,
    foods: &[String],
    config: &Config,
    show_progress: bool,
) -> Result<PipelineRun> {
    let batch_size = config.api.batch_size;
    let branded = config.search.branded;

    if show_progress {
        eprintln!(
            "  {} resolving {} foods ({} mode)",
            "→".cyan(),
            foods.len(),
            if branded { "branded" } else { "generic" }
        );
    }
    let pb = progress_bar(foods.len(), show_progress)?;
    let results = resolver::resolve(source, matcher, foods, branded, batch_size, pb.as_ref()).await;
    if let Some(pb) = pb {
        pb.finish_with_message("resolved");
    }

    let mut resolved = Vec::with_capacity(foods.len());
    // food-list position of each resolved entry
    let mut positions = Vec::with_capacity(foods.len());
    let mut failures = Vec::new();
    for (index, (name, result)) in foods.iter().zip(results).enumerate() {
        match result {
            Ok(id) => {
                positions.push(index);
                resolved.push((name.clone(), id));
            }
            Err(e) => {
                tracing::warn!(food = %name, error = %e, "resolution failed");
                failures.push(ItemFailure {
                    index,
                    item: name.clone(),
                    stage: Stage::Resolve,
                    error: e.to_string(),
                });
            }
        }
    }

    let ids: Vec<FoodId> = resolved.iter().map(|(_, id)| *id).collect();

    if show_progress {
        eprintln!("  {} fetching {} records", "→".cyan(), ids.len());
    }
    let pb = progress_bar(ids.len(), show_progress)?;
    let extraction = extractor::extract(source, &ids, batch_size, pb.as_ref()).await;
    if let Some(pb) = pb {
        pb.finish_with_message("fetched");
    }

    failures.extend(extraction.failures.into_iter().map(|mut failure| {
        failure.index = positions[failure.index];
        failure
    }));

    Ok(PipelineRun {
        resolved,
        table: extraction.table,
        failures,
    })
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(key) = &cli.api_key {
        config.api.api_key = Some(key.clone());
    }
    if let Some(batch_size) = cli.batch_size {
        config.api.batch_size = batch_size;
    }
    if let Some(page_size) = cli.page_size {
        config.api.page_size = page_size;
    }
    if cli.generic {
        config.search.branded = false;
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "fdc_nutrients=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn progress_bar(len: usize, enabled: bool) -> Result<Option<ProgressBar>> {
    if !enabled || len == 0 {
        return Ok(None);
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(Some(pb))
}
