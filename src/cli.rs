use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "fdc-nutrients",
    about = "Look up foods in USDA FoodData Central and tabulate per-kcal nutrient densities",
    version
)]
pub struct Cli {
    /// Food names to look up
    pub foods: Vec<String>,

    /// Read additional food names from a file (one per line, `#` starts a comment)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Match against generic food descriptions instead of brand owner + description
    #[arg(long)]
    pub generic: bool,

    /// FoodData Central API key
    #[arg(long, env = "FDC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Config file [default: ./.fdc-nutrients/config.toml, fallback ~/.config/fdc-nutrients/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Keep amounts as reported instead of dividing by energy
    #[arg(long)]
    pub raw: bool,

    /// Number of requests in flight at once
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Candidates requested per search
    #[arg(long, value_name = "N")]
    pub page_size: Option<u32>,

    /// Debug logging and the name → fdcID table
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Csv,
}

impl Cli {
    /// Food names from the positional arguments followed by those in `--input`.
    pub fn food_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .foods
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        if let Some(path) = &self.input {
            names.extend(read_food_list(path)?);
        }

        Ok(names)
    }
}

/// Parse a food list file: blank lines and `#` comments are ignored.
pub fn read_food_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_food_list(&content))
}

fn parse_food_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
