use std::path::Path;

use anyhow::{bail, Result};
use serde::Deserialize;

/// Public FDC credential with a low hourly quota.
pub const DEMO_API_KEY: &str = "DEMO_KEY";

/// Root configuration structure, deserialized from `.fdc-nutrients/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// FoodData Central connection settings.
    pub api: ApiConfig,
    /// Candidate search behaviour.
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the FDC v1 API, without trailing slash.
    pub base_url: String,
    /// Credential sent as the `api_key` query parameter.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds (1-60).
    pub timeout_secs: u64,
    /// Number of requests in flight at once.
    pub batch_size: usize,
    /// Candidates requested per search (1-200).
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.nal.usda.gov/fdc/v1".to_string(),
            api_key: None,
            timeout_secs: 10,
            batch_size: 8,
            page_size: 50,
        }
    }
}

impl ApiConfig {
    /// The configured credential, falling back to [`DEMO_API_KEY`].
    pub fn api_key(&self) -> &str {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(DEMO_API_KEY)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Score candidates on `brandOwner + description` instead of `description`.
    pub branded: bool,
    /// Ask the search endpoint for branded foods only when in branded mode.
    pub restrict_data_type: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            branded: true,
            restrict_data_type: false,
        }
    }
}

impl Config {
    /// Reject values the FDC API or the batching code cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_secs == 0 || self.api.timeout_secs > 60 {
            bail!(
                "api.timeout_secs must be between 1 and 60 (got {})",
                self.api.timeout_secs
            );
        }
        if self.api.batch_size == 0 {
            bail!("api.batch_size must be at least 1");
        }
        if self.api.page_size == 0 || self.api.page_size > 200 {
            bail!(
                "api.page_size must be between 1 and 200 (got {})",
                self.api.page_size
            );
        }
        if self.api.base_url.trim().is_empty() {
            bail!("api.base_url must not be empty");
        }
        Ok(())
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<work_dir>/.fdc-nutrients/config.toml`
/// 3. `~/.config/fdc-nutrients/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(work_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local_config = work_dir.join(".fdc-nutrients").join("config.toml");
    if local_config.exists() {
        return read_config(&local_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("fdc-nutrients")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
