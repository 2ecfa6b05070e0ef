use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters) never reach the API
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,
    /// Number of stars offered by the rating widget
    #[serde(default = "default_stars")]
    pub stars: u8,
}

fn default_base_url() -> String {
    DEFAULT_OMDB_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_min_query_length() -> usize {
    3
}

fn default_stars() -> u8 {
    10
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: default_min_query_length(),
            stars: default_stars(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if present, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base_url = self.omdb.base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow::anyhow!("omdb.base_url cannot be empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("omdb.base_url must be an http(s) URL: {}", base_url));
        }
        if self.omdb.timeout_secs == 0 {
            return Err(anyhow::anyhow!("omdb.timeout_secs must be greater than zero"));
        }
        if self.search.min_query_length == 0 {
            return Err(anyhow::anyhow!("search.min_query_length must be at least 1"));
        }
        if self.search.stars == 0 || self.search.stars > 10 {
            return Err(anyhow::anyhow!("search.stars must be between 1 and 10"));
        }
        Ok(())
    }
}
