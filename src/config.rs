//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::analysis::{ScanIntent, SortMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name used under the platform config directory.
pub const APP_DIR: &str = "veriscan";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the analysis backend
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL of the BaaS project (e.g., https://xyz.supabase.co)
    #[serde(default)]
    pub baas_url: Option<String>,

    /// Public (anon) API key of the BaaS project
    #[serde(default)]
    pub baas_key: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Request timeout in seconds; unset leaves the HTTP client default
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Ordering requested from the price endpoint
    #[serde(default)]
    pub sort: SortMode,

    /// Intent used when none is given on the command line
    #[serde(default)]
    pub default_intent: ScanIntent,

    /// Storage bucket for uploaded scan images
    #[serde(default = "default_image_bucket")]
    pub image_bucket: String,

    /// Number of history entries per page
    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,

    /// Send a single `file` part instead of `front_image`/`back_image`
    #[serde(default)]
    pub legacy_upload: bool,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_image_bucket() -> String {
    "scans".to_string()
}

fn default_history_page_size() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            baas_url: None,
            baas_key: None,
            proxy: None,
            timeout_secs: None,
            format: OutputFormat::Table,
            sort: SortMode::PriceAsc,
            default_intent: ScanIntent::Verify,
            image_bucket: default_image_bucket(),
            history_page_size: default_history_page_size(),
            legacy_upload: false,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(xdg_config) = app_config_dir().map(|d| d.join("config.toml")) {
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("VERISCAN_API_URL") {
            if !url.trim().is_empty() {
                self.api_url = url;
            }
        }

        if let Ok(url) = std::env::var("VERISCAN_BAAS_URL") {
            self.baas_url = Some(url);
        }

        if let Ok(key) = std::env::var("VERISCAN_BAAS_KEY") {
            self.baas_key = Some(key);
        }

        if let Ok(proxy) = std::env::var("VERISCAN_PROXY") {
            self.proxy = Some(proxy);
        }

        self
    }

    /// Returns the BaaS URL and key when both are set.
    pub fn baas_credentials(&self) -> Option<(&str, &str)> {
        match (self.baas_url.as_deref(), self.baas_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some((url, key)),
            _ => None,
        }
    }
}

/// Returns `<config_dir>/veriscan`, if the platform has a config directory.
pub fn app_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}
