//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.trendsniper.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Analysis pipeline settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Tier result caps.
    #[serde(default)]
    pub tiers: TiersConfig,

    /// Leaderboard settings.
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,

    /// License verification settings.
    #[serde(default)]
    pub verify: VerifyConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            verbose: false,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier passed to the chat-completions API.
    #[serde(default = "default_model")]
    pub name: String,

    /// OpenRouter/OpenAI-compatible API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Environment variable the API key is read from at startup.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_model() -> String {
    "openrouter/auto".to_string()
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_temperature() -> f32 {
    0.4
}

fn default_timeout() -> u64 {
    60
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

/// Analysis pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum content length (in characters) accepted for analysis.
    /// Shorter submissions are rejected before any model call.
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_content_length: default_min_content_length(),
        }
    }
}

fn default_min_content_length() -> usize {
    30
}

/// Tier result caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiersConfig {
    /// Maximum items returned to free-tier callers.
    #[serde(default = "default_free_cap")]
    pub free_cap: usize,

    /// Maximum items returned to pro-tier callers.
    #[serde(default = "default_pro_cap")]
    pub pro_cap: usize,

    /// Optional higher bound for pro ad analyses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pro_ad_cap: Option<usize>,
}

impl Default for TiersConfig {
    fn default() -> Self {
        Self {
            free_cap: default_free_cap(),
            pro_cap: default_pro_cap(),
            pro_ad_cap: None,
        }
    }
}

fn default_free_cap() -> usize {
    3
}

fn default_pro_cap() -> usize {
    10
}

/// Leaderboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Entries returned by the leaderboard endpoint.
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            top_limit: default_top_limit(),
        }
    }
}

fn default_top_limit() -> usize {
    10
}

/// License verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Allow-listed license codes.
    #[serde(default = "default_codes")]
    pub codes: Vec<String>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            codes: default_codes(),
        }
    }
}

fn default_codes() -> Vec<String> {
    vec!["PURL2024".to_string()]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but
    /// can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".trendsniper.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Model settings - always override since they have defaults in CLI
        self.model.name = args.model.clone();
        self.model.base_url = args.base_url.clone();
        self.model.temperature = args.temperature;

        // Optional settings - only override if provided
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }

        // Flags always override
        if args.verbose {
            self.server.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
