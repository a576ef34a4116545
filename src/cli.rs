//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// TrendSniper - LLM-powered product & ad analyzer backend
///
/// Scans free-text page content for product and ad mentions using a
/// generative model, and keeps a ranked popularity leaderboard of what it
/// has seen.
///
/// Examples:
///   trendsniper
///   trendsniper --bind 127.0.0.1:8080 --model mistralai/mixtral-8x7b
///   trendsniper --config ./trendsniper.toml --verbose
///   trendsniper --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Address to bind the HTTP server to
    ///
    /// If not specified, uses the config file value (default 0.0.0.0:3000).
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Model identifier to use for analysis
    ///
    /// Any model id your OpenRouter/OpenAI-compatible endpoint accepts.
    #[arg(
        short,
        long,
        default_value = "openrouter/auto",
        env = "TRENDSNIPER_MODEL"
    )]
    pub model: String,

    /// Chat-completions API base URL
    #[arg(
        long,
        default_value = "https://openrouter.ai/api/v1",
        env = "TRENDSNIPER_BASE_URL"
    )]
    pub base_url: String,

    /// Temperature for model responses (0.0 - 1.0)
    ///
    /// Lower values produce more consistent/deterministic output
    #[arg(long, default_value = "0.4")]
    pub temperature: f32,

    /// Model request timeout in seconds
    ///
    /// If not specified, uses the config file value.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .trendsniper.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .trendsniper.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate API base URL format
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("API base URL must start with 'http://' or 'https://'".to_string());
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        // Validate bind address if provided
        if let Some(ref bind) = self.bind {
            if bind.parse::<std::net::SocketAddr>().is_err() {
                return Err(format!("Invalid bind address: {bind}"));
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
