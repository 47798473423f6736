//! Configuration resolution.
//!
//! Priority per setting: command line, then environment (both handled
//! by clap), then the TOML config file, then compiled defaults.
//! Provider API keys come from the environment or the file; an empty
//! value counts as absent and leaves the feature in demo mode.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::providers::fallback::FallbackOverrides;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4117;
pub const DEFAULT_FREE_TIER_LIMIT: u32 = 5;

/// Command-line arguments for aihub
#[derive(Parser, Debug, Default)]
#[command(name = "aihub")]
#[command(about = "AI feature gateway with realtime usage analytics")]
#[command(version)]
pub struct Args {
    /// Host address to bind
    #[arg(long, env = "AIHUB_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "AIHUB_PORT")]
    pub port: Option<u16>,

    /// SQLite database path
    #[arg(long, env = "AIHUB_DATABASE")]
    pub database: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "AIHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable usage-limit enforcement and subscription checks
    #[arg(long, env = "AIHUB_BYPASS_LIMITS")]
    pub bypass_limits: bool,

    /// Free-tier request ceiling
    #[arg(long, env = "AIHUB_FREE_TIER_LIMIT")]
    pub free_tier_limit: Option<u32>,
}

/// On-disk configuration file shape. Every field is optional; the
/// `[fallbacks]` table overrides the stock fallback artifacts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
    pub huggingface_api_key: Option<String>,
    pub assemblyai_api_key: Option<String>,
    pub bypass_limits: Option<bool>,
    pub free_tier_limit: Option<u32>,
    #[serde(default)]
    pub fallbacks: FallbackOverrides,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    pub huggingface_api_key: Option<String>,
    pub assemblyai_api_key: Option<String>,
    pub bypass_limits: bool,
    pub free_tier_limit: u32,
    pub fallbacks: FallbackOverrides,
}

impl Config {
    /// Merge arguments, environment, config file, and defaults.
    pub fn resolve(args: Args) -> Result<Self> {
        let file = load_config_file(args.config.as_deref())?;

        let huggingface_api_key =
            env_key("HUGGINGFACE_API_KEY").or_else(|| non_empty(file.huggingface_api_key.clone()));
        let assemblyai_api_key =
            env_key("ASSEMBLYAI_API_KEY").or_else(|| non_empty(file.assemblyai_api_key.clone()));

        Ok(Config {
            host: args
                .host
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            database: args
                .database
                .or(file.database)
                .unwrap_or_else(default_database_path),
            huggingface_api_key,
            assemblyai_api_key,
            bypass_limits: args.bypass_limits || file.bypass_limits.unwrap_or(false),
            free_tier_limit: args
                .free_tier_limit
                .or(file.free_tier_limit)
                .unwrap_or(DEFAULT_FREE_TIER_LIMIT),
            fallbacks: file.fallbacks,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn load_config_file(explicit: Option<&Path>) -> Result<ConfigFile> {
    let path = match explicit {
        // An explicitly named file must exist.
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(ConfigFile::default()),
        },
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("aihub").join("config.toml"))
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("aihub").join("aihub.db"))
        .unwrap_or_else(|| PathBuf::from("aihub.db"))
}

fn env_key(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
