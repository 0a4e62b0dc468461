//! TOML configuration.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) yields the stock ingestion limits.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::filter::{FilterTables, RelevanceFilter};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GitHubConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Number of content reads issued concurrently per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_batch_size() -> usize {
    100
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("repo-intake/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Limits shared by the archive and local-directory sources.
#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
        }
    }
}

fn default_max_file_size() -> u64 {
    1024 * 1024
}
fn default_max_files() -> usize {
    1000
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FilterConfig {
    /// Directory names rejected in addition to the built-in table.
    #[serde(default)]
    pub extra_ignored_dirs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_lines")]
    pub lines: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            lines: default_preview_lines(),
        }
    }
}

fn default_preview_lines() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Use the server's `GITHUB_TOKEN` when a request carries no token.
    /// Off by default: any browser origin can reach the server.
    #[serde(default)]
    pub use_env_token: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            use_env_token: false,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Config {
    /// Builds the relevance filter described by the `[filter]` section.
    pub fn relevance_filter(&self) -> Result<RelevanceFilter> {
        let mut tables = FilterTables::default();
        tables
            .ignored_dirs
            .extend(self.filter.extra_ignored_dirs.iter().cloned());
        RelevanceFilter::with_excludes(tables, &self.filter.exclude_globs)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.github.batch_size == 0 {
        anyhow::bail!("github.batch_size must be > 0");
    }
    if config.github.timeout_secs == 0 {
        anyhow::bail!("github.timeout_secs must be > 0");
    }
    if config.archive.max_file_size == 0 {
        anyhow::bail!("archive.max_file_size must be > 0");
    }
    if config.archive.max_files == 0 {
        anyhow::bail!("archive.max_files must be > 0");
    }
    if config.preview.lines == 0 {
        anyhow::bail!("preview.lines must be > 0");
    }

    // Surface bad globs at load time rather than on first ingestion.
    config
        .relevance_filter()
        .with_context(|| "Invalid filter.exclude_globs")?;

    Ok(config)
}
