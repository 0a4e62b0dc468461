//! # Repo Intake CLI (`intake`)
//!
//! Ingests a repository from GitHub, a ZIP archive, or a local directory and
//! writes the retained files as JSON, a markdown context bundle, or a tree.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `intake github <url>` | Ingest a GitHub repository's default branch |
//! | `intake archive <zip>` | Ingest a ZIP archive |
//! | `intake local <dir>` | Ingest a local directory |
//! | `intake filter [PATH...]` | Print the paths the relevance filter keeps |
//! | `intake compare <prev> <next>` | Compare two saved JSON ingestions |
//! | `intake serve` | Start the ingestion HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Markdown bundle for a public repository
//! intake github https://github.com/owner/repo --format context
//!
//! # Save a snapshot, then compare it with a later one
//! intake archive ./v1.zip --output v1.json
//! intake archive ./v2.zip --output v2.json
//! intake compare v1.json v2.json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use repo_intake::commands::{self, OutputFormat};
use repo_intake::config::{self, Config};
use repo_intake::server;

/// Repo Intake CLI: select, read, and bundle the valuable files of a repository.
#[derive(Parser)]
#[command(
    name = "intake",
    about = "Repo Intake: select, read, and bundle the valuable files of a repository",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Every setting has a default, so the flag is optional.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a GitHub repository.
    ///
    /// Resolves the default branch, lists the full tree, filters it, and
    /// reads the retained files in concurrent batches.
    Github {
        /// Repository URL, e.g. `https://github.com/owner/repo`.
        url: String,

        /// API token. Falls back to the `GITHUB_TOKEN` environment variable.
        #[arg(long)]
        token: Option<String>,

        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Ingest a ZIP archive.
    Archive {
        /// Path to the `.zip` file.
        path: PathBuf,

        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Ingest a local directory with the archive limits.
    Local {
        /// Directory to scan.
        path: PathBuf,

        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the valuable subset of the given paths (or of stdin lines).
    Filter {
        paths: Vec<String>,
    },

    /// Compare two ingestions saved with `--format json`.
    Compare {
        previous: PathBuf,
        next: PathBuf,
    },

    /// Start the ingestion HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Github {
            url,
            token,
            format,
            output,
        } => {
            commands::run_github(&cfg, &url, token, format, output.as_deref()).await?;
        }
        Commands::Archive {
            path,
            format,
            output,
        } => {
            commands::run_archive(&cfg, &path, format, output.as_deref())?;
        }
        Commands::Local {
            path,
            format,
            output,
        } => {
            commands::run_local(&cfg, &path, format, output.as_deref())?;
        }
        Commands::Filter { paths } => {
            commands::run_filter(&cfg, paths)?;
        }
        Commands::Compare { previous, next } => {
            commands::run_compare(&previous, &next)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
