//! CLI command implementations.
//!
//! Each `run_*` function backs one `intake` subcommand. Results go to stdout
//! (or `--output`); progress and notices go to stderr so the output can be
//! piped.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::config::Config;
use crate::models::{Ingestion, SourceInfo};
use crate::pipeline::{ingest_archive, ingest_directory, ingest_github, resolve_token};
use crate::render::render_context;

/// How an ingestion is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The full ingestion as pretty JSON.
    Json,
    /// The markdown bundle handed to the analysis model.
    Context,
    /// Only the tree summary.
    Tree,
}

pub async fn run_github(
    config: &Config,
    repo_url: &str,
    token: Option<String>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let ingestion = ingest_github(config, repo_url, resolve_token(token)).await?;
    emit(&ingestion, format, output)
}

pub fn run_archive(
    config: &Config,
    path: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read archive: {}", path.display()))?;
    let ingestion = ingest_archive(config, &bytes)?;
    emit(&ingestion, format, output)
}

pub fn run_local(
    config: &Config,
    root: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let ingestion = ingest_directory(config, root)?;
    emit(&ingestion, format, output)
}

/// Prints the valuable subset of `paths`, or of stdin lines when no paths
/// are given, preserving input order.
pub fn run_filter(config: &Config, paths: Vec<String>) -> Result<()> {
    let filter = config.relevance_filter()?;

    let paths = if paths.is_empty() {
        let mut lines = Vec::new();
        for line in std::io::stdin().lock().lines() {
            let line = line.context("Failed to read paths from stdin")?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        lines
    } else {
        paths
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for path in paths.iter().filter(|p| filter.is_valuable(p)) {
        writeln!(out, "{}", path)?;
    }
    Ok(())
}

/// Compares two saved JSON ingestions and prints the digest delta.
pub fn run_compare(previous: &Path, next: &Path) -> Result<()> {
    let prev = read_ingestion(previous)?;
    let next = read_ingestion(next)?;
    let cmp = next.digest.compare(&prev.digest);

    println!("Ingestion Comparison");
    println!("====================");
    println!();
    println!(
        "  Files:    {} -> {} ({})",
        prev.digest.files,
        next.digest.files,
        signed(cmp.files_delta)
    );
    println!(
        "  Lines:    {} -> {} ({})",
        prev.digest.total_lines,
        next.digest.total_lines,
        signed(cmp.lines_delta)
    );
    println!(
        "  Bytes:    {} -> {} ({})",
        prev.digest.total_bytes,
        next.digest.total_bytes,
        signed(cmp.bytes_delta)
    );
    println!(
        "  Content:  {}",
        if cmp.changed { "changed" } else { "unchanged" }
    );
    Ok(())
}

fn read_ingestion(path: &Path) -> Result<Ingestion> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ingestion: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse ingestion JSON: {}", path.display()))
}

fn signed(delta: i64) -> String {
    if delta > 0 {
        format!("+{}", delta)
    } else {
        delta.to_string()
    }
}

/// Writes the ingestion in `format`. An empty ingestion prints a notice to
/// stderr and writes nothing.
fn emit(ingestion: &Ingestion, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    if let SourceInfo::Archive { skipped, .. } | SourceInfo::Directory { skipped, .. } =
        &ingestion.source
    {
        if skipped.truncated {
            eprintln!(
                "Stopped at the file limit after {} files; later entries were not read.",
                ingestion.files.len()
            );
        }
    }

    if ingestion.is_empty() {
        eprintln!("No analyzable files found.");
        return Ok(());
    }

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(ingestion)?,
        OutputFormat::Context => render_context(ingestion),
        OutputFormat::Tree => format!("{}\n", ingestion.tree),
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            eprintln!(
                "Wrote {} files ({} lines) to {}",
                ingestion.digest.files,
                ingestion.digest.total_lines,
                path.display()
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(rendered.as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_deltas() {
        assert_eq!(signed(3), "+3");
        assert_eq!(signed(0), "0");
        assert_eq!(signed(-2), "-2");
    }
}
