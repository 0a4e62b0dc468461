//! Ingestion pipeline orchestration.
//!
//! One entry point per source. Each call owns its working set end to end and
//! shares nothing with concurrent calls. An ingestion that retains zero files
//! is returned normally; use [`Ingestion::is_empty`] to detect it.

use tracing::info;

use crate::archive::parse_archive;
use crate::collect::IntakeLimits;
use crate::config::Config;
use crate::error::IntakeError;
use crate::fetch::fetch_in_batches;
use crate::github::{parse_repo_url, GitHubClient};
use crate::local::scan_directory;
use crate::models::{Ingestion, RetainedFile, SourceInfo, SuppliedFile};
use crate::tree::TreeSummary;

/// Token passed explicitly, else `GITHUB_TOKEN` from the environment.
///
/// [`ingest_github`] never reads the environment itself; callers opt in by
/// resolving the token here first.
pub fn resolve_token(explicit: Option<String>) -> Option<String> {
    explicit
        .filter(|t| !t.trim().is_empty())
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .filter(|t| !t.trim().is_empty())
}

/// Fetches, filters, and reads a GitHub repository's default branch.
///
/// # Workflow
///
/// 1. Parse `owner/repo` from the URL.
/// 2. Resolve the default branch.
/// 3. List the recursive tree and apply the relevance filter.
/// 4. Read retained paths in batches of `github.batch_size`.
/// 5. Summarize retained paths as a nested JSON tree.
///
/// `token` is sent as given; `None` means anonymous requests.
pub async fn ingest_github(
    config: &Config,
    repo_url: &str,
    token: Option<String>,
) -> Result<Ingestion, IntakeError> {
    let coord = parse_repo_url(repo_url)?;
    let filter = config
        .relevance_filter()
        .map_err(|e| IntakeError::Config(e.to_string()))?;
    let client = GitHubClient::new(&config.github, token, config.preview.lines)?;

    info!(repo = %coord, "fetching repository");
    let meta = client.repository(&coord).await?;
    let candidates = client.tree(&coord, &meta.default_branch).await?;
    let paths = filter.select(&candidates);

    info!(
        candidates = candidates.len(),
        valuable = paths.len(),
        batch_size = config.github.batch_size,
        "filtered tree"
    );

    let reader = client.reader(&coord, &meta.default_branch);
    let report = fetch_in_batches(&reader, &paths, config.github.batch_size).await;
    let files = report.into_retained();

    let summary = TreeSummary::from_paths(files.iter().map(|f| f.path.as_str()));
    info!(
        files = files.len(),
        tree_files = summary.file_count(),
        "files ready for analysis"
    );
    let tree = summary.to_json();
    Ok(Ingestion::new(
        SourceInfo::GitHub {
            owner: coord.owner,
            repo: coord.repo,
            default_branch: meta.default_branch,
        },
        files,
        tree,
    ))
}

/// Extracts an in-memory ZIP archive.
pub fn ingest_archive(config: &Config, bytes: &[u8]) -> Result<Ingestion, IntakeError> {
    let filter = config
        .relevance_filter()
        .map_err(|e| IntakeError::Config(e.to_string()))?;
    let contents = parse_archive(bytes, &IntakeLimits::from_config(config), &filter)?;

    Ok(Ingestion::new(
        SourceInfo::Archive {
            entries: contents.entries,
            skipped: contents.skipped,
        },
        contents.files,
        contents.tree,
    ))
}

/// Scans a local directory with the archive intake rules.
pub fn ingest_directory(
    config: &Config,
    root: &std::path::Path,
) -> Result<Ingestion, IntakeError> {
    let filter = config
        .relevance_filter()
        .map_err(|e| IntakeError::Config(e.to_string()))?;
    let contents = scan_directory(root, &IntakeLimits::from_config(config), &filter)?;

    Ok(Ingestion::new(
        SourceInfo::Directory {
            root: root.display().to_string(),
            skipped: contents.skipped,
        },
        contents.files,
        contents.tree,
    ))
}

/// Wraps caller-supplied files as-is: no filtering, supplied order kept,
/// tree is the paths joined with newlines.
pub fn ingest_supplied(config: &Config, files: Vec<SuppliedFile>) -> Ingestion {
    let tree = files
        .iter()
        .map(|f| f.path.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let files = files
        .into_iter()
        .map(|f| {
            let size = f.content.len() as u64;
            RetainedFile::new(f.path, f.content, size, config.preview.lines)
        })
        .collect();

    Ingestion::new(SourceInfo::Supplied, files, tree)
}
