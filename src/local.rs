//! Local directory source adapter.
//!
//! Walks a directory with `walkdir` and feeds every regular file through the
//! same [`TextCollector`] rules as archive intake. Ignored directories are
//! pruned during the walk. Symlinks are not followed.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::collect::{Flow, IntakeLimits, SkipCounts, TextCollector};
use crate::error::IntakeError;
use crate::filter::RelevanceFilter;
use crate::models::RetainedFile;
use crate::tree;

#[derive(Debug, Clone)]
pub struct DirectoryContents {
    pub files: Vec<RetainedFile>,
    pub tree: String,
    pub skipped: SkipCounts,
}

/// Collects retained text files under `root`, with root-relative `/` paths.
pub fn scan_directory(
    root: &Path,
    limits: &IntakeLimits,
    filter: &RelevanceFilter,
) -> Result<DirectoryContents, IntakeError> {
    if !root.is_dir() {
        return Err(IntakeError::Io(format!(
            "directory does not exist: {}",
            root.display()
        )));
    }

    let mut collector = TextCollector::new(filter, *limits);

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !filter.rejects_directory(&relative_path(root, entry.path()))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = relative_path(root, entry.path());
        let declared_size = entry.metadata().map(|m| m.len()).unwrap_or(0);

        let flow = collector.offer(&rel, declared_size, |budget| {
            let mut buf = Vec::new();
            File::open(entry.path())?
                .take(budget.saturating_add(1))
                .read_to_end(&mut buf)?;
            Ok(buf)
        });
        if flow == Flow::Stop {
            break;
        }
    }

    let (files, skipped) = collector.finish();
    let tree = tree::flat(files.iter().map(|f| f.path.as_str()));

    info!(
        root = %root.display(),
        files = files.len(),
        ignored = skipped.ignored,
        "scanned directory"
    );

    Ok(DirectoryContents {
        files,
        tree,
        skipped,
    })
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}
