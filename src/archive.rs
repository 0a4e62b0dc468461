//! ZIP archive source adapter.
//!
//! The whole archive is held in memory. Entries are visited in archive order
//! through a [`TextCollector`], so the relevance filter, the per-file size
//! cap, the total file cap, and the text heuristic all apply. The tree
//! summary is the retained paths sorted and joined with newlines.

use std::io::{Cursor, Read};
use tracing::info;

use crate::collect::{Flow, IntakeLimits, SkipCounts, TextCollector};
use crate::error::IntakeError;
use crate::filter::RelevanceFilter;
use crate::models::RetainedFile;
use crate::tree;

#[derive(Debug, Clone)]
pub struct ArchiveContents {
    pub files: Vec<RetainedFile>,
    pub tree: String,
    /// Entries in the archive, directories included.
    pub entries: usize,
    pub skipped: SkipCounts,
}

/// Extracts retained text files from an in-memory ZIP archive.
///
/// Only a buffer that cannot be opened as a ZIP is an error; individual
/// entries that are corrupt, oversized, binary, or filtered out are skipped.
pub fn parse_archive(
    bytes: &[u8],
    limits: &IntakeLimits,
    filter: &RelevanceFilter,
) -> Result<ArchiveContents, IntakeError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IntakeError::Archive(e.to_string()))?;
    let entries = archive.len();

    let mut collector = TextCollector::new(filter, *limits);

    for i in 0..entries {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                info!(index = i, error = %e, "skipping unreadable archive entry");
                continue;
            }
        };

        if entry.is_dir() {
            continue;
        }
        // Reject absolute paths and `..` traversal.
        if entry.enclosed_name().is_none() {
            info!(name = entry.name(), "skipping entry with unsafe path");
            continue;
        }

        let path = entry.name().replace('\\', "/");
        let declared_size = entry.size();

        let flow = collector.offer(&path, declared_size, |budget| {
            let mut buf = Vec::new();
            (&mut entry).take(budget.saturating_add(1)).read_to_end(&mut buf)?;
            Ok(buf)
        });
        if flow == Flow::Stop {
            break;
        }
    }

    let (files, skipped) = collector.finish();
    let tree = tree::flat(files.iter().map(|f| f.path.as_str()));

    info!(
        files = files.len(),
        entries,
        ignored = skipped.ignored,
        oversized = skipped.oversized,
        binary = skipped.binary,
        "parsed archive"
    );

    Ok(ArchiveContents {
        files,
        tree,
        entries,
        skipped,
    })
}
