//! Aggregate facts about one ingestion.
//!
//! A [`Digest`] is what periodic re-analysis compares between snapshots:
//! how many files and lines were retained, which categories they fall in,
//! a handful of repository signals, and a fingerprint of the exact content.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::collections::BTreeMap;

use crate::filter::categorize;
use crate::models::{FileCategory, RetainedFile};

/// Coarse repository traits inferred from retained paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSignals {
    pub has_tests: bool,
    pub has_ci: bool,
    pub has_docs: bool,
    pub has_deployment: bool,
}

impl RepoSignals {
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut signals = RepoSignals::default();
        for path in paths {
            let lower = path.to_lowercase();
            signals.has_tests |= path.contains("test");
            signals.has_ci |= path.contains(".github/workflows");
            signals.has_docs |= lower.contains("readme");
            signals.has_deployment |= path.contains("docker") || path.contains("vercel");
        }
        signals
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub files: usize,
    /// Sum of `\n`-separated line counts across all files.
    pub total_lines: usize,
    pub total_bytes: u64,
    pub categories: BTreeMap<FileCategory, usize>,
    pub signals: RepoSignals,
    /// Hex SHA-256 over the sorted `(path, content)` pairs.
    pub fingerprint: String,
}

impl Digest {
    pub fn from_files(files: &[RetainedFile]) -> Self {
        let mut categories = BTreeMap::new();
        for file in files {
            *categories.entry(categorize(&file.path)).or_insert(0) += 1;
        }

        Self {
            files: files.len(),
            total_lines: files.iter().map(|f| line_count(&f.content)).sum(),
            total_bytes: files.iter().map(|f| f.content.len() as u64).sum(),
            categories,
            signals: RepoSignals::from_paths(files.iter().map(|f| f.path.as_str())),
            fingerprint: fingerprint(files),
        }
    }

    /// Delta from `previous` to `self`.
    pub fn compare(&self, previous: &Digest) -> Comparison {
        Comparison {
            files_delta: self.files as i64 - previous.files as i64,
            lines_delta: self.total_lines as i64 - previous.total_lines as i64,
            bytes_delta: self.total_bytes as i64 - previous.total_bytes as i64,
            changed: self.fingerprint != previous.fingerprint,
        }
    }
}

/// Difference between two digests of the same project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub files_delta: i64,
    pub lines_delta: i64,
    pub bytes_delta: i64,
    /// False when both ingestions retained byte-identical files.
    pub changed: bool,
}

/// Line count as `content.split('\n').count()`: an empty file has one line.
pub fn line_count(content: &str) -> usize {
    content.split('\n').count()
}

fn fingerprint(files: &[RetainedFile]) -> String {
    let mut sorted: Vec<&RetainedFile> = files.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut hasher = Sha256::new();
    for file in sorted {
        hasher.update(file.path.as_bytes());
        hasher.update([0u8]);
        hasher.update(file.content.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}
