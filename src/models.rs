//! Core data models used throughout the ingestion pipeline.
//!
//! These types represent the candidates, retained files, and finished
//! ingestions that flow from a source adapter to the analysis collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collect::SkipCounts;
use crate::digest::Digest;

/// Kind of an entry in a source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// A path discovered in a source tree before relevance filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath {
    pub path: String,
    pub kind: EntryKind,
    /// Declared size in bytes (0 for directories).
    pub size: u64,
}

impl CandidatePath {
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            size,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            size: 0,
        }
    }
}

/// A candidate that passed filtering and was read into text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetainedFile {
    pub path: String,
    pub content: String,
    pub size: u64,
    /// First `preview_lines` lines of `content`.
    pub preview: String,
}

impl RetainedFile {
    pub fn new(path: impl Into<String>, content: String, size: u64, preview_lines: usize) -> Self {
        let preview = preview_of(&content, preview_lines);
        Self {
            path: path.into(),
            content,
            size,
            preview,
        }
    }
}

/// First `lines` lines of `content`, joined with `\n`.
pub fn preview_of(content: &str, lines: usize) -> String {
    content.split('\n').take(lines).collect::<Vec<_>>().join("\n")
}

/// A `{path, content}` pair supplied directly by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppliedFile {
    pub path: String,
    pub content: String,
}

/// Coarse classification of a retained file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Documentation,
    Code,
    Config,
    Other,
}

/// Where an ingestion's files came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceInfo {
    #[serde(rename = "github")]
    GitHub {
        owner: String,
        repo: String,
        default_branch: String,
    },
    Archive {
        /// Total entries in the archive, including skipped ones.
        entries: usize,
        #[serde(default)]
        skipped: SkipCounts,
    },
    Directory {
        root: String,
        #[serde(default)]
        skipped: SkipCounts,
    },
    Supplied,
}

/// Result of one ingestion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingestion {
    pub source: SourceInfo,
    pub files: Vec<RetainedFile>,
    /// Textual summary of the retained path hierarchy.
    pub tree: String,
    pub digest: Digest,
    pub ingested_at: DateTime<Utc>,
}

impl Ingestion {
    pub fn new(source: SourceInfo, files: Vec<RetainedFile>, tree: String) -> Self {
        let digest = Digest::from_files(&files);
        Self {
            source,
            files,
            tree,
            digest,
            ingested_at: Utc::now(),
        }
    }

    /// True when no analyzable files were found. Not an error by itself.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
