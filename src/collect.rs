//! Bounded text intake shared by the archive and directory sources.
//!
//! Entries are offered one at a time in source order. Each is checked, in
//! order, against the relevance filter, the per-file size cap, and the total
//! file cap; survivors are read (bounded) and kept only if they look like
//! text. Reaching the file cap stops intake without an error.

use serde::{Deserialize, Serialize};
use std::io;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::filter::RelevanceFilter;
use crate::models::RetainedFile;
use crate::text::decode_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeLimits {
    pub max_file_size: u64,
    pub max_files: usize,
    pub preview_lines: usize,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl IntakeLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_file_size: config.archive.max_file_size,
            max_files: config.archive.max_files,
            preview_lines: config.preview.lines,
        }
    }
}

/// Why entries were left out, for logging and reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    pub ignored: usize,
    pub oversized: usize,
    pub binary: usize,
    pub unreadable: usize,
    /// True when intake stopped at the file cap.
    pub truncated: bool,
}

/// Whether the caller should keep offering entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub struct TextCollector<'a> {
    filter: &'a RelevanceFilter,
    limits: IntakeLimits,
    files: Vec<RetainedFile>,
    skipped: SkipCounts,
}

impl<'a> TextCollector<'a> {
    pub fn new(filter: &'a RelevanceFilter, limits: IntakeLimits) -> Self {
        Self {
            filter,
            limits,
            files: Vec::new(),
            skipped: SkipCounts::default(),
        }
    }

    /// Offers one file entry.
    ///
    /// `read` is only called for entries that pass every check; it receives
    /// the byte budget and should not return more than `budget + 1` bytes.
    pub fn offer<F>(&mut self, path: &str, declared_size: u64, read: F) -> Flow
    where
        F: FnOnce(u64) -> io::Result<Vec<u8>>,
    {
        if !self.filter.is_valuable(path) {
            self.skipped.ignored += 1;
            return Flow::Continue;
        }

        if declared_size > self.limits.max_file_size {
            info!(path, size = declared_size, "skipping large file");
            self.skipped.oversized += 1;
            return Flow::Continue;
        }

        if self.files.len() >= self.limits.max_files {
            warn!(limit = self.limits.max_files, "reached max files limit");
            self.skipped.truncated = true;
            return Flow::Stop;
        }

        let bytes = match read(self.limits.max_file_size) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path, error = %e, "skipping unreadable entry");
                self.skipped.unreadable += 1;
                return Flow::Continue;
            }
        };

        // Declared sizes can lie; the bounded read is authoritative.
        if bytes.len() as u64 > self.limits.max_file_size {
            info!(path, "skipping large file (declared size was smaller)");
            self.skipped.oversized += 1;
            return Flow::Continue;
        }

        match decode_text(&bytes) {
            Some(content) => {
                let size = bytes.len() as u64;
                self.files
                    .push(RetainedFile::new(path, content, size, self.limits.preview_lines));
            }
            None => {
                debug!(path, "skipping binary file");
                self.skipped.binary += 1;
            }
        }
        Flow::Continue
    }

    pub fn finish(self) -> (Vec<RetainedFile>, SkipCounts) {
        (self.files, self.skipped)
    }
}
