//! Path relevance filter.
//!
//! Decides whether a repository path is worth sending to the analysis model.
//! The decision is a pure function of the path and the injected
//! [`FilterTables`]; the first matching rule wins:
//!
//! 1. any segment (or run of segments) names an ignored directory → reject
//! 2. the lowercased path ends with an ignored suffix → reject
//! 3. the path matches a configured exclude glob → reject
//! 4. the lowercased path ends with a valuable suffix, or the basename starts
//!    with a conventional extensionless name (`Dockerfile`, `Makefile`) → accept
//! 5. otherwise → reject
//!
//! Both remote and archive sources go through the same filter.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::sync::OnceLock;

use crate::models::{CandidatePath, EntryKind, FileCategory};

/// Build outputs, dependency caches, VCS metadata, and editor/tooling state.
///
/// Entries with a `/` (`public/assets`) match a contiguous run of path
/// segments, so `public/assets/app.css` is rejected. A plain per-segment
/// lookup would never match them and would keep such files; that
/// behavior is intentionally not reproduced.
pub const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    ".next",
    ".git",
    "coverage",
    "__pycache__",
    ".pytest_cache",
    "venv",
    "env",
    ".venv",
    "vendor",
    "target",
    "out",
    ".turbo",
    ".vercel",
    ".cache",
    "public/assets",
    "static/assets",
    "assets/images",
    "images",
    ".angular",
    ".nuxt",
    ".output",
    ".parcel-cache",
    ".vscode",
    ".idea",
];

/// Media, fonts, archives, documents, binaries, lockfiles, bundles, source maps.
#[rustfmt::skip]
pub const IGNORED_SUFFIXES: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".ico", ".webp", ".avif", ".bmp",
    ".mp4", ".mp3", ".wav", ".avi", ".mov", ".flv", ".webm",
    ".woff", ".woff2", ".ttf", ".eot", ".otf",
    ".zip", ".tar", ".gz", ".rar", ".7z", ".bz2", ".xz",
    ".pdf", ".doc", ".docx", ".ppt", ".pptx", ".xls", ".xlsx",
    ".exe", ".dll", ".so", ".dylib", ".bin", ".jar", ".war",
    ".lock", "-lock.json", "-lock.yaml",
    ".min.js", ".min.css", ".bundle.js", ".chunk.js",
    ".map",
];

/// Source, config, markup, and documentation suffixes.
#[rustfmt::skip]
pub const VALUABLE_SUFFIXES: &[&str] = &[
    // JavaScript / TypeScript
    ".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs",
    ".py", ".pyw",
    ".go",
    ".rs",
    ".java", ".kt", ".kts",
    ".rb", ".rake",
    ".php",
    ".c", ".cpp", ".h", ".hpp", ".cc",
    ".cs",
    ".swift",
    ".scala",
    ".ex", ".exs",
    ".dart", ".m", ".mm",
    ".vue", ".svelte",
    // config
    ".json", ".yaml", ".yml", ".toml", ".ini", ".conf", ".xml", ".properties",
    // docs
    ".md", ".txt", ".rst", ".adoc",
    // schemas and queries
    ".sql", ".prisma", ".graphql", ".gql",
    // scripts
    ".sh", ".bash", ".zsh", ".fish", ".ps1",
    ".html", ".htm", ".css", ".scss", ".sass", ".less",
    // dotfiles
    ".gitignore", ".dockerignore", ".editorconfig",
];

/// Extensionless conventional files, matched as a basename prefix
/// so that `Dockerfile.prod` is kept too.
pub const VALUABLE_BASENAMES: &[&str] = &["Dockerfile", "Makefile", "Rakefile", "Procfile"];

/// Immutable rule tables for a [`RelevanceFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTables {
    pub ignored_dirs: Vec<String>,
    pub ignored_suffixes: Vec<String>,
    pub valuable_suffixes: Vec<String>,
    pub valuable_basenames: Vec<String>,
}

impl Default for FilterTables {
    fn default() -> Self {
        let owned =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            ignored_dirs: owned(IGNORED_DIRS),
            ignored_suffixes: owned(IGNORED_SUFFIXES),
            valuable_suffixes: owned(VALUABLE_SUFFIXES),
            valuable_basenames: owned(VALUABLE_BASENAMES),
        }
    }
}

/// Pure keep/drop predicate over repository paths.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    ignored_dirs: Vec<Vec<String>>,
    ignored_suffixes: Vec<String>,
    valuable_suffixes: Vec<String>,
    valuable_basenames: Vec<String>,
    excludes: Option<GlobSet>,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(FilterTables::default())
    }
}

impl RelevanceFilter {
    pub fn new(tables: FilterTables) -> Self {
        let ignored_dirs = tables
            .ignored_dirs
            .iter()
            .map(|dir| {
                dir.split('/')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|segments| !segments.is_empty())
            .collect();
        let lower = |items: Vec<String>| -> Vec<String> {
            items.into_iter().map(|s| s.to_lowercase()).collect()
        };

        Self {
            ignored_dirs,
            ignored_suffixes: lower(tables.ignored_suffixes),
            valuable_suffixes: lower(tables.valuable_suffixes),
            valuable_basenames: tables.valuable_basenames,
            excludes: None,
        }
    }

    /// Like [`RelevanceFilter::new`], with additional exclude globs matched
    /// against the whole relative path.
    pub fn with_excludes(tables: FilterTables, globs: &[String]) -> Result<Self> {
        let mut filter = Self::new(tables);
        if !globs.is_empty() {
            filter.excludes = Some(build_globset(globs)?);
        }
        Ok(filter)
    }

    pub fn is_valuable(&self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");
        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

        if self.has_ignored_dir(&segments) {
            return false;
        }

        let lower = normalized.to_lowercase();
        if self.ignored_suffixes.iter().any(|s| lower.ends_with(s)) {
            return false;
        }

        if let Some(excludes) = &self.excludes {
            if excludes.is_match(&normalized) {
                return false;
            }
        }

        if self.valuable_suffixes.iter().any(|s| lower.ends_with(s)) {
            return true;
        }

        let basename = segments.last().copied().unwrap_or("");
        self.valuable_basenames
            .iter()
            .any(|name| basename.starts_with(name.as_str()))
    }

    /// Keeps valuable file candidates, preserving discovery order.
    pub fn select(&self, candidates: &[CandidatePath]) -> Vec<String> {
        candidates
            .iter()
            .filter(|c| c.kind == EntryKind::File && self.is_valuable(&c.path))
            .map(|c| c.path.clone())
            .collect()
    }

    /// True when nothing below the directory `path` can be valuable.
    pub fn rejects_directory(&self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");
        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        self.has_ignored_dir(&segments)
    }

    fn has_ignored_dir(&self, segments: &[&str]) -> bool {
        self.ignored_dirs.iter().any(|dir| {
            dir.len() <= segments.len()
                && segments
                    .windows(dir.len())
                    .any(|window| window.iter().zip(dir).all(|(a, b)| *a == b.as_str()))
        })
    }
}

fn default_filter() -> &'static RelevanceFilter {
    static FILTER: OnceLock<RelevanceFilter> = OnceLock::new();
    FILTER.get_or_init(RelevanceFilter::default)
}

/// [`RelevanceFilter::is_valuable`] with the built-in tables.
pub fn is_valuable(path: &str) -> bool {
    default_filter().is_valuable(path)
}

/// Classifies a path for digest statistics.
pub fn categorize(path: &str) -> FileCategory {
    let lower = path.to_lowercase();

    if lower.contains("readme") || lower.contains("docs/") || lower.ends_with(".md") {
        return FileCategory::Documentation;
    }
    if lower.contains("config")
        || lower.contains(".json")
        || lower.contains(".yml")
        || lower.contains(".yaml")
    {
        return FileCategory::Config;
    }
    if [".ts", ".js", ".py", ".go", ".rs"]
        .iter()
        .any(|ext| lower.contains(ext))
    {
        return FileCategory::Code;
    }
    FileCategory::Other
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
