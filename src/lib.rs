//! # Repo Intake
//!
//! Turns a software repository into a compact, text-only bundle of the files
//! worth showing to an analysis model.
//!
//! A repository arrives as a GitHub URL, a ZIP archive, a local directory, or
//! a list of caller-supplied files. Every source goes through the same
//! relevance filter, and the survivors are read into text, summarized as a
//! tree, and digested into a few aggregate facts.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌──────────────┐   ┌───────────┐
//! │   Sources    │──▶│  Relevance │──▶│ Batched read │──▶│ Ingestion │
//! │ GitHub / ZIP │   │   filter   │   │  + text test │   │  + digest │
//! │ dir / files  │   └────────────┘   └──────────────┘   └─────┬─────┘
//! └──────────────┘                                             │
//!                         ┌────────────────────────────────────┤
//!                         ▼                                    ▼
//!                   ┌──────────┐                         ┌──────────┐
//!                   │   CLI    │                         │   HTTP   │
//!                   │ (intake) │                         │  server  │
//!                   └──────────┘                         └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! intake github https://github.com/owner/repo --format context
//! intake archive ./project.zip --output bundle.json
//! intake local . --format tree
//! git ls-files | intake filter
//! intake serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`filter`] | Path relevance filter |
//! | [`text`] | Text/binary heuristic |
//! | [`fetch`] | Batched concurrent file reads |
//! | [`github`] | GitHub REST source |
//! | [`archive`] | ZIP archive source |
//! | [`local`] | Local directory source |
//! | [`collect`] | Shared size, count, and text limits |
//! | [`tree`] | Tree summaries |
//! | [`digest`] | Aggregate stats and comparison |
//! | [`render`] | Markdown context bundle |
//! | [`pipeline`] | Ingestion entry points |
//! | [`server`] | Ingestion HTTP server |
//! | [`commands`] | CLI command implementations |

pub mod archive;
pub mod collect;
pub mod commands;
pub mod config;
pub mod digest;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod github;
pub mod local;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod server;
pub mod text;
pub mod tree;
