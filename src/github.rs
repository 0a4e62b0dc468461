//! GitHub source adapter.
//!
//! Talks to the GitHub REST API directly with `reqwest`:
//!
//! | Request | Purpose |
//! |---------|---------|
//! | `GET /repos/{owner}/{repo}` | resolve the default branch |
//! | `GET /repos/{owner}/{repo}/git/trees/{branch}?recursive=1` | list candidates |
//! | `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}` | read one file |
//!
//! File content arrives base64-encoded and is decoded lossily to UTF-8.
//! Repository-level failures are returned as [`IntakeError`]; per-file
//! failures are plain `anyhow` errors that the batched fetcher records and
//! drops.
//!
//! # Authentication
//!
//! An optional token is sent as `Authorization: Bearer <token>`. Without
//! one, GitHub allows 60 requests per hour, which is rarely enough for more
//! than a small repository.

use anyhow::{bail, Context};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::GitHubConfig;
use crate::error::IntakeError;
use crate::fetch::FileReader;
use crate::models::{CandidatePath, RetainedFile};

/// `owner/repo` pair parsed from a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinate {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for RepoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Parses `https://github.com/<owner>/<repo>[...]` or
/// `git@github.com:<owner>/<repo>.git`.
///
/// Anything after the repository segment (`/tree/main`, `?tab=readme`) is
/// ignored and a trailing `.git` is stripped.
pub fn parse_repo_url(url: &str) -> Result<RepoCoordinate, IntakeError> {
    let invalid = || IntakeError::InvalidRepoUrl(url.to_string());

    let rest = url
        .find("github.com/")
        .map(|i| &url[i + "github.com/".len()..])
        .or_else(|| url.find("github.com:").map(|i| &url[i + "github.com:".len()..]))
        .ok_or_else(invalid)?;

    let mut parts = rest.split('/');
    let owner = parts.next().unwrap_or_default();
    let repo = parts
        .next()
        .unwrap_or_default()
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    if owner.is_empty() || repo.is_empty() {
        return Err(invalid());
    }

    Ok(RepoCoordinate {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Repository metadata needed before walking the tree.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoMeta {
    pub default_branch: String,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: Option<u64>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    size: u64,
}

/// HTTP client for one GitHub API endpoint.
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
    preview_lines: usize,
}

impl GitHubClient {
    pub fn new(
        config: &GitHubConfig,
        token: Option<String>,
        preview_lines: usize,
    ) -> Result<Self, IntakeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            preview_lines,
        })
    }

    pub async fn repository(&self, coord: &RepoCoordinate) -> Result<RepoMeta, IntakeError> {
        let url = self.endpoint(&["repos", &coord.owner, &coord.repo])?;
        self.get_json(url).await
    }

    /// Lists every entry of `branch` recursively.
    ///
    /// Blobs become file candidates and trees become directory candidates;
    /// submodule commits and entries without a path are skipped.
    pub async fn tree(
        &self,
        coord: &RepoCoordinate,
        branch: &str,
    ) -> Result<Vec<CandidatePath>, IntakeError> {
        let mut segments = vec!["repos", coord.owner.as_str(), coord.repo.as_str(), "git", "trees"];
        segments.extend(branch.split('/'));
        let mut url = self.endpoint(&segments)?;
        url.query_pairs_mut().append_pair("recursive", "1");

        let response: TreeResponse = self.get_json(url).await?;
        if response.truncated {
            warn!(repo = %coord, "tree listing was truncated by GitHub; some files are missing");
        }

        let candidates = response
            .tree
            .into_iter()
            .filter_map(|entry| {
                let path = entry.path?;
                match entry.kind.as_str() {
                    "blob" => Some(CandidatePath::file(path, entry.size.unwrap_or(0))),
                    "tree" => Some(CandidatePath::directory(path)),
                    _ => None,
                }
            })
            .collect();

        Ok(candidates)
    }

    /// Reads one file. `Ok(None)` when the API returns no inline content.
    pub async fn file(
        &self,
        coord: &RepoCoordinate,
        branch: &str,
        path: &str,
    ) -> anyhow::Result<Option<RetainedFile>> {
        let mut segments = vec!["repos", coord.owner.as_str(), coord.repo.as_str(), "contents"];
        segments.extend(path.split('/'));
        let mut url = self.endpoint(&segments)?;
        url.query_pairs_mut().append_pair("ref", branch);

        let resp = self.request(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            bail!("HTTP {} for {}", status, path);
        }
        let body: ContentResponse = resp
            .json()
            .await
            .with_context(|| format!("unexpected contents response for {}", path))?;

        let Some(encoded) = body.content.filter(|c| !c.is_empty()) else {
            return Ok(None);
        };
        if let Some(encoding) = body.encoding.as_deref() {
            if encoding != "base64" {
                debug!(path, encoding, "skipping non-base64 content");
                return Ok(None);
            }
        }

        let content = decode_base64_content(&encoded)?;
        Ok(Some(RetainedFile::new(
            path,
            content,
            body.size,
            self.preview_lines,
        )))
    }

    /// A [`FileReader`] bound to one repository and branch.
    pub fn reader<'a>(&'a self, coord: &'a RepoCoordinate, branch: &'a str) -> RepoReader<'a> {
        RepoReader {
            client: self,
            coord,
            branch,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, IntakeError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| IntakeError::Http(format!("invalid API base {}: {}", self.api_base, e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| IntakeError::Http(format!("invalid API base {}", self.api_base)))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, IntakeError> {
        let resp = self.request(url).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(upstream_error(status, &body));
        }

        resp.json::<T>()
            .await
            .map_err(|e| IntakeError::Decode(e.to_string()))
    }
}

/// Reads files of one repository branch through a shared [`GitHubClient`].
pub struct RepoReader<'a> {
    client: &'a GitHubClient,
    coord: &'a RepoCoordinate,
    branch: &'a str,
}

#[async_trait]
impl FileReader for RepoReader<'_> {
    async fn read_file(&self, path: &str) -> anyhow::Result<Option<RetainedFile>> {
        self.client.file(self.coord, self.branch, path).await
    }
}

/// Decodes GitHub's line-wrapped base64 into (lossy) UTF-8 text.
pub fn decode_base64_content(encoded: &str) -> anyhow::Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .context("invalid base64 content")?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn upstream_error(status: StatusCode, body: &str) -> IntakeError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(500).collect());

    IntakeError::Upstream {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_https_urls() {
        let coord = parse_repo_url("https://github.com/rust-lang/cargo").unwrap();
        assert_eq!(coord.owner, "rust-lang");
        assert_eq!(coord.repo, "cargo");
        assert_eq!(coord.to_string(), "rust-lang/cargo");
    }

    #[test]
    fn strips_git_suffix_and_trailing_segments() {
        let coord = parse_repo_url("https://github.com/o/r.git").unwrap();
        assert_eq!(coord.repo, "r");
        let coord = parse_repo_url("https://github.com/o/r/tree/main/src").unwrap();
        assert_eq!(coord.repo, "r");
        let coord = parse_repo_url("https://github.com/o/r?tab=readme-ov-file").unwrap();
        assert_eq!(coord.repo, "r");
    }

    #[test]
    fn parses_ssh_remote() {
        let coord = parse_repo_url("git@github.com:octo/hello.git").unwrap();
        assert_eq!(coord.owner, "octo");
        assert_eq!(coord.repo, "hello");
    }

    #[test]
    fn rejects_non_github_urls() {
        assert!(matches!(
            parse_repo_url("https://gitlab.com/o/r"),
            Err(IntakeError::InvalidRepoUrl(_))
        ));
        assert!(parse_repo_url("https://github.com/only-owner").is_err());
        assert!(parse_repo_url("https://github.com/").is_err());
        assert!(parse_repo_url("").is_err());
    }

    #[test]
    fn decodes_wrapped_base64() {
        // "hello\nworld\n" wrapped the way the contents API does
        let decoded = decode_base64_content("aGVsbG8K\nd29ybGQK\n").unwrap();
        assert_eq!(decoded, "hello\nworld\n");
    }

    #[test]
    fn rejects_garbage_base64() {
        assert!(decode_base64_content("!!!not base64!!!").is_err());
    }

    #[test]
    fn upstream_error_prefers_json_message() {
        let err = upstream_error(StatusCode::NOT_FOUND, r#"{"message":"Not Found"}"#);
        match err {
            IntakeError::Upstream { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn endpoint_encodes_segments() {
        let client = GitHubClient::new(&GitHubConfig::default(), None, 200).unwrap();
        let url = client
            .endpoint(&["repos", "o", "r", "contents", "docs", "a b.md"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/o/r/contents/docs/a%20b.md"
        );
    }
}
