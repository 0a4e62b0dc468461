//! Errors surfaced by the ingestion pipeline.
//!
//! Only input-level failures appear here: an unparseable repository URL, an
//! archive that cannot be opened, or an upstream API that refuses the
//! repository-level requests. Per-file problems never become an
//! [`IntakeError`]; they are recorded as fetch outcomes or skipped.

/// Ingestion error returned to the caller of a pipeline entry point.
#[derive(Debug)]
pub enum IntakeError {
    /// The URL does not name a `github.com/<owner>/<repo>` repository.
    InvalidRepoUrl(String),
    /// The archive buffer could not be opened as a ZIP file.
    Archive(String),
    /// The source-control API answered a repository-level request with an error status.
    Upstream { status: u16, message: String },
    /// Transport failure talking to the source-control API.
    Http(String),
    /// Local filesystem failure (directory source).
    Io(String),
    /// A response body could not be decoded.
    Decode(String),
    /// The ingestion settings are unusable (e.g. a bad exclude glob).
    Config(String),
}

impl std::fmt::Display for IntakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeError::InvalidRepoUrl(url) => write!(f, "invalid GitHub URL: {}", url),
            IntakeError::Archive(e) => write!(f, "failed to parse ZIP file: {}", e),
            IntakeError::Upstream { status, message } => {
                write!(f, "GitHub API error (HTTP {}): {}", status, message)
            }
            IntakeError::Http(e) => write!(f, "request to GitHub failed: {}", e),
            IntakeError::Io(e) => write!(f, "filesystem error: {}", e),
            IntakeError::Decode(e) => write!(f, "could not decode response: {}", e),
            IntakeError::Config(e) => write!(f, "invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for IntakeError {}

impl From<reqwest::Error> for IntakeError {
    fn from(e: reqwest::Error) -> Self {
        IntakeError::Http(e.to_string())
    }
}

impl From<std::io::Error> for IntakeError {
    fn from(e: std::io::Error) -> Self {
        IntakeError::Io(e.to_string())
    }
}
