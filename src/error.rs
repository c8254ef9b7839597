use thiserror::Error;

/// Fatal errors that stop a digest run before any document is produced
#[derive(Debug, Error)]
pub enum DigestError {
    /// The seed URL is empty or lacks a scheme/host
    #[error("invalid seed URL `{url}`: {reason}")]
    InvalidSeed { url: String, reason: String },

    /// The fetcher could not retrieve the seed page
    #[error("failed to fetch seed page {url}: {source}")]
    SeedFetchFailure {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A sanitization rule failed to compile
    #[error("invalid rule pattern `{pattern}`: {source}")]
    InvalidRule {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A topic include/exclude pattern failed to compile
    #[error("invalid topic filter pattern `{pattern}`: {source}")]
    InvalidTopicPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration is present but unusable
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors reported by a [`Fetcher`](crate::crawlers::crawler::Fetcher)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// No WebDriver session could be established
    #[error("could not connect to a WebDriver server: {0}")]
    Connect(String),

    /// The browser failed to load the page or read its source
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// The fetch did not finish in time
    #[error("timed out after {secs}s fetching {url}")]
    Timeout { url: String, secs: u64 },

    /// The fetcher answered but reported the page as unsuccessful
    #[error("fetch of {url} was unsuccessful: {message}")]
    Unsuccessful { url: String, message: String },
}

/// A candidate page that could not be fetched; recorded and skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFetchFailure {
    pub url: String,
    pub error: FetchError,
}

pub type Result<T, E = DigestError> = std::result::Result<T, E>;
