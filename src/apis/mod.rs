pub mod arxiv;
pub mod biorxiv;

use async_trait::async_trait;
use thiserror::Error;

/// Number of results requested from every source.
pub const PAGE_SIZE: u32 = 10;

/// A single search result, uniform across sources.
///
/// `posted` is kept exactly as the source returned it; arXiv and rxivist use
/// different date formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    pub source: String,
    pub posted: String,
    pub title: String,
    pub summary: String,
    pub link: String,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{origin} returned HTTP {status}: {body}")]
    Fetch {
        origin: String,
        status: u16,
        body: String,
    },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

#[async_trait]
pub trait PaperSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the most recent matching papers.
    ///
    /// `date` is accepted so every source shares one signature; neither arXiv
    /// nor rxivist applies it as a filter.
    async fn search(&self, query: &str, date: &str) -> Result<Vec<Paper>, SourceError>;
}

/// Build the shared HTTP client used by every adapter.
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .user_agent(concat!("preprint-digest/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| SourceError::Client(e.to_string()))
}

/// Send a GET request and return the body, failing on anything but 200.
pub(crate) async fn fetch_text(
    source: &str,
    request: reqwest::RequestBuilder,
) -> Result<String, SourceError> {
    let resp = request.send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    check_status(source, status, body)
}

fn check_status(
    source: &str,
    status: reqwest::StatusCode,
    body: String,
) -> Result<String, SourceError> {
    if status != reqwest::StatusCode::OK {
        return Err(SourceError::Fetch {
            origin: source.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
