//! HTTP fetch primitive shared by all sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::SourceError;

/// Default user agent sent with every request.
const DEFAULT_USER_AGENT: &str = concat!("eventdeck/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body for 2xx responses, a `Status` error otherwise.
    pub fn into_success_body(self) -> Result<String, SourceError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(SourceError::from_status(self.status, &self.body))
        }
    }
}

/// Fetches a URL with a per-request timeout.
///
/// Implementations must report an elapsed timeout as `SourceError::Timeout`
/// and must not retry on their own; fallback is the caller's job.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<HttpResponse, SourceError>;
}

/// Production fetcher backed by `reqwest`.
///
/// `file://` URLs are read from disk, which lets the bundled dataset ship as
/// a plain file next to the binary.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| SourceError::network("<client>", e))?;
        Ok(Self { client })
    }

    async fn fetch_file(url: &reqwest::Url, timeout: Duration) -> Result<HttpResponse, SourceError> {
        let path = url
            .to_file_path()
            .map_err(|_| SourceError::Parse(format!("invalid file URL: {}", url)))?;

        match tokio::time::timeout(timeout, tokio::fs::read_to_string(&path)).await {
            Ok(Ok(body)) => Ok(HttpResponse::ok(body)),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(HttpResponse {
                status: 404,
                body: format!("{} not found", path.display()),
            }),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(SourceError::Timeout {
                url: url.to_string(),
                seconds: timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl HttpFetch for HttpClient {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<HttpResponse, SourceError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| SourceError::Parse(format!("invalid URL {}: {}", url, e)))?;
        if parsed.scheme() == "file" {
            return Self::fetch_file(&parsed, timeout).await;
        }

        debug!(url = url, timeout_secs = timeout.as_secs(), "Fetching");
        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, timeout, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| classify(url, timeout, e))?;

        debug!(url = url, status = status, bytes = body.len(), "Fetched");
        Ok(HttpResponse { status, body })
    }
}

fn classify(url: &str, timeout: Duration, err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout {
            url: url.to_string(),
            seconds: timeout.as_secs(),
        }
    } else {
        SourceError::network(url, err)
    }
}
