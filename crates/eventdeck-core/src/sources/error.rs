use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid payload: {0}")]
    Parse(String),

    #[error("No events found at {0}")]
    Empty(String),

    #[error("All {attempts} proxies failed")]
    ProxiesExhausted { attempts: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl SourceError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        SourceError::Status {
            status,
            body: Self::truncate_body(body),
        }
    }

    pub fn network(url: &str, err: impl std::fmt::Display) -> Self {
        SourceError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
