//! Error taxonomy for outbound API calls

/// Failure of a single outbound request to a literature API.
///
/// None of these are retried internally; callers decide whether to abort.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, or truncated body
    #[error("network error: {0}")]
    Transient(String),
    /// Server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Upstream { status: u16, message: String },
    /// Body arrived but could not be interpreted
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Map a reqwest error onto the taxonomy.
    ///
    /// URLs are stripped from the message so API keys never reach logs.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        let is_decode = e.is_decode();
        let message = e.without_url().to_string();
        match status {
            Some(status) => Self::Upstream { status, message },
            None if is_decode => Self::Malformed(message),
            None => Self::Transient(message),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// HTTP status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
