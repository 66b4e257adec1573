//! Retry policy for repository downloads.
//!
//! Mirrors answer transient failures with 5xx codes or dropped connections,
//! both of which are worth another attempt. A 4xx answer means the file is not
//! there (or not for us) and retrying only delays the inevitable.

use reqwest::StatusCode;

/// Maximum number of attempts for a single request.
pub const MAX_RETRIES: usize = 3;

/// Delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Failures that will not go away by asking again.
#[derive(Debug)]
pub enum NonRetryableError {
    /// HTTP 404: the repository or artifact does not exist at this URL
    NotFound(String),
    /// HTTP 401
    AuthenticationFailed(String),
    /// HTTP 403
    Forbidden(String),
    /// HTTP 429: the mirror is throttling us
    RateLimited(String),
    /// Any other 4xx answer
    ClientError(String),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::NotFound(url) => write!(f, "Not found: {}", url),
            NonRetryableError::AuthenticationFailed(url) => {
                write!(f, "Authentication required: {}", url)
            }
            NonRetryableError::Forbidden(url) => write!(f, "Access forbidden: {}", url),
            NonRetryableError::RateLimited(url) => {
                write!(f, "Too many requests, try again later: {}", url)
            }
            NonRetryableError::ClientError(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Classifies an error as retryable or non-retryable.
/// Returns Ok(()) if the request may be retried.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    let url = error
        .url()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "<unknown url>".to_string());

    match error.status() {
        Some(StatusCode::NOT_FOUND) => Err(NonRetryableError::NotFound(url)),
        Some(StatusCode::UNAUTHORIZED) => Err(NonRetryableError::AuthenticationFailed(url)),
        Some(StatusCode::FORBIDDEN) => Err(NonRetryableError::Forbidden(url)),
        Some(StatusCode::TOO_MANY_REQUESTS) => Err(NonRetryableError::RateLimited(url)),
        Some(s) if s.is_client_error() => Err(NonRetryableError::ClientError(format!(
            "HTTP {} for {}",
            s.as_u16(),
            url
        ))),
        // 5xx, timeouts, connection resets
        _ => Ok(()),
    }
}

/// Maps an error from `error_for_status()` to either the original (retryable)
/// error or a [`NonRetryableError`].
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}
