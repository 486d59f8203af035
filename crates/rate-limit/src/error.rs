//! Error types for rate limiting.

/// Errors that can occur when constructing a rate limiter.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// The configured quota cannot admit any request.
    #[error("Invalid rate limit quota: {0}")]
    InvalidQuota(&'static str),
}
