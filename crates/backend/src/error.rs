//! Error types for backend calls.

/// Errors that can occur while talking to the remote data engine.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The call did not complete within the configured deadline.
    #[error("Backend request timed out")]
    Timeout,

    /// The backend rejected the request or failed server-side.
    #[error("Backend returned HTTP {status}: {message}")]
    Api {
        /// The HTTP status code of the response.
        status: u16,
        /// The error message reported by the backend.
        message: String,
    },

    /// The request never produced a response.
    #[error("Backend transport failure: {0}")]
    Transport(String),

    /// The response did not have the expected shape.
    #[error("Backend returned an unexpected payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return BackendError::Timeout;
        }

        if err.is_decode() {
            return BackendError::Malformed(err.without_url().to_string());
        }

        // Strip the URL so internal endpoints never leak into client-facing
        // error messages.
        BackendError::Transport(err.without_url().to_string())
    }
}
