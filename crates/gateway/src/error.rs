//! Error types for the gateway core.

use backend::BackendError;

/// Authentication and session failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The client id or client secret did not match the roster.
    #[error("Invalid client credentials")]
    InvalidCredentials,

    /// The session token is not known. Either it was never issued, or it was
    /// revoked, or its expired entry has already been evicted.
    #[error("Unknown session token")]
    SessionNotFound,

    /// The session token was valid once but its lifetime has run out.
    #[error("Session has expired, authenticate again")]
    SessionExpired,
}

/// Every way a gateway request can fail.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The caller could not be authenticated.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The client has used up its request quota for the current window.
    #[error("Rate limit exceeded, retry later")]
    RateLimitExceeded,

    /// The requested tool does not exist.
    #[error("Unknown tool '{0}'")]
    UnknownTool(String),

    /// The tool arguments did not validate.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The backend call did not finish within the deadline.
    #[error("Backend request timed out")]
    BackendTimeout,

    /// The backend call failed.
    #[error(transparent)]
    Backend(BackendError),

    /// An unexpected internal failure.
    #[error("Internal error")]
    Internal,
}

impl GatewayError {
    /// A stable machine-readable discriminator for response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Auth(AuthError::InvalidCredentials) => "invalid_credentials",
            GatewayError::Auth(AuthError::SessionNotFound) => "session_not_found",
            GatewayError::Auth(AuthError::SessionExpired) => "session_expired",
            GatewayError::RateLimitExceeded => "rate_limit_exceeded",
            GatewayError::UnknownTool(_) => "unknown_tool",
            GatewayError::InvalidArguments(_) => "invalid_arguments",
            GatewayError::BackendTimeout => "backend_timeout",
            GatewayError::Backend(_) => "backend_error",
            GatewayError::Internal => "internal",
        }
    }
}

impl From<BackendError> for GatewayError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Timeout => GatewayError::BackendTimeout,
            other => GatewayError::Backend(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_has_a_stable_kind() {
        let errors = [
            (GatewayError::Auth(AuthError::InvalidCredentials), "invalid_credentials"),
            (GatewayError::Auth(AuthError::SessionNotFound), "session_not_found"),
            (GatewayError::Auth(AuthError::SessionExpired), "session_expired"),
            (GatewayError::RateLimitExceeded, "rate_limit_exceeded"),
            (GatewayError::UnknownTool("drop_table".to_string()), "unknown_tool"),
            (GatewayError::InvalidArguments("sql".to_string()), "invalid_arguments"),
            (GatewayError::BackendTimeout, "backend_timeout"),
            (
                GatewayError::Backend(BackendError::Transport("reset".to_string())),
                "backend_error",
            ),
            (GatewayError::Internal, "internal"),
        ];

        for (error, kind) in errors {
            assert_eq!(kind, error.kind());
        }
    }

    #[test]
    fn backend_timeouts_get_their_own_kind() {
        assert_eq!("backend_timeout", GatewayError::from(BackendError::Timeout).kind());
    }
}
