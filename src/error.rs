// Error handling module
// Defines the client error taxonomy

use thiserror::Error;

/// Errors that can occur while talking to the RODO admin API
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Refresh-specific failure: missing refresh credential or rejected refresh call
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Error status from the RODO API, surfaced by the typed helpers
    #[error("RODO API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Internal error (storage, request construction)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClientError::Auth("no refresh token".to_string());
        assert_eq!(err.to_string(), "Authentication failed: no refresh token");

        let err = ClientError::Api {
            status: 403,
            message: "Forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "RODO API error: 403 - Forbidden");
    }

    #[test]
    fn test_auth_error_message() {
        let err = ClientError::Auth("refresh rejected: 500".to_string());
        assert_eq!(
            err.to_string(),
            "Authentication failed: refresh rejected: 500"
        );
    }

    #[test]
    fn test_internal_error_message() {
        let err = ClientError::Internal(anyhow::anyhow!("Something went wrong"));
        assert_eq!(err.to_string(), "Internal error: Something went wrong");
    }

    #[test]
    fn test_api_error_various_statuses() {
        let err = ClientError::Api {
            status: 404,
            message: "Not found".to_string(),
        };
        assert_eq!(err.to_string(), "RODO API error: 404 - Not found");

        let err = ClientError::Api {
            status: 500,
            message: "Server error".to_string(),
        };
        assert_eq!(err.to_string(), "RODO API error: 500 - Server error");
    }
}
