//! Error types for the Sheets adapter

use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter errors
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Credential or token exchange failure
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Error response from the Sheets API
    #[error("Sheets API error {status_code}: {message}")]
    SheetsApi {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Auth(err.to_string())
    }
}

impl From<Error> for ledger_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Config(msg) => ledger_core::Error::Config(msg),
            other => ledger_core::Error::StoreUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_becomes_store_unavailable() {
        let err: ledger_core::Error = Error::SheetsApi {
            status_code: 403,
            message: "The caller does not have permission".to_string(),
        }
        .into();
        match err {
            ledger_core::Error::StoreUnavailable(msg) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("permission"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_config_error_kept() {
        let err: ledger_core::Error = Error::Config("missing sheet id".into()).into();
        assert!(matches!(err, ledger_core::Error::Config(_)));
    }
}
