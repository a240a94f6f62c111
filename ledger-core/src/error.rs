//! Error types for the ledger access layer

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Numeric cells that fail to parse and settings keys missing on read are
/// not errors: the first coerce to zero, the second are backfilled.
#[derive(Error, Debug)]
pub enum Error {
    /// Any remote store call failed (network, auth, quota, missing document)
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Row id that cannot address a ledger data row
    #[error("Invalid row id: {0}")]
    InvalidRowId(u32),

    /// Derived amount does not fit in a decimal
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for wrapping a store-side failure
    pub fn store(msg: impl Into<String>) -> Self {
        Error::StoreUnavailable(msg.into())
    }
}
