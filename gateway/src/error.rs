// Error handling for the HTTP boundary

use crate::metrics::METRICS;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Ledger or store failure
    #[error(transparent)]
    Ledger(#[from] ledger_core::Error),

    /// Malformed request
    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(
                ledger_core::Error::InvalidRowId(_) | ledger_core::Error::AmountOverflow(_),
            )
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Ledger(ledger_core::Error::StoreUnavailable(msg)) => {
                METRICS.store_errors_total.inc();
                error!("Store error: {}", msg);
            }
            _ if status.is_server_error() => error!("{}", self),
            _ => warn!("Rejected request: {}", self),
        }

        (status, Json(json!({
            "success": false,
            "error": self.to_string(),
        })))
            .into_response()
    }
}
