//! # Geumga Sheets Adapter
//!
//! Google Sheets v4 backend for [`ledger_core::SheetStore`]:
//! - values get / append / update with `USER_ENTERED` input
//! - batch structural updates (add tab, delete rows)
//! - service-account authentication with token caching
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │  ledger_core::Ledger     │
//! └────────────┬─────────────┘
//!              │ SheetStore
//! ┌────────────▼─────────────┐     ┌──────────────────┐
//! │      SheetsClient        │────▶│  Authenticator   │
//! └────────────┬─────────────┘     └────────┬─────────┘
//!              │ HTTPS + bearer             │ JWT bearer grant
//! ┌────────────▼─────────────┐     ┌────────▼─────────┐
//! │  sheets.googleapis.com   │     │ oauth2 token URI │
//! └──────────────────────────┘     └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::{Credentials, ServiceAccountKey};
pub use client::{SheetsClient, SheetsConfig};
pub use error::{Error, Result};

/// Public API root
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
