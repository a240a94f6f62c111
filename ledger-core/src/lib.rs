//! Geumga Ledger Core
//!
//! Typed sales ledger kept in a spreadsheet-shaped remote store.
//!
//! # Architecture
//!
//! - **Store seam**: [`SheetStore`] exposes the five spreadsheet primitives;
//!   the remote client and [`MemorySheetStore`] both implement it
//! - **Ledger tab**: one sale per row, 13 fixed columns, header in row 1
//! - **Settings tab**: key/value rows, provisioned with defaults on access
//! - **Positional ids**: a [`RowId`] is the row's current position and shifts
//!   when a row above it is deleted
//!
//! # Invariants
//!
//! - Amounts are exact decimals; unparseable cells read as zero
//! - Reads never write, except settings provisioning
//! - The header row is never deleted: row ids start at 2

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod cell;
pub mod config;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod search;
pub mod settings;
pub mod stats;
pub mod store;
pub mod types;

// Re-exports
pub use config::LedgerLayout;
pub use error::{Error, Result};
pub use ledger::{Ledger, LookupFilter};
pub use memory::MemorySheetStore;
pub use search::{SearchPage, SearchQuery};
pub use settings::{SettingUpdate, Settings};
pub use stats::{DateRange, ProductSummary, SalesStats};
pub use store::{CellRange, Row, SheetId, SheetInfo, SheetStore, StructuralRequest, ValueInput};
pub use types::{
    Amounts, CustomerNo, LedgerColumn, LedgerEntry, RowId, TransactionDraft, TransactionRecord,
};
