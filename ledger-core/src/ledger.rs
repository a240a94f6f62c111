//! Ledger access layer
//!
//! Maps the ledger tab of a [`SheetStore`] onto typed transaction records.
//! Every operation issues its remote calls directly and surfaces the first
//! failure; nothing is retried or cached.
//!
//! # Example
//!
//! ```no_run
//! use ledger_core::{Ledger, LedgerLayout, MemorySheetStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> ledger_core::Result<()> {
//!     let ledger = Ledger::new(Arc::new(MemorySheetStore::new()), LedgerLayout::default());
//!     let next = ledger.next_customer_number().await?;
//!     assert_eq!(next.to_string(), "C-1001");
//!     Ok(())
//! }
//! ```

use crate::{
    store::{CellRange, SheetStore, StructuralRequest, ValueInput},
    types::{CustomerNo, LedgerColumn, LedgerEntry, RowId, TransactionRecord, LEDGER_WIDTH},
    Error, LedgerLayout, Result,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Filter used by customer lookups
///
/// An empty field matches everything. The name matches as a case-sensitive
/// substring, the phone as a suffix; both must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupFilter {
    /// Substring of the customer name
    pub name: String,
    /// Suffix of the phone number
    pub phone: String,
}

impl LookupFilter {
    /// Build from name and phone filters
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// Whether a record passes the filter
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        let name_ok = self.name.is_empty() || record.customer_name.contains(&self.name);
        let phone_ok = self.phone.is_empty() || record.phone.ends_with(&self.phone);
        name_ok && phone_ok
    }
}

/// Ledger access over a remote tabular store
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn SheetStore>,
    layout: LedgerLayout,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("store", &self.store.name())
            .field("layout", &self.layout)
            .finish()
    }
}

impl Ledger {
    /// Create a ledger over a store
    pub fn new(store: Arc<dyn SheetStore>, layout: LedgerLayout) -> Self {
        Self { store, layout }
    }

    /// Tab layout in use
    pub fn layout(&self) -> &LedgerLayout {
        &self.layout
    }

    pub(crate) fn store(&self) -> &dyn SheetStore {
        self.store.as_ref()
    }

    /// Store name for logs and health reports
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Titles of every tab in the document; doubles as a connectivity check
    pub async fn tab_titles(&self) -> Result<Vec<String>> {
        let sheets = self.store.sheets().await?;
        Ok(sheets.into_iter().map(|s| s.title).collect())
    }

    fn ledger_range(&self) -> CellRange {
        CellRange::columns(&self.layout.ledger_tab, 0, LEDGER_WIDTH as u32 - 1)
    }

    /// Create the ledger tab and its header row when missing.
    ///
    /// Does nothing when row 1 already holds anything.
    pub async fn ensure_ledger_tab(&self) -> Result<()> {
        let tab = &self.layout.ledger_tab;
        if self.store.find_sheet(tab).await?.is_none() {
            info!("Creating ledger tab {:?}", tab);
            self.store
                .batch_update(vec![StructuralRequest::AddSheet { title: tab.clone() }])
                .await?;
        }

        let mut header = self.ledger_range();
        header.first_row = Some(1);
        header.last_row = Some(1);
        if self.store.read(&header).await?.is_empty() {
            info!("Writing ledger header to {:?}", tab);
            self.store
                .update(&header, vec![LedgerColumn::header_row()], ValueInput::Raw)
                .await?;
        }
        Ok(())
    }

    /// Append one transaction row; the store picks the position
    pub async fn append_transaction(&self, record: &TransactionRecord) -> Result<()> {
        debug!(
            "Appending transaction for {} ({}) via {}",
            record.customer_no,
            record.product_name,
            self.store.name()
        );
        self.store
            .append(
                &self.ledger_range(),
                vec![record.to_row()],
                ValueInput::UserEntered,
            )
            .await
            .map_err(|e| {
                warn!("Append failed: {}", e);
                e
            })
    }

    /// Every data row with its current position, header skipped
    pub async fn list_all_transactions(&self) -> Result<Vec<LedgerEntry>> {
        let rows = self.store.read(&self.ledger_range()).await?;
        let entries: Vec<LedgerEntry> = rows
            .iter()
            .skip(1)
            .enumerate()
            .map(|(index, row)| LedgerEntry {
                row_id: RowId::from_data_index(index),
                record: TransactionRecord::from_row(row),
            })
            .collect();
        debug!("Read {} ledger rows", entries.len());
        Ok(entries)
    }

    /// Rows whose customer name contains `name` and whose phone ends with
    /// `phone`, in store order
    pub async fn lookup_transactions(&self, name: &str, phone: &str) -> Result<Vec<LedgerEntry>> {
        let filter = LookupFilter::new(name, phone);
        let matches: Vec<LedgerEntry> = self
            .list_all_transactions()
            .await?
            .into_iter()
            .filter(|entry| filter.matches(&entry.record))
            .collect();
        debug!("Lookup name={:?} phone={:?}: {} rows", name, phone, matches.len());
        Ok(matches)
    }

    /// Next free customer number, from the customer-number column only.
    ///
    /// Two concurrent callers can receive the same number.
    pub async fn next_customer_number(&self) -> Result<CustomerNo> {
        let column = LedgerColumn::CustomerNo.index() as u32;
        let range = CellRange::columns(&self.layout.ledger_tab, column, column);
        let rows = self.store.read(&range).await?;

        let existing = rows
            .iter()
            .skip(1)
            .filter_map(|row| row.first())
            .filter_map(|cell| CustomerNo::parse(cell));
        let next = CustomerNo::next_after(existing);
        debug!("Next customer number: {}", next);
        Ok(next)
    }

    /// Structurally delete the row at `row_id`.
    ///
    /// Every row below shifts up by one. Existence is not re-checked: a row id
    /// past the end of the data deletes nothing.
    pub async fn delete_transaction(&self, row_id: RowId) -> Result<()> {
        let tab = &self.layout.ledger_tab;
        let sheet = self
            .store
            .find_sheet(tab)
            .await?
            .ok_or_else(|| Error::store(format!("ledger tab {:?} not found", tab)))?;

        info!("Deleting ledger row {} from {:?}", row_id, tab);
        self.store
            .batch_update(vec![StructuralRequest::DeleteRows {
                sheet_id: sheet.sheet_id,
                start_index: row_id.grid_index(),
                end_index: row_id.get(),
            }])
            .await
    }
}
