//! In-process spreadsheet
//!
//! Behaves like the remote store for the five primitives the ledger uses:
//! reads trim trailing empty cells and rows, appends land after the last
//! non-empty row, and row deletions shift everything below up. Writes are
//! counted so callers can assert that an operation performed none.

use crate::store::{
    CellRange, Row, SheetId, SheetInfo, SheetStore, StructuralRequest, ValueInput,
};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct MemorySheet {
    info: SheetInfo,
    rows: Vec<Row>,
}

impl MemorySheet {
    fn set_cell(&mut self, row: usize, col: usize, value: String) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, String::new);
        }
        cells[col] = value;
    }

    fn last_used_row(&self, first_col: usize, last_col: usize) -> Option<usize> {
        self.rows.iter().rposition(|row| {
            row.iter()
                .enumerate()
                .any(|(c, cell)| c >= first_col && c <= last_col && !cell.is_empty())
        })
    }
}

#[derive(Debug, Default)]
struct MemoryDocument {
    sheets: Vec<MemorySheet>,
    next_sheet_id: i64,
}

impl MemoryDocument {
    fn add_sheet(&mut self, title: &str, rows: Vec<Row>) -> Result<SheetId> {
        if self.sheets.iter().any(|s| s.info.title == title) {
            return Err(Error::store(format!(
                "A sheet with the name \"{}\" already exists",
                title
            )));
        }
        let sheet_id = SheetId(self.next_sheet_id);
        self.next_sheet_id += 1;
        self.sheets.push(MemorySheet {
            info: SheetInfo {
                sheet_id,
                title: title.to_string(),
            },
            rows,
        });
        Ok(sheet_id)
    }

    fn by_title(&self, title: &str) -> Result<&MemorySheet> {
        self.sheets
            .iter()
            .find(|s| s.info.title == title)
            .ok_or_else(|| Error::store(format!("Unable to parse range: {}", title)))
    }

    fn by_title_mut(&mut self, title: &str) -> Result<&mut MemorySheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.info.title == title)
            .ok_or_else(|| Error::store(format!("Unable to parse range: {}", title)))
    }
}

/// Spreadsheet document held in memory
#[derive(Debug)]
pub struct MemorySheetStore {
    document: RwLock<MemoryDocument>,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl Default for MemorySheetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySheetStore {
    /// Fresh document with a single empty `Sheet1` tab
    pub fn new() -> Self {
        Self::empty().with_sheet(crate::config::DEFAULT_LEDGER_TAB, Vec::new())
    }

    /// Document without any tab
    pub fn empty() -> Self {
        Self {
            document: RwLock::new(MemoryDocument::default()),
            writes: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Add a tab with initial rows (replacing an existing tab of that title)
    pub fn with_sheet(mut self, title: &str, rows: Vec<Row>) -> Self {
        let document = self.document.get_mut();
        document.sheets.retain(|s| s.info.title != title);
        // Title is unique after the retain above.
        let _ = document.add_sheet(title, rows);
        self
    }

    /// Number of successful write calls (append, update, batch update)
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail as if the remote service were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of a tab's rows, untrimmed
    pub async fn rows(&self, title: &str) -> Option<Vec<Row>> {
        let document = self.document.read().await;
        document.by_title(title).ok().map(|s| s.rows.clone())
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            warn!("memory store: simulated outage");
            return Err(Error::store("service unavailable (simulated)"));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn sheets(&self) -> Result<Vec<SheetInfo>> {
        self.check_available()?;
        let document = self.document.read().await;
        Ok(document.sheets.iter().map(|s| s.info.clone()).collect())
    }

    async fn read(&self, range: &CellRange) -> Result<Vec<Row>> {
        self.check_available()?;
        let document = self.document.read().await;
        let sheet = document.by_title(&range.sheet)?;

        let first_row = range.first_row.unwrap_or(1).max(1) as usize - 1;
        let last_row = range
            .last_row
            .map(|r| r as usize)
            .unwrap_or(sheet.rows.len())
            .min(sheet.rows.len());
        let first_col = range.first_col as usize;
        let last_col = range.last_col as usize;

        let mut values: Vec<Row> = sheet
            .rows
            .get(first_row..last_row.max(first_row))
            .unwrap_or_default()
            .iter()
            .map(|row| {
                let mut cells: Row = row
                    .iter()
                    .skip(first_col)
                    .take(last_col + 1 - first_col)
                    .cloned()
                    .collect();
                while cells.last().is_some_and(String::is_empty) {
                    cells.pop();
                }
                cells
            })
            .collect();
        while values.last().is_some_and(Vec::is_empty) {
            values.pop();
        }

        debug!("memory store: read {} -> {} rows", range, values.len());
        Ok(values)
    }

    async fn append(&self, range: &CellRange, rows: Vec<Row>, _input: ValueInput) -> Result<()> {
        self.check_available()?;
        let mut document = self.document.write().await;
        let sheet = document.by_title_mut(&range.sheet)?;

        let first_col = range.first_col as usize;
        let start = sheet
            .last_used_row(first_col, range.last_col as usize)
            .map_or(0, |r| r + 1);
        let count = rows.len();
        for (offset, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                sheet.set_cell(start + offset, first_col + c, value);
            }
            if sheet.rows.len() <= start + offset {
                sheet.rows.resize_with(start + offset + 1, Vec::new);
            }
        }

        self.record_write();
        debug!("memory store: appended {} rows to {} at row {}", count, range, start + 1);
        Ok(())
    }

    async fn update(&self, range: &CellRange, rows: Vec<Row>, _input: ValueInput) -> Result<()> {
        self.check_available()?;
        let mut document = self.document.write().await;
        let sheet = document.by_title_mut(&range.sheet)?;

        let first_row = range.first_row.unwrap_or(1).max(1) as usize - 1;
        let first_col = range.first_col as usize;
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                sheet.set_cell(first_row + r, first_col + c, value);
            }
        }

        self.record_write();
        debug!("memory store: updated {}", range);
        Ok(())
    }

    async fn batch_update(&self, requests: Vec<StructuralRequest>) -> Result<()> {
        self.check_available()?;
        let mut document = self.document.write().await;

        // All-or-nothing, like the remote batch endpoint.
        let mut added: Vec<&str> = Vec::new();
        for request in &requests {
            match request {
                StructuralRequest::AddSheet { title } => {
                    if added.contains(&title.as_str())
                        || document.sheets.iter().any(|s| &s.info.title == title)
                    {
                        return Err(Error::store(format!(
                            "A sheet with the name \"{}\" already exists",
                            title
                        )));
                    }
                    added.push(title);
                }
                StructuralRequest::DeleteRows {
                    sheet_id,
                    start_index,
                    end_index,
                } => {
                    if !document.sheets.iter().any(|s| s.info.sheet_id == *sheet_id) {
                        return Err(Error::store(format!("No grid with id: {}", sheet_id)));
                    }
                    if start_index >= end_index {
                        return Err(Error::store("Invalid dimension range"));
                    }
                }
            }
        }

        for request in requests {
            match request {
                StructuralRequest::AddSheet { title } => {
                    document.add_sheet(&title, Vec::new())?;
                }
                StructuralRequest::DeleteRows {
                    sheet_id,
                    start_index,
                    end_index,
                } => {
                    if let Some(sheet) = document.sheets.iter_mut().find(|s| s.info.sheet_id == sheet_id) {
                        let len = sheet.rows.len();
                        let start = (start_index as usize).min(len);
                        let end = (end_index as usize).min(len);
                        sheet.rows.drain(start..end);
                    }
                }
            }
        }

        self.record_write();
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fresh_document_has_sheet1() {
        let store = MemorySheetStore::new();
        let sheets = store.sheets().await.unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].title, "Sheet1");
        assert_eq!(sheets[0].sheet_id, SheetId(0));
    }

    #[tokio::test]
    async fn test_read_trims_and_slices() {
        let store = MemorySheetStore::empty().with_sheet(
            "T",
            vec![row(&["a", "b", "", ""]), row(&["c", "d", "e"]), row(&[]), row(&["", ""])],
        );
        let all = store.read(&CellRange::columns("T", 0, 3)).await.unwrap();
        assert_eq!(all, vec![row(&["a", "b"]), row(&["c", "d", "e"])]);

        let column = store.read(&CellRange::columns("T", 1, 1)).await.unwrap();
        assert_eq!(column, vec![row(&["b"]), row(&["d"])]);

        let cell = store.read(&CellRange::cell("T", 2, 2)).await.unwrap();
        assert_eq!(cell, vec![row(&["e"])]);
    }

    #[tokio::test]
    async fn test_append_after_last_used_row() {
        let store = MemorySheetStore::empty().with_sheet("T", vec![row(&["h"]), row(&["x"]), row(&[])]);
        store
            .append(
                &CellRange::columns("T", 0, 1),
                vec![row(&["k", "v"]), row(&["k2", "v2"])],
                ValueInput::Raw,
            )
            .await
            .unwrap();
        let rows = store.read(&CellRange::columns("T", 0, 1)).await.unwrap();
        assert_eq!(rows, vec![row(&["h"]), row(&["x"]), row(&["k", "v"]), row(&["k2", "v2"])]);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_update_cell_in_place() {
        let store = MemorySheetStore::empty().with_sheet("T", vec![row(&["k", "old"])]);
        store
            .update(&CellRange::cell("T", 1, 1), vec![row(&["new"])], ValueInput::Raw)
            .await
            .unwrap();
        assert_eq!(store.rows("T").await.unwrap(), vec![row(&["k", "new"])]);
    }

    #[tokio::test]
    async fn test_delete_rows_shifts_up() {
        let store = MemorySheetStore::empty()
            .with_sheet("T", vec![row(&["1"]), row(&["2"]), row(&["3"])]);
        store
            .batch_update(vec![StructuralRequest::DeleteRows {
                sheet_id: SheetId(0),
                start_index: 1,
                end_index: 2,
            }])
            .await
            .unwrap();
        assert_eq!(store.rows("T").await.unwrap(), vec![row(&["1"]), row(&["3"])]);
    }

    #[tokio::test]
    async fn test_delete_past_end_is_noop() {
        let store = MemorySheetStore::empty().with_sheet("T", vec![row(&["1"])]);
        store
            .batch_update(vec![StructuralRequest::DeleteRows {
                sheet_id: SheetId(0),
                start_index: 9,
                end_index: 10,
            }])
            .await
            .unwrap();
        assert_eq!(store.rows("T").await.unwrap(), vec![row(&["1"])]);
    }

    #[tokio::test]
    async fn test_add_existing_sheet_fails_atomically() {
        let store = MemorySheetStore::new();
        let result = store
            .batch_update(vec![
                StructuralRequest::AddSheet { title: "New".to_string() },
                StructuralRequest::AddSheet { title: "Sheet1".to_string() },
            ])
            .await;
        assert!(matches!(result, Err(Error::StoreUnavailable(_))));
        assert!(store.find_sheet("New").await.unwrap().is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tab_is_store_error() {
        let store = MemorySheetStore::new();
        let result = store.read(&CellRange::columns("Missing", 0, 1)).await;
        assert!(matches!(result, Err(Error::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_simulated_outage() {
        let store = MemorySheetStore::new();
        store.set_unavailable(true);
        assert!(store.sheets().await.is_err());
        store.set_unavailable(false);
        assert!(store.sheets().await.is_ok());
    }
}
