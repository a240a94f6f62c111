//! Tabular store interface
//!
//! The ledger only needs five primitives from the remote spreadsheet:
//!
//! - document metadata (tab titles and ids)
//! - read a range of cells
//! - append rows after the last non-empty row of a range
//! - overwrite a range in place
//! - batch structural changes (add a tab, delete a row span)
//!
//! Cells travel as display text in both directions. Rows may be shorter than
//! the requested range: trailing empty cells are not returned by the store.

use crate::Result;
use async_trait::async_trait;
use std::fmt;

/// One row of untyped cells
pub type Row = Vec<String>;

/// Numeric id of a tab, distinct from its title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetId(pub i64);

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tab metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    /// Numeric id used by structural requests
    pub sheet_id: SheetId,
    /// Tab title used by cell ranges
    pub title: String,
}

/// Rectangular cell range on one tab
///
/// Columns are 0-based and inclusive. Rows are 1-based and inclusive; an open
/// row bound means "to the end of the data".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    /// Tab title
    pub sheet: String,
    /// First column (0 = A)
    pub first_col: u32,
    /// Last column, inclusive
    pub last_col: u32,
    /// First row (1-based), `None` for row 1
    pub first_row: Option<u32>,
    /// Last row (1-based), `None` for open-ended
    pub last_row: Option<u32>,
}

impl CellRange {
    /// Whole columns, e.g. `Sheet1!A:M`
    pub fn columns(sheet: impl Into<String>, first_col: u32, last_col: u32) -> Self {
        Self {
            sheet: sheet.into(),
            first_col,
            last_col,
            first_row: None,
            last_row: None,
        }
    }

    /// Single cell, e.g. `Settings!B4`
    pub fn cell(sheet: impl Into<String>, col: u32, row: u32) -> Self {
        Self {
            sheet: sheet.into(),
            first_col: col,
            last_col: col,
            first_row: Some(row),
            last_row: Some(row),
        }
    }

    /// Number of columns covered
    pub fn width(&self) -> usize {
        (self.last_col.saturating_sub(self.first_col) + 1) as usize
    }
}

/// Column letters for a 0-based index (0 = A, 26 = AA)
pub fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn quote_sheet(title: &str) -> String {
    if !title.is_empty() && title.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        title.to_string()
    } else {
        format!("'{}'", title.replace('\'', "''"))
    }
}

impl fmt::Display for CellRange {
    /// A1 notation
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sheet = quote_sheet(&self.sheet);
        let first = column_letters(self.first_col);
        let last = column_letters(self.last_col);
        match (self.first_row, self.last_row) {
            (Some(r1), Some(r2)) if r1 == r2 && self.first_col == self.last_col => {
                write!(f, "{}!{}{}", sheet, first, r1)
            }
            (Some(r1), Some(r2)) => write!(f, "{}!{}{}:{}{}", sheet, first, r1, last, r2),
            (Some(r1), None) => write!(f, "{}!{}{}:{}", sheet, first, r1, last),
            (None, Some(r2)) => write!(f, "{}!{}1:{}{}", sheet, first, last, r2),
            (None, None) => write!(f, "{}!{}:{}", sheet, first, last),
        }
    }
}

/// How the store treats written cell text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueInput {
    /// Stored exactly as written; `"012345"` keeps its leading zero
    Raw,
    /// Parsed as if typed by hand, so numbers and dates become typed cells
    #[default]
    UserEntered,
}

impl ValueInput {
    /// Name used by the Sheets API
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInput::Raw => "RAW",
            ValueInput::UserEntered => "USER_ENTERED",
        }
    }
}

/// Structural change applied through a batch update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralRequest {
    /// Create a new empty tab
    AddSheet {
        /// Title of the new tab
        title: String,
    },
    /// Remove a span of rows, shifting the rows below it up
    DeleteRows {
        /// Tab to delete from
        sheet_id: SheetId,
        /// 0-based first row, inclusive
        start_index: u32,
        /// 0-based last row, exclusive
        end_index: u32,
    },
}

/// Remote tabular store
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// All tabs of the document
    async fn sheets(&self) -> Result<Vec<SheetInfo>>;

    /// Read the cells of a range, trailing empty cells trimmed
    async fn read(&self, range: &CellRange) -> Result<Vec<Row>>;

    /// Append rows after the last non-empty row of the range's table
    async fn append(&self, range: &CellRange, rows: Vec<Row>, input: ValueInput) -> Result<()>;

    /// Overwrite cells starting at the range's top-left corner
    async fn update(&self, range: &CellRange, rows: Vec<Row>, input: ValueInput) -> Result<()>;

    /// Apply structural requests in order
    async fn batch_update(&self, requests: Vec<StructuralRequest>) -> Result<()>;

    /// Store name for logs
    fn name(&self) -> &str;

    /// Look up a tab by title
    async fn find_sheet(&self, title: &str) -> Result<Option<SheetInfo>> {
        Ok(self.sheets().await?.into_iter().find(|s| s.title == title))
    }
}
