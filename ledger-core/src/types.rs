//! Core types for the sales ledger
//!
//! Money is exact decimal throughout; the store holds display text and every
//! read goes through [`crate::cell`] coercion.

use crate::cell::{parse_customer_number, parse_date, FixedRow};
use crate::store::Row;
use crate::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction type written when the caller gives none, and read back for
/// older rows that predate the column
pub const DEFAULT_TRANSACTION_TYPE: &str = "판매";

/// VAT rate applied at entry time
pub const VAT_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Number of ledger columns (A-M)
pub const LEDGER_WIDTH: usize = 13;

/// Ledger columns in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerColumn {
    /// A
    SaleDate = 0,
    /// B
    CustomerName,
    /// C
    CustomerNo,
    /// D
    Phone,
    /// E
    Address,
    /// F
    ProductName,
    /// G
    UnitPrice,
    /// H
    Quantity,
    /// I
    SupplyAmount,
    /// J
    Vat,
    /// K
    TotalAmount,
    /// L
    Remarks,
    /// M
    TransactionType,
}

impl LedgerColumn {
    /// All columns, A to M
    pub const ALL: [LedgerColumn; LEDGER_WIDTH] = [
        LedgerColumn::SaleDate,
        LedgerColumn::CustomerName,
        LedgerColumn::CustomerNo,
        LedgerColumn::Phone,
        LedgerColumn::Address,
        LedgerColumn::ProductName,
        LedgerColumn::UnitPrice,
        LedgerColumn::Quantity,
        LedgerColumn::SupplyAmount,
        LedgerColumn::Vat,
        LedgerColumn::TotalAmount,
        LedgerColumn::Remarks,
        LedgerColumn::TransactionType,
    ];

    /// 0-based column index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header label written to row 1 of a new ledger tab
    pub fn header(self) -> &'static str {
        match self {
            LedgerColumn::SaleDate => "판매일자",
            LedgerColumn::CustomerName => "고객명",
            LedgerColumn::CustomerNo => "고객번호",
            LedgerColumn::Phone => "연락처",
            LedgerColumn::Address => "주소",
            LedgerColumn::ProductName => "상품명",
            LedgerColumn::UnitPrice => "단가",
            LedgerColumn::Quantity => "수량",
            LedgerColumn::SupplyAmount => "공급가액",
            LedgerColumn::Vat => "부가세액",
            LedgerColumn::TotalAmount => "판매금액",
            LedgerColumn::Remarks => "비고",
            LedgerColumn::TransactionType => "거래구분",
        }
    }

    /// The full header row
    pub fn header_row() -> Row {
        Self::ALL.iter().map(|c| c.header().to_string()).collect()
    }
}

/// 1-based position of a data row in the ledger tab.
///
/// Positional: valid only until the next deletion anywhere in the ledger.
/// Row 1 is the header, so the smallest data row id is 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RowId(u32);

impl RowId {
    /// First data row
    pub const FIRST: RowId = RowId(2);

    /// Validate a caller-supplied row id
    pub fn new(row: u32) -> Result<Self> {
        if row < Self::FIRST.0 {
            return Err(Error::InvalidRowId(row));
        }
        Ok(Self(row))
    }

    /// Row id of the `index`-th data row (0-based, header excluded)
    pub fn from_data_index(index: usize) -> Self {
        Self(index as u32 + Self::FIRST.0)
    }

    /// Spreadsheet row number
    pub fn get(self) -> u32 {
        self.0
    }

    /// 0-based grid index, as used by structural deletes
    pub fn grid_index(self) -> u32 {
        self.0 - 1
    }
}

impl TryFrom<u32> for RowId {
    type Error = Error;

    fn try_from(row: u32) -> Result<Self> {
        RowId::new(row)
    }
}

impl From<RowId> for u32 {
    fn from(id: RowId) -> u32 {
        id.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-facing customer number `C-<n>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomerNo(i64);

impl CustomerNo {
    /// Floor below the first issued number
    pub const BASE: i64 = 1000;

    /// Wrap a raw number
    pub fn new(number: i64) -> Self {
        Self(number)
    }

    /// Parse a stored cell; `None` for non-conforming text
    pub fn parse(cell: &str) -> Option<Self> {
        parse_customer_number(cell).map(Self)
    }

    /// Numeric part
    pub fn number(self) -> i64 {
        self.0
    }

    /// Number following the largest of `existing`, never below `C-1001`
    pub fn next_after<I>(existing: I) -> Self
    where
        I: IntoIterator<Item = CustomerNo>,
    {
        let max = existing
            .into_iter()
            .map(CustomerNo::number)
            .fold(Self::BASE, i64::max);
        Self(max.saturating_add(1))
    }
}

impl fmt::Display for CustomerNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

impl Serialize for CustomerNo {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Entry-time amounts derived from unit price and quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amounts {
    /// unit price × quantity
    pub supply_amount: Decimal,
    /// floor(supply × 10%)
    pub vat: Decimal,
    /// supply + vat
    pub total_amount: Decimal,
}

impl Amounts {
    /// Compute supply, VAT and total
    pub fn compute(unit_price: Decimal, quantity: Decimal) -> Result<Self> {
        Self::complete(unit_price, quantity, None, None, None)
    }

    /// Keep caller-supplied amounts and derive only the missing ones, each
    /// from the amounts before it.
    ///
    /// Fails with [`Error::AmountOverflow`] when a derived amount does not fit
    /// in a `Decimal`.
    pub fn complete(
        unit_price: Decimal,
        quantity: Decimal,
        supply_amount: Option<Decimal>,
        vat: Option<Decimal>,
        total_amount: Option<Decimal>,
    ) -> Result<Self> {
        let supply_amount = match supply_amount {
            Some(supply) => supply,
            None => unit_price
                .checked_mul(quantity)
                .ok_or_else(|| Error::AmountOverflow(format!("{} × {}", unit_price, quantity)))?,
        };
        let vat = match vat {
            Some(vat) => vat,
            None => supply_amount
                .checked_mul(VAT_RATE)
                .map(|v| v.floor())
                .ok_or_else(|| Error::AmountOverflow(format!("VAT of {}", supply_amount)))?,
        };
        let total_amount = match total_amount {
            Some(total) => total,
            None => supply_amount
                .checked_add(vat)
                .ok_or_else(|| Error::AmountOverflow(format!("{} + {}", supply_amount, vat)))?,
        };
        Ok(Self {
            supply_amount,
            vat,
            total_amount,
        })
    }
}

/// One ledger row, in storage column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Sale date as stored (ISO `YYYY-MM-DD` when entered through the API)
    pub sale_date: String,
    /// Customer name
    pub customer_name: String,
    /// Customer number, normally `C-<n>`
    pub customer_no: String,
    /// Free-form phone number
    pub phone: String,
    /// Address
    #[serde(default)]
    pub address: Option<String>,
    /// Product name
    pub product_name: String,
    /// Unit price
    pub unit_price: Decimal,
    /// Quantity
    pub quantity: Decimal,
    /// Supply amount, fixed at entry time
    pub supply_amount: Decimal,
    /// VAT, fixed at entry time
    pub vat: Decimal,
    /// Total amount, fixed at entry time
    pub total_amount: Decimal,
    /// Remarks
    #[serde(default)]
    pub remarks: Option<String>,
    /// Transaction type label
    #[serde(default = "default_transaction_type")]
    pub transaction_type: String,
}

fn default_transaction_type() -> String {
    DEFAULT_TRANSACTION_TYPE.to_string()
}

impl TransactionRecord {
    /// Decode a raw ledger row; never fails
    pub fn from_row(row: &[String]) -> Self {
        let cells: FixedRow<'_, LEDGER_WIDTH> = FixedRow::from_cells(row);
        Self {
            sale_date: cells.text(LedgerColumn::SaleDate.index()),
            customer_name: cells.text(LedgerColumn::CustomerName.index()),
            customer_no: cells.text(LedgerColumn::CustomerNo.index()),
            phone: cells.text(LedgerColumn::Phone.index()),
            address: cells.optional(LedgerColumn::Address.index()),
            product_name: cells.text(LedgerColumn::ProductName.index()),
            unit_price: cells.number(LedgerColumn::UnitPrice.index()),
            quantity: cells.number(LedgerColumn::Quantity.index()),
            supply_amount: cells.number(LedgerColumn::SupplyAmount.index()),
            vat: cells.number(LedgerColumn::Vat.index()),
            total_amount: cells.number(LedgerColumn::TotalAmount.index()),
            remarks: cells.optional(LedgerColumn::Remarks.index()),
            transaction_type: cells.text_or(
                LedgerColumn::TransactionType.index(),
                DEFAULT_TRANSACTION_TYPE,
            ),
        }
    }

    /// Encode as the 13 cells of a ledger row
    pub fn to_row(&self) -> Row {
        vec![
            self.sale_date.clone(),
            self.customer_name.clone(),
            self.customer_no.clone(),
            self.phone.clone(),
            self.address.clone().unwrap_or_default(),
            self.product_name.clone(),
            self.unit_price.to_string(),
            self.quantity.to_string(),
            self.supply_amount.to_string(),
            self.vat.to_string(),
            self.total_amount.to_string(),
            self.remarks.clone().unwrap_or_default(),
            self.transaction_type.clone(),
        ]
    }

    /// Parsed sale date, if the cell holds a recognisable date
    pub fn sale_date(&self) -> Option<NaiveDate> {
        parse_date(&self.sale_date)
    }
}

/// A record together with its current row position
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Delete handle, valid until the next deletion
    pub row_id: RowId,
    /// Decoded row
    #[serde(flatten)]
    pub record: TransactionRecord,
}

/// Transaction as entered, before amounts are derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    /// Sale date
    pub sale_date: String,
    /// Customer name
    pub customer_name: String,
    /// Customer number
    pub customer_no: String,
    /// Phone
    pub phone: String,
    /// Address
    #[serde(default)]
    pub address: Option<String>,
    /// Product name
    pub product_name: String,
    /// Unit price
    pub unit_price: Decimal,
    /// Quantity
    pub quantity: Decimal,
    /// Remarks
    #[serde(default)]
    pub remarks: Option<String>,
    /// Transaction type, defaults to sale
    #[serde(default)]
    pub transaction_type: Option<String>,
}

impl TransactionDraft {
    /// Fill in derived amounts
    pub fn into_record(self) -> Result<TransactionRecord> {
        let amounts = Amounts::compute(self.unit_price, self.quantity)?;
        Ok(self.into_record_with(amounts))
    }

    /// Use amounts supplied by the caller as-is
    pub fn into_record_with(self, amounts: Amounts) -> TransactionRecord {
        TransactionRecord {
            sale_date: self.sale_date,
            customer_name: self.customer_name,
            customer_no: self.customer_no,
            phone: self.phone,
            address: self.address.filter(|a| !a.is_empty()),
            product_name: self.product_name,
            unit_price: self.unit_price,
            quantity: self.quantity,
            supply_amount: amounts.supply_amount,
            vat: amounts.vat,
            total_amount: amounts.total_amount,
            remarks: self.remarks.filter(|r| !r.is_empty()),
            transaction_type: self
                .transaction_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(default_transaction_type),
        }
    }
}
