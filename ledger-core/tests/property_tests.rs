//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify:
//! - Lookup: a row is returned iff its name contains the filter and its
//!   phone ends with the phone filter
//! - Customer numbers: next = max(1000, largest stored) + 1
//! - Cell coercion never panics and reads plain digits exactly
//! - Deletion shifts every later row id down by one

use ledger_core::{
    cell::parse_number, CustomerNo, Ledger, LedgerColumn, LedgerLayout, MemorySheetStore, Row,
    RowId,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Strategy for short names drawn from a tiny alphabet so substrings collide
fn name_strategy() -> impl Strategy<Value = String> {
    "[abK]{0,4}"
}

/// Strategy for phone numbers with frequent shared suffixes
fn phone_strategy() -> impl Strategy<Value = String> {
    "[12-]{0,5}"
}

fn sale_row(name: &str, customer_no: &str, phone: &str) -> Row {
    [
        "2024-05-01",
        name,
        customer_no,
        phone,
        "",
        "반지",
        "1000",
        "1",
        "1000",
        "100",
        "1100",
        "",
        "판매",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

fn ledger_over(rows: Vec<Row>) -> Ledger {
    let mut all = vec![LedgerColumn::header_row()];
    all.extend(rows);
    let store = Arc::new(MemorySheetStore::empty().with_sheet("Sheet1", all));
    Ledger::new(store, LedgerLayout::default())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

proptest! {
    #[test]
    fn prop_lookup_filter_law(
        customers in prop::collection::vec((name_strategy(), phone_strategy()), 0..12),
        name in "[abK]{0,2}",
        phone in "[12-]{0,2}",
    ) {
        let rows: Vec<Row> = customers
            .iter()
            .map(|(n, p)| sale_row(n, "C-1001", p))
            .collect();
        let ledger = ledger_over(rows);

        let found = runtime()
            .block_on(ledger.lookup_transactions(&name, &phone))
            .unwrap();

        let expected: Vec<u32> = customers
            .iter()
            .enumerate()
            .filter(|(_, (n, p))| n.contains(name.as_str()) && p.ends_with(phone.as_str()))
            .map(|(i, _)| i as u32 + 2)
            .collect();
        let actual: Vec<u32> = found.iter().map(|e| e.row_id.get()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_next_customer_number(numbers in prop::collection::vec(0i64..5000, 0..20)) {
        let rows: Vec<Row> = numbers
            .iter()
            .map(|n| sale_row("고객", &format!("C-{}", n), "010"))
            .collect();
        let ledger = ledger_over(rows);

        let next = runtime().block_on(ledger.next_customer_number()).unwrap();
        let expected = numbers.iter().copied().fold(CustomerNo::BASE, i64::max) + 1;
        prop_assert_eq!(next.number(), expected);
        prop_assert_eq!(next.to_string(), format!("C-{}", expected));
    }

    #[test]
    fn prop_parse_number_never_panics(cell in "\\PC{0,24}") {
        let _ = parse_number(&cell);
    }

    #[test]
    fn prop_parse_number_reads_digits(value in 0u64..1_000_000_000_000) {
        prop_assert_eq!(parse_number(&value.to_string()), Decimal::from(value));
    }

    #[test]
    fn prop_parse_number_ignores_grouping(value in 1_000u64..1_000_000_000) {
        let grouped = format!("₩{},{:03}", value / 1000, value % 1000);
        prop_assert_eq!(parse_number(&grouped), Decimal::from(value));
    }
}

#[tokio::test]
async fn test_delete_renumbers_following_rows() {
    let ledger = ledger_over(vec![
        sale_row("first", "C-1001", "1"),
        sale_row("second", "C-1002", "2"),
        sale_row("third", "C-1003", "3"),
    ]);

    ledger.delete_transaction(RowId::new(3).unwrap()).await.unwrap();

    let all = ledger.list_all_transactions().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].row_id.get(), 3);
    assert_eq!(all[1].record.customer_name, "third");
}
