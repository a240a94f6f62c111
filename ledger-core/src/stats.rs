//! Sales statistics over a date range

use crate::{search::sort_newest_first, types::LedgerEntry, Ledger, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Products listed in the ranking
pub const TOP_PRODUCTS: usize = 5;

/// Sales listed as recent
pub const RECENT_SALES: usize = 10;

/// Group label for rows without a product name
pub const UNKNOWN_PRODUCT: &str = "Unknown";

/// Inclusive sale-date window; open ends are unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// First day included
    pub start: Option<NaiveDate>,
    /// Last day included
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Window between two optional days
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Whether the window is unbounded on both ends
    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Rows whose date cannot be read are always kept
    pub fn contains(&self, entry: &LedgerEntry) -> bool {
        let Some(date) = entry.record.sale_date() else {
            return true;
        };
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Revenue of one product
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    /// Product name
    pub name: String,
    /// Number of sales
    pub count: usize,
    /// Sum of total amounts
    pub revenue: Decimal,
}

/// Aggregates over the sales inside a date window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStats {
    /// Sum of total amounts
    pub total_revenue: Decimal,
    /// Number of sales
    pub sales_count: usize,
    /// Revenue per sale, rounded to 2 places; zero without sales
    pub avg_order_value: Decimal,
    /// Best products by revenue
    pub top_products: Vec<ProductSummary>,
    /// Newest sales
    pub recent_sales: Vec<LedgerEntry>,
    /// Every sale in the window, newest first
    pub filtered_sales: Vec<LedgerEntry>,
}

impl SalesStats {
    /// Compute statistics for the entries inside `range`
    pub fn compute(entries: Vec<LedgerEntry>, range: &DateRange) -> Self {
        let mut sales: Vec<LedgerEntry> = entries
            .into_iter()
            .filter(|e| range.contains(e))
            .collect();

        // Stored cells can hold anything up to Decimal::MAX; sums saturate.
        let total_revenue = sales
            .iter()
            .fold(Decimal::ZERO, |sum, e| sum.saturating_add(e.record.total_amount));
        let sales_count = sales.len();
        let avg_order_value = if sales_count == 0 {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(sales_count)).round_dp(2)
        };

        // First-seen order breaks revenue ties.
        let mut products: Vec<ProductSummary> = Vec::new();
        for sale in &sales {
            let name = if sale.record.product_name.is_empty() {
                UNKNOWN_PRODUCT
            } else {
                sale.record.product_name.as_str()
            };
            match products.iter_mut().find(|p| p.name == name) {
                Some(product) => {
                    product.count += 1;
                    product.revenue = product.revenue.saturating_add(sale.record.total_amount);
                }
                None => products.push(ProductSummary {
                    name: name.to_string(),
                    count: 1,
                    revenue: sale.record.total_amount,
                }),
            }
        }
        products.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        products.truncate(TOP_PRODUCTS);

        sort_newest_first(&mut sales);
        let recent_sales = sales.iter().take(RECENT_SALES).cloned().collect();

        Self {
            total_revenue,
            sales_count,
            avg_order_value,
            top_products: products,
            recent_sales,
            filtered_sales: sales,
        }
    }
}

impl Ledger {
    /// Statistics over the whole ledger, restricted to `range`
    pub async fn sales_stats(&self, range: &DateRange) -> Result<SalesStats> {
        let stats = SalesStats::compute(self.list_all_transactions().await?, range);
        debug!(
            "Stats {:?}..{:?}: {} sales, revenue {}",
            range.start, range.end, stats.sales_count, stats.total_revenue
        );
        Ok(stats)
    }
}
