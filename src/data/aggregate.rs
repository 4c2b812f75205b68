//! Derived tables behind each chart.
//!
//! Every function here is pure over a slice of orders and returns an empty
//! table for empty input. Grouping goes through `BTreeMap`s so row order and
//! floating-point summation order are fixed for a given input.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

use super::filter::{RegionSelection, filter_by_region};
use super::model::{OrderRecord, OrderStatus, OrderTable};
use super::region::Region;
use super::repeat::RepeatCategory;

/// Number of regions shown in the two pie charts.
pub const DEFAULT_TOP_REGIONS: usize = 10;

// ---------------------------------------------------------------------------
// Region summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub region: Region,
    pub total_spend: f64,
    pub total_customers: usize,
}

/// Spend and distinct customers per region, highest spend first.
/// Equal spends keep region order (undefined region first).
pub fn region_summary(rows: &[OrderRecord]) -> Vec<RegionSummary> {
    let mut groups: BTreeMap<Region, (f64, BTreeSet<&str>)> = BTreeMap::new();
    for r in rows {
        let (spend, customers) = groups.entry(r.region).or_default();
        *spend += r.price;
        customers.insert(r.customer_unique_id.as_str());
    }

    let mut summary: Vec<RegionSummary> = groups
        .into_iter()
        .map(|(region, (total_spend, customers))| RegionSummary {
            region,
            total_spend,
            total_customers: customers.len(),
        })
        .collect();
    summary.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
    summary
}

/// The first `n` rows of a sorted summary. Rows tied with the n-th are cut.
pub fn top_regions(summary: &[RegionSummary], n: usize) -> &[RegionSummary] {
    &summary[..n.min(summary.len())]
}

// ---------------------------------------------------------------------------
// Status counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

/// Orders per charted status, most frequent first.
///
/// Only `delivered`, `shipped`, `processing` and `approved` are counted and
/// statuses that never occur are left out. Equal counts keep that listing
/// order, so the result is stable for a given input.
pub fn status_counts(rows: &[OrderRecord]) -> Vec<StatusCount> {
    let mut counts = [0usize; 4];
    for r in rows {
        if let Some(i) = OrderStatus::CHARTED.iter().position(|s| *s == r.order_status) {
            counts[i] += 1;
        }
    }

    let mut out: Vec<StatusCount> = OrderStatus::CHARTED
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(status, count)| StatusCount { status, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

// ---------------------------------------------------------------------------
// Customer order span and repeat categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerOrderSpan {
    pub customer_unique_id: String,
    pub first_purchase: NaiveDateTime,
    pub last_purchase: NaiveDateTime,
    pub total_orders: usize,
    /// Whole days between first and last purchase.
    pub span_days: i64,
    pub category: RepeatCategory,
}

/// One row per customer, ordered by customer id.
pub fn customer_order_spans(rows: &[OrderRecord]) -> Vec<CustomerOrderSpan> {
    let mut groups: BTreeMap<&str, (NaiveDateTime, NaiveDateTime, usize)> = BTreeMap::new();
    for r in rows {
        groups
            .entry(r.customer_unique_id.as_str())
            .and_modify(|(first, last, n)| {
                *first = (*first).min(r.order_date);
                *last = (*last).max(r.order_date);
                *n += 1;
            })
            .or_insert((r.order_date, r.order_date, 1));
    }

    groups
        .into_iter()
        .map(|(customer, (first_purchase, last_purchase, total_orders))| {
            let span_days = (last_purchase - first_purchase).num_days();
            CustomerOrderSpan {
                customer_unique_id: customer.to_string(),
                first_purchase,
                last_purchase,
                total_orders,
                span_days,
                category: RepeatCategory::from_span(Some(span_days)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatCategoryCount {
    pub category: RepeatCategory,
    pub count: usize,
}

/// Customers per repeat bucket in bucket order.
///
/// All seven buckets are listed, empty ones with a zero count, followed by
/// `Invalid` only when some span was degenerate. No customers, no rows.
pub fn repeat_category_counts(spans: &[CustomerOrderSpan]) -> Vec<RepeatCategoryCount> {
    if spans.is_empty() {
        return Vec::new();
    }
    let mut counts: BTreeMap<RepeatCategory, usize> = RepeatCategory::BUCKETS
        .into_iter()
        .map(|c| (c, 0))
        .collect();
    for s in spans {
        *counts.entry(s.category).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(category, count)| RepeatCategoryCount { category, count })
        .collect()
}

// ---------------------------------------------------------------------------
// Monthly spend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySpend {
    /// First day of the calendar month.
    pub month: NaiveDate,
    pub customer_unique_id: String,
    pub region: Region,
    pub total_spend: f64,
}

pub fn month_start(ts: NaiveDateTime) -> NaiveDate {
    let date = ts.date();
    date - Days::new(u64::from(date.day0()))
}

/// Spend per (month, customer, region), in that key order.
pub fn monthly_spend(rows: &[OrderRecord]) -> Vec<MonthlySpend> {
    let mut groups: BTreeMap<(NaiveDate, &str, Region), f64> = BTreeMap::new();
    for r in rows {
        *groups
            .entry((month_start(r.order_date), r.customer_unique_id.as_str(), r.region))
            .or_default() += r.price;
    }
    groups
        .into_iter()
        .map(|((month, customer, region), total_spend)| MonthlySpend {
            month,
            customer_unique_id: customer.to_string(),
            region,
            total_spend,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Region customer stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RegionCustomerStats {
    pub region: Region,
    pub unique_customers: usize,
    /// Mean price per order row.
    pub mean_spend: f64,
}

/// Distinct customers and mean order price per region, in region order.
pub fn region_customer_stats(rows: &[OrderRecord]) -> Vec<RegionCustomerStats> {
    let mut groups: BTreeMap<Region, (f64, usize, BTreeSet<&str>)> = BTreeMap::new();
    for r in rows {
        let (sum, n, customers) = groups.entry(r.region).or_default();
        *sum += r.price;
        *n += 1;
        customers.insert(r.customer_unique_id.as_str());
    }
    groups
        .into_iter()
        .map(|(region, (sum, n, customers))| RegionCustomerStats {
            region,
            unique_customers: customers.len(),
            mean_spend: sum / n as f64,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Whole dashboard
// ---------------------------------------------------------------------------

/// Every derived table the dashboard renders for one region selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardTables {
    /// Rows left after the region filter.
    pub filtered_rows: usize,
    pub region_summary: Vec<RegionSummary>,
    pub status_counts: Vec<StatusCount>,
    pub customer_spans: Vec<CustomerOrderSpan>,
    pub repeat_categories: Vec<RepeatCategoryCount>,
    pub monthly_spend: Vec<MonthlySpend>,
    /// Always computed over the full table, independent of the selection.
    pub region_stats: Vec<RegionCustomerStats>,
}

/// Filter `table` to `selection` and compute every derived table.
pub fn compute_dashboard(table: &OrderTable, selection: &RegionSelection) -> DashboardTables {
    let rows = filter_by_region(table, selection);
    let customer_spans = customer_order_spans(&rows);
    let repeat_categories = repeat_category_counts(&customer_spans);

    log::debug!(
        "Recomputed dashboard: {} of {} rows, {} regions selected",
        rows.len(),
        table.len(),
        selection.len()
    );

    DashboardTables {
        filtered_rows: rows.len(),
        region_summary: region_summary(&rows),
        status_counts: status_counts(&rows),
        customer_spans,
        repeat_categories,
        monthly_spend: monthly_spend(&rows),
        region_stats: region_customer_stats(&table.records),
    }
}
