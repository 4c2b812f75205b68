use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;

use super::region::{Region, region_label};

// ---------------------------------------------------------------------------
// OrderStatus – the order lifecycle vocabulary
// ---------------------------------------------------------------------------

/// Order status as exported by the marketplace. Anything outside the four
/// statuses the dashboard charts is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderStatus {
    Delivered,
    Shipped,
    Processing,
    Approved,
    Other(String),
}

impl OrderStatus {
    /// The statuses counted by the status chart, in tie-break order.
    pub const CHARTED: [OrderStatus; 4] = [
        OrderStatus::Delivered,
        OrderStatus::Shipped,
        OrderStatus::Processing,
        OrderStatus::Approved,
    ];

    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "delivered" => OrderStatus::Delivered,
            "shipped" => OrderStatus::Shipped,
            "processing" => OrderStatus::Processing,
            "approved" => OrderStatus::Approved,
            other => OrderStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Delivered => "delivered",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Processing => "processing",
            OrderStatus::Approved => "approved",
            OrderStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OrderRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single order line after normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_unique_id: String,
    /// Full region name; `None` when the source code was not recognised.
    pub region: Region,
    pub order_date: NaiveDateTime,
    pub order_status: OrderStatus,
    pub price: f64,
}

// ---------------------------------------------------------------------------
// OrderTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The loaded order table. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct OrderTable {
    pub records: Vec<OrderRecord>,
    /// Distinct regions present, undefined (`None`) sorting first.
    pub regions: BTreeSet<Region>,
}

impl OrderTable {
    /// Build the region index from the loaded records.
    pub fn from_records(records: Vec<OrderRecord>) -> Self {
        let regions = records.iter().map(|r| r.region).collect();
        OrderTable { records, regions }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows whose region code could not be translated.
    pub fn undefined_region_rows(&self) -> usize {
        self.records.iter().filter(|r| r.region.is_none()).count()
    }
}

impl fmt::Display for OrderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] {} {} {:.2}",
            self.order_id,
            self.customer_unique_id,
            region_label(self.region),
            self.order_date,
            self.order_status,
            self.price
        )
    }
}
