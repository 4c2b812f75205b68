/// Data layer: core types, loading, caching, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → OrderTable (region codes → names)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  one Arc<OrderTable>, reloaded when the file changes
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  keep rows of the selected regions
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  derived tables → DashboardTables
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod region;
pub mod repeat;
