use std::collections::BTreeSet;

use super::model::{OrderRecord, OrderTable};
use super::region::Region;

// ---------------------------------------------------------------------------
// Region selection
// ---------------------------------------------------------------------------

/// The set of regions the user has ticked. An empty selection shows nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSelection {
    selected: BTreeSet<Region>,
}

impl RegionSelection {
    /// Every region present in the table, the default selection.
    pub fn all(table: &OrderTable) -> Self {
        RegionSelection {
            selected: table.regions.clone(),
        }
    }

    pub fn none() -> Self {
        RegionSelection::default()
    }

    pub fn contains(&self, region: &Region) -> bool {
        self.selected.contains(region)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Flip one region in or out of the selection.
    pub fn toggle(&mut self, region: Region) {
        if !self.selected.remove(&region) {
            self.selected.insert(region);
        }
    }

    /// The part of this selection that still exists in `table`.
    pub fn restricted_to(&self, table: &OrderTable) -> Self {
        RegionSelection {
            selected: self.selected.intersection(&table.regions).copied().collect(),
        }
    }

    /// Whether every region of `table` is selected, i.e. no effective filter.
    pub fn covers(&self, table: &OrderTable) -> bool {
        table.regions.is_subset(&self.selected)
    }
}

impl FromIterator<Region> for RegionSelection {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        RegionSelection {
            selected: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Rows whose region is selected, in source order.
pub fn filter_by_region(table: &OrderTable, selection: &RegionSelection) -> Vec<OrderRecord> {
    if selection.is_empty() {
        return Vec::new();
    }
    if selection.covers(table) {
        return table.records.clone();
    }
    table
        .records
        .iter()
        .filter(|r| selection.contains(&r.region))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::OrderStatus;

    fn table() -> OrderTable {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let rows = [
            ("o1", Some("São Paulo")),
            ("o2", Some("Bahia")),
            ("o3", None),
            ("o4", Some("São Paulo")),
        ];
        OrderTable::from_records(
            rows.into_iter()
                .map(|(id, region)| OrderRecord {
                    order_id: id.into(),
                    customer_unique_id: "c".into(),
                    region,
                    order_date: date,
                    order_status: OrderStatus::Delivered,
                    price: 1.0,
                })
                .collect(),
        )
    }

    fn ids(rows: &[OrderRecord]) -> Vec<&str> {
        rows.iter().map(|r| r.order_id.as_str()).collect()
    }

    #[test]
    fn default_selection_keeps_every_row() {
        let t = table();
        let sel = RegionSelection::all(&t);
        assert_eq!(sel.len(), 3);
        assert_eq!(ids(&filter_by_region(&t, &sel)), ["o1", "o2", "o3", "o4"]);
    }

    #[test]
    fn subset_keeps_source_order() {
        let t = table();
        let sel: RegionSelection = [Some("São Paulo"), None].into_iter().collect();
        assert_eq!(ids(&filter_by_region(&t, &sel)), ["o1", "o3", "o4"]);
    }

    #[test]
    fn empty_selection_yields_no_rows() {
        let t = table();
        assert!(filter_by_region(&t, &RegionSelection::none()).is_empty());
    }

    #[test]
    fn toggling_twice_restores_selection() {
        let t = table();
        let mut sel = RegionSelection::all(&t);
        sel.toggle(Some("Bahia"));
        assert!(!sel.contains(&Some("Bahia")));
        assert_eq!(ids(&filter_by_region(&t, &sel)), ["o1", "o3", "o4"]);
        sel.toggle(Some("Bahia"));
        assert_eq!(sel, RegionSelection::all(&t));
    }

    #[test]
    fn restricting_drops_vanished_regions() {
        let t = table();
        let sel: RegionSelection = [Some("Bahia"), Some("Acre")].into_iter().collect();
        let kept = sel.restricted_to(&t);
        assert_eq!(kept.len(), 1);
        assert!(kept.contains(&Some("Bahia")));
        assert!(RegionSelection::none().restricted_to(&t).is_empty());
    }

    #[test]
    fn regions_absent_from_table_do_not_match() {
        let t = table();
        let sel: RegionSelection = [Some("Acre")].into_iter().collect();
        assert!(filter_by_region(&t, &sel).is_empty());
    }
}
