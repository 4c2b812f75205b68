use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::RegionColors;
use crate::config::DashboardConfig;
use crate::data::aggregate::{DashboardTables, compute_dashboard};
use crate::data::cache::DatasetCache;
use crate::data::filter::RegionSelection;
use crate::data::model::OrderTable;
use crate::data::region::Region;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Source of the order table (None until a path is known).
    pub cache: Option<DatasetCache>,

    /// Table currently shown.
    pub dataset: Option<Arc<OrderTable>>,

    /// Ticked regions.
    pub selection: RegionSelection,

    /// Derived tables for the current selection (cached).
    pub tables: DashboardTables,

    /// Colour per region for the scatter plot and filter panel.
    pub region_colors: Option<RegionColors>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Time (egui seconds) of the last source change check.
    pub last_source_check: f64,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: None,
            dataset: None,
            selection: RegionSelection::default(),
            tables: DashboardTables::default(),
            region_colors: None,
            status_message: None,
            last_source_check: 0.0,
        }
    }

    /// Point the dashboard at `path` and load it with every region selected.
    pub fn open(&mut self, path: &Path) {
        self.cache = Some(DatasetCache::new(path));
        self.dataset = None;
        self.load();
    }

    /// Load (or fetch from the cache) the current source.
    pub fn load(&mut self) {
        let Some(cache) = self.cache.as_mut() else {
            return;
        };
        let result = cache.get().map_err(|e| {
            anyhow::Error::new(e).context(format!("Failed to load {}", cache.path().display()))
        });
        match result {
            Ok(table) => self.replace_dataset(table),
            Err(e) => self.fail(e),
        }
    }

    /// Force a re-read of the source, bypassing the cache.
    pub fn reload(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.invalidate();
        }
        self.load();
    }

    /// Reload if the source changed on disk since it was read.
    pub fn check_source(&mut self) {
        let Some(cache) = self.cache.as_mut() else {
            return;
        };
        match cache.refresh() {
            Ok(true) => {
                if let Some(table) = cache.cached() {
                    self.replace_dataset(table);
                }
            }
            Ok(false) => {}
            Err(e) => {
                let err = anyhow::Error::new(e).context("Source changed but could not be reloaded");
                self.fail(err);
            }
        }
    }

    /// Ingest a newly loaded dataset, reset the selection and colours.
    pub fn set_dataset(&mut self, dataset: Arc<OrderTable>) {
        let selection = RegionSelection::all(&dataset);
        self.install(dataset, selection);
    }

    /// Swap in a re-read of the current source. A narrowed selection is
    /// kept (minus regions that vanished); a full one grows with the table.
    fn replace_dataset(&mut self, dataset: Arc<OrderTable>) {
        let narrowed = self
            .dataset
            .as_ref()
            .is_some_and(|old| !self.selection.covers(old));
        if narrowed {
            let selection = self.selection.restricted_to(&dataset);
            self.install(dataset, selection);
        } else {
            self.set_dataset(dataset);
        }
    }

    fn install(&mut self, dataset: Arc<OrderTable>, selection: RegionSelection) {
        self.selection = selection;
        self.region_colors = Some(RegionColors::new(&dataset.regions));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    fn fail(&mut self, err: anyhow::Error) {
        log::error!("{err:#}");
        self.status_message = Some(format!("Error: {err:#}"));
        self.dataset = None;
        self.tables = DashboardTables::default();
    }

    /// Recompute the derived tables after a selection change.
    pub fn recompute(&mut self) {
        self.tables = match &self.dataset {
            Some(ds) => compute_dashboard(ds, &self.selection),
            None => DashboardTables::default(),
        };
    }

    /// Toggle a single region in the filter.
    pub fn toggle_region(&mut self, region: Region) {
        self.selection.toggle(region);
        self.recompute();
    }

    /// Select every region in the table.
    pub fn select_all(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection = RegionSelection::all(ds);
            self.recompute();
        }
    }

    /// Deselect every region.
    pub fn select_none(&mut self) {
        self.selection = RegionSelection::none();
        self.recompute();
    }

    pub fn source_path(&self) -> Option<PathBuf> {
        self.cache.as_ref().map(|c| c.path().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "order_id,customer_unique_id,customer_state,order_date,order_status,price\n\
                       o1,c1,SP,2024-01-05,delivered,10\n\
                       o2,c2,RJ,2024-01-06,shipped,20\n";

    fn loaded() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, CSV).expect("write fixture");
        let mut state = AppState::new(DashboardConfig::default());
        state.open(&path);
        (dir, state)
    }

    #[test]
    fn opening_selects_every_region() {
        let (_dir, state) = loaded();
        assert!(state.status_message.is_none());
        assert_eq!(state.selection.len(), 2);
        assert_eq!(state.tables.filtered_rows, 2);
        assert_eq!(state.tables.region_summary.len(), 2);
    }

    #[test]
    fn selection_changes_recompute() {
        let (_dir, mut state) = loaded();
        state.toggle_region(Some("São Paulo"));
        assert_eq!(state.tables.filtered_rows, 1);
        state.select_none();
        assert_eq!(state.tables.filtered_rows, 0);
        assert!(state.tables.region_summary.is_empty());
        assert_eq!(state.tables.region_stats.len(), 2);
        state.select_all();
        assert_eq!(state.tables.filtered_rows, 2);
    }

    #[test]
    fn load_failure_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut state = AppState::new(DashboardConfig::default());
        state.open(&dir.path().join("missing.csv"));
        assert!(state.dataset.is_none());
        let msg = state.status_message.expect("error message");
        assert!(msg.contains("missing.csv"), "{msg}");
    }

    #[test]
    fn source_change_keeps_narrowed_selection() {
        let (dir, mut state) = loaded();
        state.toggle_region(Some("Rio de Janeiro"));
        assert_eq!(state.tables.filtered_rows, 1);

        let path = dir.path().join("orders.csv");
        std::fs::write(&path, format!("{CSV}o3,c3,SP,2024-01-07,approved,5\n")).expect("rewrite");
        state.check_source();
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(3));
        assert!(!state.selection.contains(&Some("Rio de Janeiro")));
        assert_eq!(state.tables.filtered_rows, 2);

        state.reload();
        assert_eq!(state.tables.filtered_rows, 2);

        state.open(&path);
        assert_eq!(state.tables.filtered_rows, 3);
    }

    #[test]
    fn reload_keeps_working_after_edit() {
        let (dir, mut state) = loaded();
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, format!("{CSV}o3,c3,BA,2024-01-07,approved,5\n")).expect("rewrite");
        state.check_source();
        assert_eq!(state.tables.filtered_rows, 3);
        state.reload();
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(3));
    }
}
