use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::{DataError, Result};
use super::loader::load_file;
use super::model::OrderTable;

// ---------------------------------------------------------------------------
// Source fingerprint
// ---------------------------------------------------------------------------

/// What we remember about the source file to notice it changed on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceFingerprint {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(SourceFingerprint {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// DatasetCache – one loaded table per source path
// ---------------------------------------------------------------------------

struct CacheEntry {
    fingerprint: SourceFingerprint,
    table: Arc<OrderTable>,
}

/// Outcome of the last read of the source.
enum Slot {
    Empty,
    Loaded(CacheEntry),
    /// The read failed. Holds the fingerprint seen at that time, `None` if
    /// the file could not even be stat'ed.
    Failed(Option<SourceFingerprint>),
}

/// Lazily loads the order table and hands out the same `Arc` until the
/// source file changes or the cache is invalidated.
pub struct DatasetCache {
    path: PathBuf,
    slot: Slot,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DatasetCache {
            path: path.into(),
            slot: Slot::Empty,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached table, if one is loaded. Never touches the disk.
    pub fn cached(&self) -> Option<Arc<OrderTable>> {
        match &self.slot {
            Slot::Loaded(entry) => Some(Arc::clone(&entry.table)),
            Slot::Empty | Slot::Failed(_) => None,
        }
    }

    /// Return the cached table, loading it first if nothing is cached or
    /// the source changed since the last load.
    pub fn get(&mut self) -> Result<Arc<OrderTable>> {
        let current = match SourceFingerprint::of(&self.path) {
            Ok(fp) => fp,
            Err(e) => {
                self.slot = Slot::Failed(None);
                return Err(e);
            }
        };
        if let Slot::Loaded(entry) = &self.slot {
            if entry.fingerprint == current {
                return Ok(Arc::clone(&entry.table));
            }
            log::info!("{} changed on disk, reloading", self.path.display());
        }
        self.load(current)
    }

    /// Whether the source no longer matches what was last read.
    ///
    /// A loaded source that disappeared counts as changed. After a failed
    /// read, any new version of the file counts as changed, so a fixed
    /// source is picked up again. Nothing is stale before the first read.
    pub fn is_stale(&self) -> bool {
        let current = SourceFingerprint::of(&self.path).ok();
        match &self.slot {
            Slot::Empty => false,
            Slot::Loaded(entry) => current != Some(entry.fingerprint),
            Slot::Failed(seen) => current.is_some() && current != *seen,
        }
    }

    /// Reload if stale. Returns `true` when a new table was loaded.
    pub fn refresh(&mut self) -> Result<bool> {
        if !self.is_stale() {
            return Ok(false);
        }
        self.get().map(|_| true)
    }

    /// Drop the cached table; the next [`get`](Self::get) reads the source.
    pub fn invalidate(&mut self) {
        if let Slot::Loaded(_) = std::mem::replace(&mut self.slot, Slot::Empty) {
            log::debug!("Invalidated cached dataset for {}", self.path.display());
        }
    }

    fn load(&mut self, fingerprint: SourceFingerprint) -> Result<Arc<OrderTable>> {
        match load_file(&self.path) {
            Ok(table) => {
                let table = Arc::new(table);
                self.slot = Slot::Loaded(CacheEntry {
                    fingerprint,
                    table: Arc::clone(&table),
                });
                Ok(table)
            }
            Err(e) => {
                // The previous table must not keep looking current.
                self.slot = Slot::Failed(Some(fingerprint));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "order_id,customer_unique_id,customer_state,order_date,order_status,price\n\
                       o1,c1,SP,2024-01-05,delivered,10\n";

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, CSV).expect("write fixture");
        (dir, path)
    }

    #[test]
    fn repeated_gets_share_one_table() {
        let (_dir, path) = fixture();
        let mut cache = DatasetCache::new(&path);
        assert!(cache.cached().is_none());

        let a = cache.get().expect("first load");
        let b = cache.get().expect("cached");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!cache.is_stale());
        assert!(!cache.refresh().expect("refresh"));
    }

    #[test]
    fn source_change_triggers_reload() {
        let (_dir, path) = fixture();
        let mut cache = DatasetCache::new(&path);
        let before = cache.get().expect("load");
        assert_eq!(before.len(), 1);

        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .expect("open");
        f.write_all(b"o2,c2,RJ,2024-02-01,shipped,5\n").expect("append");
        drop(f);

        assert!(cache.is_stale());
        assert!(cache.refresh().expect("refresh"));
        let after = cache.cached().expect("reloaded");
        assert_eq!(after.len(), 2);
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn invalidate_forces_a_fresh_read() {
        let (_dir, path) = fixture();
        let mut cache = DatasetCache::new(&path);
        let a = cache.get().expect("load");
        cache.invalidate();
        assert!(cache.cached().is_none());
        let b = cache.get().expect("reload");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn failed_reload_clears_the_cache() {
        let (_dir, path) = fixture();
        let mut cache = DatasetCache::new(&path);
        cache.get().expect("load");

        std::fs::write(
            &path,
            "order_id,customer_unique_id,customer_state,order_date,order_status,price\n\
             o1,c1,SP,yesterday,delivered,10\n",
        )
        .expect("rewrite");

        assert!(matches!(cache.get(), Err(DataError::InvalidDate { .. })));
        assert!(cache.cached().is_none());
    }

    #[test]
    fn fixed_source_is_picked_up_after_a_failed_reload() {
        let (_dir, path) = fixture();
        let mut cache = DatasetCache::new(&path);
        cache.get().expect("load");

        std::fs::write(
            &path,
            "order_id,customer_unique_id,customer_state,order_date,order_status,price\n\
             o1,c1,SP,yesterday,delivered,10\n",
        )
        .expect("break source");
        assert!(cache.refresh().is_err());
        assert!(cache.cached().is_none());
        // Same broken file: no repeated reload attempts.
        assert!(!cache.is_stale());

        std::fs::write(&path, format!("{CSV}o2,c2,RJ,2024-02-01,shipped,5\n")).expect("fix source");
        assert!(cache.is_stale());
        assert!(cache.refresh().expect("refresh"));
        assert_eq!(cache.cached().map(|t| t.len()), Some(2));
    }

    #[test]
    fn source_that_reappears_is_reloaded() {
        let (_dir, path) = fixture();
        let mut cache = DatasetCache::new(&path);
        cache.get().expect("load");

        std::fs::remove_file(&path).expect("remove");
        assert!(cache.is_stale());
        assert!(matches!(cache.refresh(), Err(DataError::Io { .. })));
        assert!(!cache.is_stale());

        std::fs::write(&path, CSV).expect("restore");
        assert!(cache.is_stale());
        assert!(cache.refresh().expect("refresh"));
        assert!(cache.cached().is_some());
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = DatasetCache::new(dir.path().join("absent.csv"));
        assert!(matches!(cache.get(), Err(DataError::Io { .. })));
        assert!(!cache.is_stale());
    }
}
