use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use shared::Verdict;

use super::models::ScanRecord;
use crate::storage::local_store::{read_json, write_json};
use crate::storage::{KeyValueStore, StoreError};

pub const SCAN_HISTORY_KEY: &str = "scan_history";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub fake: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("History storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Most-recent-first log of completed single analyses, mirrored into the
/// key-value store on every mutation.
pub struct HistoryStore {
    records: Mutex<Vec<ScanRecord>>,
    store: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    /// Hydrates from the store. A missing key is an empty history.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, HistoryError> {
        let records: Vec<ScanRecord> =
            read_json(store.as_ref(), SCAN_HISTORY_KEY)?.unwrap_or_default();
        log::info!("Loaded {} scan records from history", records.len());
        Ok(Self {
            records: Mutex::new(records),
            store,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ScanRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Prepends the record and persists the full list. The in-memory list is
    /// updated even if persisting fails.
    pub fn append(&self, record: ScanRecord) -> Result<(), HistoryError> {
        let mut records = self.lock();
        log::debug!("Appending scan record {} ({})", record.id, record.name);
        records.insert(0, record);
        write_json(self.store.as_ref(), SCAN_HISTORY_KEY, records.as_slice())?;
        Ok(())
    }

    /// Removes the persisted key first; memory is only emptied once that
    /// succeeds.
    pub fn clear(&self) -> Result<(), HistoryError> {
        let mut records = self.lock();
        self.store.remove(SCAN_HISTORY_KEY)?;
        records.clear();
        log::info!("Scan history cleared");
        Ok(())
    }

    pub fn stats(&self) -> HistoryStats {
        let records = self.lock();
        HistoryStats {
            total: records.len(),
            fake: records.iter().filter(|r| r.result == Verdict::Fake).count(),
        }
    }

    pub fn records(&self) -> Vec<ScanRecord> {
        self.lock().clone()
    }

    pub fn latest(&self) -> Option<ScanRecord> {
        self.lock().first().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
