pub mod history_store;
pub mod models;

pub use history_store::{HistoryError, HistoryStats, HistoryStore, SCAN_HISTORY_KEY};
pub use models::ScanRecord;
