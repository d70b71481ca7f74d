use chrono::Local;
use serde::{Deserialize, Serialize};
use shared::Verdict;

use crate::ids::generate_id;

/// One completed single analysis. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: u64,
    pub name: String,
    pub timestamp: String,
    pub result: Verdict,
    pub confidence: String,
    pub media_ref: String,
}

impl ScanRecord {
    /// `sequence` is the 1-based position of this scan in the history log.
    pub fn new(sequence: usize, result: Verdict, confidence: String, media_ref: String) -> Self {
        Self {
            id: generate_id(),
            name: format!("Neural_Scan_{}", sequence),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            result,
            confidence,
            media_ref,
        }
    }
}
