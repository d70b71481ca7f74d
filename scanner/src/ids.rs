use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::Rng;

/// Millisecond timestamp scaled by 1000 plus a process-wide counter, so ids
/// created within the same millisecond still differ.
pub fn generate_id() -> u64 {
    static ID_COUNTER: AtomicU64 = AtomicU64::new(0);
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let count = ID_COUNTER.fetch_add(1, Ordering::SeqCst);
    now * 1000 + (count % 1000)
}

/// Timestamp plus random suffix, for items created in a burst.
pub fn generate_item_id() -> String {
    let now = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random();
    format!("{}-{:08x}", now, suffix)
}
