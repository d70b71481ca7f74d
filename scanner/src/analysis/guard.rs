use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "analysis in progress" flag. Single and batch analyses take the
/// same guard, so at most one inference request is in flight.
#[derive(Clone, Default)]
pub struct AnalysisGuard {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of one analysis; releases the guard on drop.
pub struct AnalysisPermit {
    busy: Arc<AtomicBool>,
}

impl AnalysisGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<AnalysisPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| AnalysisPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for AnalysisPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_permit_at_a_time() {
        let guard = AnalysisGuard::new();
        let other = guard.clone();

        let permit = guard.try_acquire().unwrap();
        assert!(other.is_busy());
        assert!(other.try_acquire().is_none());

        drop(permit);
        assert!(!guard.is_busy());
        assert!(other.try_acquire().is_some());
    }
}
