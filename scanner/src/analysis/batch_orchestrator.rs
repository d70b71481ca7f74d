use std::sync::{Arc, Mutex, MutexGuard};

use super::error::AnalysisError;
use super::guard::AnalysisGuard;
use super::media::{MediaFile, MediaRef};
use super::models::{AnalysisReport, BatchItem, BatchStatus, BatchSummary};
use super::single_flow::SingleAnalysisFlow;
use crate::inference::InferenceService;
use crate::notify::NotificationCenter;

#[derive(Debug)]
pub enum Submission {
    Empty,
    Single(AnalysisReport),
    Batch { count: usize },
}

#[derive(Default)]
struct BatchState {
    items: Vec<BatchItem>,
    progress: f64,
    running: bool,
    current: Option<usize>,
    /// Bumped by `clear`; a run only commits results for the generation it
    /// started with.
    generation: u64,
}

impl BatchState {
    fn has_queued(&self) -> bool {
        self.items.iter().any(|i| i.status == BatchStatus::Queued)
    }

    fn recompute_progress(&mut self) {
        if self.items.is_empty() {
            self.progress = 0.0;
            return;
        }
        let terminal = self.items.iter().filter(|i| i.status.is_terminal()).count();
        let progress = terminal as f64 / self.items.len() as f64 * 100.0;
        self.progress = progress.clamp(self.progress, 100.0);
    }

    fn reset(&mut self) {
        self.items.clear();
        self.progress = 0.0;
        self.running = false;
        self.current = None;
    }
}

/// Sequences a multi-file submission through the inference service one item
/// at a time. The worker loop in `start` is the only place that issues batch
/// requests, and it holds the shared analysis guard for the whole run.
#[derive(Clone)]
pub struct BatchOrchestrator {
    state: Arc<Mutex<BatchState>>,
    service: Arc<dyn InferenceService>,
    single: Arc<SingleAnalysisFlow>,
    notifications: NotificationCenter,
    guard: AnalysisGuard,
}

impl BatchOrchestrator {
    pub fn new(
        service: Arc<dyn InferenceService>,
        single: Arc<SingleAnalysisFlow>,
        notifications: NotificationCenter,
        guard: AnalysisGuard,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(BatchState::default())),
            service,
            single,
            notifications,
            guard,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BatchState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// One file goes straight to the single analysis flow; several files
    /// become a queued batch waiting for `start`.
    pub async fn submit(&self, files: Vec<MediaFile>) -> Result<Submission, AnalysisError> {
        if files.len() <= 1 {
            let Some(file) = files.into_iter().next() else {
                return Ok(Submission::Empty);
            };
            let media = MediaRef::from_file(&file);
            return self.single.analyze(Some(media)).await.map(Submission::Single);
        }

        if self.guard.is_busy() {
            log::warn!("Batch submission rejected while an analysis is running");
            self.notifications.info(AnalysisError::Busy.user_message());
            return Err(AnalysisError::Busy);
        }

        let count = files.len();
        {
            let mut state = self.lock();
            state.reset();
            state.items = files.into_iter().map(BatchItem::queued).collect();
        }

        log::info!("{} files queued for batch analysis", count);
        self.notifications
            .info(format!("📁 {} images ready for batch analysis", count));
        Ok(Submission::Batch { count })
    }

    /// Processes every queued item in submission order. Returns `None` when
    /// there was nothing to do, another analysis held the guard, or the batch
    /// was cleared mid-run.
    pub async fn start(&self) -> Option<BatchSummary> {
        if !self.lock().has_queued() {
            log::debug!("Batch start ignored: nothing queued");
            return None;
        }

        let Some(_permit) = self.guard.try_acquire() else {
            log::warn!("Batch start rejected while an analysis is running");
            self.notifications.info(AnalysisError::Busy.user_message());
            return None;
        };

        let generation = {
            let mut state = self.lock();
            if !state.has_queued() {
                return None;
            }
            state.running = true;
            state.recompute_progress();
            state.generation
        };

        self.notifications.info("🚀 Starting batch analysis...");

        loop {
            let (index, upload) = {
                let mut state = self.lock();
                if state.generation != generation {
                    return None;
                }
                let Some(index) = state.items.iter().position(|i| i.status == BatchStatus::Queued)
                else {
                    break;
                };
                let item = &mut state.items[index];
                item.mark_processing();
                let upload = item.source.to_upload();
                state.current = Some(index);
                (index, upload)
            };

            log::debug!("Batch item {} processing: {}", index + 1, upload.file_name);
            let outcome = self.service.predict(upload).await;

            let mut state = self.lock();
            if state.generation != generation {
                log::warn!("Discarding result for item {} of a cleared batch", index + 1);
                return None;
            }
            let item = &mut state.items[index];
            match outcome {
                Ok(response) => {
                    log::debug!("Batch item {} -> {} ({})", item.name, response.result, response.confidence);
                    item.complete(&response);
                }
                Err(e) => {
                    log::error!("Failed to process {}: {}", item.name, e);
                    item.fail(e.to_string());
                }
            }
            state.recompute_progress();
        }

        let summary = {
            let mut state = self.lock();
            if state.generation != generation {
                return None;
            }
            state.running = false;
            state.current = None;
            state.progress = 100.0;
            BatchSummary::from_items(&state.items)
        };

        log::info!(
            "Batch finished: {} fake, {} real, {} failed of {}",
            summary.fake,
            summary.real,
            summary.failed,
            summary.total
        );
        self.notifications.success(summary.message());
        Some(summary)
    }

    /// Drops all batch state. A request still in flight is left to finish but
    /// its result is discarded.
    pub fn clear(&self) {
        {
            let mut state = self.lock();
            state.generation += 1;
            state.reset();
        }
        log::info!("Batch cleared");
        self.notifications.info("Batch cleared");
    }

    pub fn items(&self) -> Vec<BatchItem> {
        self.lock().items.clone()
    }

    pub fn progress(&self) -> f64 {
        self.lock().progress
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn current_index(&self) -> Option<usize> {
        self.lock().current
    }
}
