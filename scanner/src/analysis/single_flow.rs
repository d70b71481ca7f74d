use std::sync::{Arc, Mutex};

use shared::InferenceResponse;

use super::error::AnalysisError;
use super::guard::AnalysisGuard;
use super::media::MediaRef;
use super::models::AnalysisReport;
use crate::explain::explain;
use crate::history::{HistoryStore, ScanRecord};
use crate::inference::InferenceService;
use crate::notify::NotificationCenter;

const UPLOAD_STEM: &str = "analysis_target";

/// Runs one media item through the inference service and routes the result
/// to history, notifications and the explanation engine.
pub struct SingleAnalysisFlow {
    service: Arc<dyn InferenceService>,
    history: Arc<HistoryStore>,
    notifications: NotificationCenter,
    guard: AnalysisGuard,
    last_report: Mutex<Option<AnalysisReport>>,
}

impl SingleAnalysisFlow {
    pub fn new(
        service: Arc<dyn InferenceService>,
        history: Arc<HistoryStore>,
        notifications: NotificationCenter,
        guard: AnalysisGuard,
    ) -> Self {
        Self {
            service,
            history,
            notifications,
            guard,
            last_report: Mutex::new(None),
        }
    }

    pub fn last_report(&self) -> Option<AnalysisReport> {
        self.last_report
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub async fn analyze(&self, media: Option<MediaRef>) -> Result<AnalysisReport, AnalysisError> {
        let Some(media) = media else {
            return Err(self.reject(AnalysisError::Validation(
                "Please select or capture media first".to_string(),
            )));
        };

        let upload = match media.to_upload(UPLOAD_STEM) {
            Ok(upload) => upload,
            Err(e) => {
                log::warn!("Rejected undecodable media reference: {}", e);
                return Err(self.reject(AnalysisError::Validation(format!(
                    "Unable to read the selected media: {}",
                    e
                ))));
            }
        };

        let Some(_permit) = self.guard.try_acquire() else {
            log::warn!("Single analysis requested while another analysis is running");
            return Err(self.reject(AnalysisError::Busy));
        };

        self.notifications.info("Connecting to AI Neural Engine...");
        log::info!("Submitting {} ({} bytes) for analysis", upload.file_name, upload.content.len());

        match self.service.predict(upload).await {
            Ok(response) => Ok(self.record_success(media, response)),
            Err(e) => {
                log::error!("Analysis failed: {}", e);
                Err(self.reject(e.into()))
            }
        }
    }

    fn reject(&self, err: AnalysisError) -> AnalysisError {
        match err {
            AnalysisError::Busy => self.notifications.info(err.user_message()),
            _ => self.notifications.error(err.user_message()),
        };
        err
    }

    fn record_success(&self, media: MediaRef, response: InferenceResponse) -> AnalysisReport {
        let is_fake = response.is_fake();
        let record = ScanRecord::new(
            self.history.len() + 1,
            response.result,
            response.confidence.clone(),
            media.into_string(),
        );
        let saved = self.history.append(record.clone());

        let narrative = explain(&response, is_fake);
        let report = AnalysisReport::new(record, &response, narrative);
        log::info!(
            "{} classified {} ({}) via {}",
            report.record.name,
            report.record.result,
            report.record.confidence,
            report.detection_method
        );

        *self
            .last_report
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(report.clone());

        if is_fake {
            self.notifications
                .error(format!("🚨 DANGER: {} SYNTHETIC PROBABILITY", response.confidence));
        } else {
            self.notifications
                .success(format!("🎉 VERIFIED: {} AUTHENTICITY SCORE", response.confidence));
        }

        if let Err(e) = saved {
            log::error!("Failed to persist scan history: {}", e);
            self.notifications.error(format!("Failed to save scan history: {}", e));
        }

        report
    }
}
