use std::sync::Arc;

use serde::Serialize;
use shared::{DetectionMethod, InferenceResponse, Verdict};

use super::media::MediaFile;
use crate::explain::Narrative;
use crate::history::ScanRecord;
use crate::ids::generate_item_id;

pub const FAILED_CONFIDENCE: &str = "0.0%";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl BatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn can_advance_to(self, next: BatchStatus) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanResult {
    Real,
    Fake,
    Error,
}

impl From<Verdict> for ScanResult {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Real => Self::Real,
            Verdict::Fake => Self::Fake,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub id: String,
    #[serde(skip)]
    pub source: Arc<MediaFile>,
    pub name: String,
    pub size_label: String,
    pub status: BatchStatus,
    pub result: Option<ScanResult>,
    pub confidence: Option<String>,
    pub detection_method: Option<DetectionMethod>,
    pub ai_model_confidence: Option<String>,
    pub stats_score: Option<String>,
    pub error: Option<String>,
}

impl BatchItem {
    pub fn queued(file: MediaFile) -> Self {
        Self {
            id: generate_item_id(),
            name: file.name.clone(),
            size_label: file.size_label(),
            source: Arc::new(file),
            status: BatchStatus::Queued,
            result: None,
            confidence: None,
            detection_method: None,
            ai_model_confidence: None,
            stats_score: None,
            error: None,
        }
    }

    fn advance(&mut self, next: BatchStatus) -> bool {
        if !self.status.can_advance_to(next) {
            log::warn!(
                "Ignoring transition {:?} -> {:?} for batch item {}",
                self.status,
                next,
                self.name
            );
            return false;
        }
        self.status = next;
        true
    }

    pub fn mark_processing(&mut self) -> bool {
        self.advance(BatchStatus::Processing)
    }

    pub fn complete(&mut self, response: &InferenceResponse) -> bool {
        if !self.advance(BatchStatus::Completed) {
            return false;
        }
        self.result = Some(response.result.into());
        self.confidence = Some(response.confidence.clone());
        self.detection_method = response.detection_method;
        self.ai_model_confidence = response.ai_model_confidence.clone();
        self.stats_score = response.stats_score.clone();
        true
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        if !self.advance(BatchStatus::Failed) {
            return false;
        }
        self.result = Some(ScanResult::Error);
        self.confidence = Some(FAILED_CONFIDENCE.to_string());
        self.error = Some(reason.into());
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub fake: usize,
    pub real: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_items(items: &[BatchItem]) -> Self {
        let count = |wanted: ScanResult| items.iter().filter(|i| i.result == Some(wanted)).count();
        Self {
            total: items.len(),
            fake: count(ScanResult::Fake),
            real: count(ScanResult::Real),
            failed: count(ScanResult::Error),
        }
    }

    pub fn message(&self) -> String {
        format!(
            "✅ Batch complete! {} FAKE, {} REAL out of {} images",
            self.fake, self.real, self.total
        )
    }
}

/// Detailed outcome of one single analysis, as shown on the metrics view.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub record: ScanRecord,
    pub detection_method: DetectionMethod,
    pub ai_model_confidence: String,
    pub stats_score: String,
    pub narrative: Narrative,
}

impl AnalysisReport {
    pub fn new(record: ScanRecord, response: &InferenceResponse, narrative: Narrative) -> Self {
        Self {
            detection_method: response.detection_method.unwrap_or_default(),
            ai_model_confidence: response
                .ai_model_confidence
                .clone()
                .unwrap_or_else(|| response.confidence.clone()),
            stats_score: response
                .stats_score
                .clone()
                .unwrap_or_else(|| "0.000".to_string()),
            record,
            narrative,
        }
    }

    pub fn is_fake(&self) -> bool {
        self.record.result == Verdict::Fake
    }
}
