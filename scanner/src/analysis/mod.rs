pub mod batch_orchestrator;
pub mod error;
pub mod guard;
pub mod media;
pub mod models;
pub mod single_flow;

pub use batch_orchestrator::{BatchOrchestrator, Submission};
pub use error::AnalysisError;
pub use guard::{AnalysisGuard, AnalysisPermit};
pub use media::{MediaError, MediaFile, MediaRef};
pub use models::{AnalysisReport, BatchItem, BatchStatus, BatchSummary, ScanResult};
pub use single_flow::SingleAnalysisFlow;
