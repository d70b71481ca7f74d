use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::analysis::{
    AnalysisError, AnalysisGuard, BatchOrchestrator, MediaError, MediaFile, SingleAnalysisFlow,
    Submission,
};
use crate::auth::{AuthError, UserDirectory};
use crate::config::Config;
use crate::history::{HistoryError, HistoryStore};
use crate::inference::{EngineStatus, InferenceClient, InferenceError, InferenceService, check_engine};
use crate::notify::NotificationCenter;
use crate::storage::{FileStore, KeyValueStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("Inference client error: {0}")]
    Inference(#[from] InferenceError),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("History error: {0}")]
    History(#[from] HistoryError),
    #[error("Media error: {0}")]
    Media(#[from] MediaError),
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub users: usize,
    pub scans: usize,
    pub fake: usize,
}

/// Owns every component and hands out references to them. Built once per
/// process; history is loaded here and nowhere else.
pub struct Scanner {
    config: Config,
    service: Arc<dyn InferenceService>,
    notifications: NotificationCenter,
    history: Arc<HistoryStore>,
    single: Arc<SingleAnalysisFlow>,
    batch: BatchOrchestrator,
    users: UserDirectory,
}

impl Scanner {
    pub fn new(
        config: Config,
        service: Arc<dyn InferenceService>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ScannerError> {
        let notifications = NotificationCenter::new(config.notification_ttl);
        let history = Arc::new(HistoryStore::load(store.clone())?);
        let guard = AnalysisGuard::new();

        let single = Arc::new(SingleAnalysisFlow::new(
            service.clone(),
            history.clone(),
            notifications.clone(),
            guard.clone(),
        ));
        let batch = BatchOrchestrator::new(
            service.clone(),
            single.clone(),
            notifications.clone(),
            guard,
        );

        Ok(Self {
            config,
            service,
            notifications,
            history,
            single,
            batch,
            users: UserDirectory::new(store),
        })
    }

    /// HTTP inference client plus on-disk store under the configured data
    /// directory.
    pub fn from_config(config: Config) -> Result<Self, ScannerError> {
        let service = InferenceClient::new(config.api_url.clone(), config.request_timeout)?;
        let store = FileStore::open(&config.data_dir)?;
        log::info!(
            "Inference engine at {}, data in {}",
            service.base_url(),
            store.root().display()
        );
        Self::new(config, Arc::new(service), Arc::new(store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn single(&self) -> &SingleAnalysisFlow {
        &self.single
    }

    pub fn batch(&self) -> &BatchOrchestrator {
        &self.batch
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub async fn check_engine(&self) -> EngineStatus {
        check_engine(self.service.as_ref(), &self.notifications).await
    }

    /// Reads the files, submits them, and runs the batch when more than one
    /// file was given.
    pub async fn scan_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Submission, ScannerError> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            match MediaFile::read(path).await {
                Ok(file) => files.push(file),
                Err(e) => {
                    log::error!("Failed to read {}: {}", path.display(), e);
                    self.notifications
                        .error(format!("Could not read {}: {}", path.display(), e));
                    return Err(e.into());
                }
            }
        }

        let submission = self.batch.submit(files).await?;
        if let Submission::Batch { .. } = submission {
            self.batch.start().await;
        }
        Ok(submission)
    }

    pub fn clear_history(&self) -> Result<(), ScannerError> {
        if let Err(e) = self.history.clear() {
            log::error!("Failed to clear scan history: {}", e);
            self.notifications
                .error(format!("Failed to clear scan history: {}", e));
            return Err(e.into());
        }
        self.notifications.info("History cleared");
        Ok(())
    }

    /// Totals shown on the admin overview.
    pub fn admin_stats(&self) -> Result<AdminStats, ScannerError> {
        let users = self.users.list_users()?.len();
        let scans = self.history.stats();
        Ok(AdminStats {
            users,
            scans: scans.total,
            fake: scans.fake,
        })
    }

    pub fn shutdown(&self) {
        self.notifications.shutdown();
    }
}
