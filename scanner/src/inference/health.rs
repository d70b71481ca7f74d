use serde::Serialize;

use super::client::{InferenceError, InferenceService};
use crate::notify::NotificationCenter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    Online,
    Error,
    Offline,
}

/// Calls `GET /health` once and reports the outcome as a notification.
pub async fn check_engine(
    service: &dyn InferenceService,
    notifications: &NotificationCenter,
) -> EngineStatus {
    match service.health().await {
        Ok(()) => {
            log::info!("Neural engine online at {}", service.base_url());
            notifications.success("🚀 Neural Engine Connected");
            EngineStatus::Online
        }
        Err(InferenceError::Transport { url, message }) => {
            log::error!("Engine connectivity check failed: {}", message);
            notifications.error(format!("📡 Connection to {} failed.", url));
            EngineStatus::Offline
        }
        Err(e) => {
            log::warn!("Neural engine returned an error: {}", e);
            notifications.error("⚠️ Neural Engine returned an error");
            EngineStatus::Error
        }
    }
}
