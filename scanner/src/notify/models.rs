use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type NotificationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(id: NotificationId, message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            id,
            message: message.into(),
            kind,
            created_at: Utc::now(),
        }
    }
}
