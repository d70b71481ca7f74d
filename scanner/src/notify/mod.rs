pub mod models;
pub mod notification_center;

pub use models::{Notification, NotificationId, NotificationKind};
pub use notification_center::{NotificationCenter, MAX_NOTIFICATIONS};
