pub mod analysis;
pub mod app;
pub mod auth;
pub mod config;
pub mod explain;
pub mod history;
pub mod ids;
pub mod inference;
pub mod notify;
pub mod storage;

pub use app::{AdminStats, Scanner, ScannerError};
pub use config::Config;
