pub mod client;
pub mod health;

pub use client::{InferenceClient, InferenceError, InferenceService, MediaUpload};
pub use health::{EngineStatus, check_engine};
