use super::media::MediaError;
use crate::inference::InferenceError;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Inference service unreachable at {url}: {message}")]
    Transport { url: String, message: String },
    #[error("Inference service error: {0}")]
    Service(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Another analysis is already in progress")]
    Busy,
}

impl AnalysisError {
    /// Text of the notification raised for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { url, .. } => format!(
                "AI Engine Offline at {}. Please ensure the server is running.",
                url
            ),
            Self::Service(message) => format!("AI Engine Error: {}", message),
            Self::Validation(message) => message.clone(),
            Self::Busy => "Analysis already in progress, please wait".to_string(),
        }
    }
}

impl From<InferenceError> for AnalysisError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Transport { url, message } => Self::Transport { url, message },
            InferenceError::Service { message, .. } => Self::Service(message),
            InferenceError::InvalidRequest(message) => Self::Validation(message),
        }
    }
}

impl From<MediaError> for AnalysisError {
    fn from(err: MediaError) -> Self {
        Self::Validation(err.to_string())
    }
}
