use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use shared::{ErrorResponse, InferenceResponse};
use url::Url;

const GENERIC_SERVICE_ERROR: &str = "AI Server responded with an error";

#[derive(Debug, Clone, thiserror::Error)]
pub enum InferenceError {
    #[error("Failed to reach inference service at {url}: {message}")]
    Transport { url: String, message: String },
    #[error("{message}")]
    Service { status: Option<u16>, message: String },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Raw bytes of one media file, as sent in the `file` multipart field.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Base URL as shown to users in error messages.
    fn base_url(&self) -> &str;

    async fn health(&self) -> Result<(), InferenceError>;

    async fn predict(&self, upload: MediaUpload) -> Result<InferenceResponse, InferenceError>;
}

#[derive(Clone)]
pub struct InferenceClient {
    http: Client,
    base: Url,
    display_url: String,
}

impl InferenceClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, InferenceError> {
        let display_url = base.as_str().trim_end_matches('/').to_string();

        let mut base = base;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            http,
            base,
            display_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, InferenceError> {
        self.base
            .join(path)
            .map_err(|e| InferenceError::InvalidRequest(e.to_string()))
    }

    fn transport(&self, err: reqwest::Error) -> InferenceError {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        InferenceError::Transport {
            url: self.display_url.clone(),
            message,
        }
    }
}

#[async_trait]
impl InferenceService for InferenceClient {
    fn base_url(&self) -> &str {
        &self.display_url
    }

    async fn health(&self) -> Result<(), InferenceError> {
        let url = self.endpoint("health")?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        if response.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(InferenceError::Service {
                status: Some(response.status().as_u16()),
                message: format!("Health check returned {}", response.status()),
            })
        }
    }

    async fn predict(&self, upload: MediaUpload) -> Result<InferenceResponse, InferenceError> {
        let url = self.endpoint("predict")?;
        let size = upload.content.len();

        let part = Part::bytes(upload.content)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| InferenceError::InvalidRequest(e.to_string()))?;
        let form = Form::new().part("file", part);

        log::debug!("POST {} ({} bytes, {})", url, size, upload.file_name);
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| GENERIC_SERVICE_ERROR.to_string());
            log::error!("Inference service error: {} - {}", status, body);
            return Err(InferenceError::Service {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body = response.text().await.map_err(|e| self.transport(e))?;
        serde_json::from_str::<InferenceResponse>(&body).map_err(|e| InferenceError::Service {
            status: Some(status.as_u16()),
            message: format!("Failed to parse response: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use shared::{DetectionMethod, Verdict};

    fn client_for(server: &Server) -> InferenceClient {
        let base = Url::parse(&server.url()).unwrap();
        InferenceClient::new(base, Duration::from_secs(5)).unwrap()
    }

    fn upload() -> MediaUpload {
        MediaUpload {
            file_name: "portrait.jpg".into(),
            mime_type: "image/jpeg".into(),
            content: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    #[tokio::test]
    async fn predict_posts_multipart_and_parses_result() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data; boundary=.*".into()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"result":"FAKE","confidence":"88.1%","detection_method":"hybrid_suspicious","ai_model_confidence":"70.2%","stats_score":"0.551"}"#,
            )
            .create_async()
            .await;

        let response = client_for(&server).predict(upload()).await.unwrap();
        mock.assert_async().await;
        assert_eq!(response.result, Verdict::Fake);
        assert_eq!(response.detection_method, Some(DetectionMethod::HybridSuspicious));
    }

    #[tokio::test]
    async fn non_success_status_uses_error_payload() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(500)
            .with_body(r#"{"error":"AI Model not loaded. Check server logs."}"#)
            .create_async()
            .await;

        let err = client_for(&server).predict(upload()).await.unwrap_err();
        match err {
            InferenceError::Service { status, message } => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "AI Model not loaded. Check server logs.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_gets_generic_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let err = client_for(&server).predict(upload()).await.unwrap_err();
        assert_eq!(err.to_string(), GENERIC_SERVICE_ERROR);
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_service_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(200)
            .with_body(r#"{"status":"online"}"#)
            .create_async()
            .await;

        let err = client_for(&server).predict(upload()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Service { .. }));
    }

    #[tokio::test]
    async fn health_maps_status_codes() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(r#"{"status":"online","model_loaded":true}"#)
            .create_async()
            .await;
        assert!(client_for(&server).health().await.is_ok());

        let mut failing = Server::new_async().await;
        failing
            .mock("GET", "/health")
            .with_status(503)
            .create_async()
            .await;
        assert!(matches!(
            client_for(&failing).health().await,
            Err(InferenceError::Service { status: Some(503), .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let base = Url::parse("http://127.0.0.1:9/").unwrap();
        let client = InferenceClient::new(base, Duration::from_secs(2)).unwrap();
        match client.health().await {
            Err(InferenceError::Transport { url, .. }) => assert_eq!(url, "http://127.0.0.1:9"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn base_path_keeps_its_prefix() {
        let base = Url::parse("http://engine.local/api").unwrap();
        let client = InferenceClient::new(base, Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint("predict").unwrap().as_str(),
            "http://engine.local/api/predict"
        );
        assert_eq!(client.base_url(), "http://engine.local/api");
    }
}
