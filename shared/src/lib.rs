use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Verdict returned by the `/predict` endpoint.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verdict {
    Real,
    Fake,
}

/// Which detection layer produced the verdict. Unknown values sent by the
/// server fall back to `AiModel`.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DetectionMethod {
    HashBased,
    HybridAiStats,
    HybridSuspicious,
    #[default]
    #[serde(other)]
    AiModel,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InferenceResponse {
    pub result: Verdict,
    pub confidence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_method: Option<DetectionMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model_confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_score: Option<String>,
}

impl InferenceResponse {
    pub fn is_fake(&self) -> bool {
        self.result == Verdict::Fake
    }
}

/// Error payload the service attaches to non-2xx responses.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// Parses a percentage string such as `"92.3%"` into `92.3`.
pub fn parse_percent(value: &str) -> Option<f64> {
    value.trim().trim_end_matches('%').trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_full_predict_payload() {
        let body = r#"{
            "result": "FAKE",
            "confidence": "87.4%",
            "detection_method": "hybrid_ai_stats",
            "ai_model_confidence": "91.0%",
            "stats_score": "0.712"
        }"#;
        let response: InferenceResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.result, Verdict::Fake);
        assert_eq!(response.detection_method, Some(DetectionMethod::HybridAiStats));
        assert_eq!(response.stats_score.as_deref(), Some("0.712"));
        assert!(response.is_fake());
    }

    #[test]
    fn hash_payload_omits_optional_fields() {
        let body = r#"{"result":"FAKE","confidence":"100.0%","detection_method":"hash_based"}"#;
        let response: InferenceResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.detection_method, Some(DetectionMethod::HashBased));
        assert!(response.ai_model_confidence.is_none());
    }

    #[test]
    fn unknown_detection_method_falls_back_to_ai_model() {
        let body = r#"{"result":"REAL","confidence":"60.0%","detection_method":"frequency_domain"}"#;
        let response: InferenceResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.detection_method, Some(DetectionMethod::AiModel));
    }

    #[test]
    fn rejects_unknown_verdict() {
        let body = r#"{"result":"MAYBE","confidence":"50%"}"#;
        assert!(serde_json::from_str::<InferenceResponse>(body).is_err());
    }

    #[test]
    fn method_names_round_trip_through_strum() {
        assert_eq!(DetectionMethod::HybridSuspicious.to_string(), "hybrid_suspicious");
        assert_eq!(
            DetectionMethod::from_str("hash_based").unwrap(),
            DetectionMethod::HashBased
        );
        assert_eq!(Verdict::Real.to_string(), "REAL");
    }

    #[test]
    fn percent_parsing() {
        assert_eq!(parse_percent("92.3%"), Some(92.3));
        assert_eq!(parse_percent(" 7 % "), Some(7.0));
        assert_eq!(parse_percent("n/a"), None);
    }
}
