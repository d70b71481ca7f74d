use serde::{Deserialize, Serialize};
use shared::{DetectionMethod, InferenceResponse, parse_percent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub title: String,
    pub explanation: String,
    pub technical_details: String,
    pub confidence_reason: String,
}

/// Which narrative applies to an outcome. Resolved before any text is built
/// so every (method, verdict) pair maps to exactly one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeCase {
    ExactMatch,
    HybridFake,
    SuspiciousFake,
    NeuralFake,
    Authentic,
}

impl NarrativeCase {
    pub fn resolve(method: DetectionMethod, is_fake: bool) -> Self {
        match (method, is_fake) {
            (DetectionMethod::HashBased, _) => Self::ExactMatch,
            (DetectionMethod::HybridAiStats, true) => Self::HybridFake,
            (DetectionMethod::HybridSuspicious, true) => Self::SuspiciousFake,
            (DetectionMethod::AiModel, true) => Self::NeuralFake,
            (_, false) => Self::Authentic,
        }
    }
}

/// AI confidence in percent: the model's own figure when reported, else the
/// overall confidence, else zero.
pub fn ai_confidence(response: &InferenceResponse) -> f64 {
    response
        .ai_model_confidence
        .as_deref()
        .and_then(parse_percent)
        .or_else(|| parse_percent(&response.confidence))
        .unwrap_or(0.0)
}

pub fn stats_score(response: &InferenceResponse) -> f64 {
    response
        .stats_score
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

pub fn explain(response: &InferenceResponse, is_fake: bool) -> Narrative {
    let method = response.detection_method.unwrap_or_default();
    let ai = ai_confidence(response);

    match NarrativeCase::resolve(method, is_fake) {
        NarrativeCase::ExactMatch => Narrative {
            title: "🔐 Exact Match Detection".into(),
            explanation: "This image was identified through cryptographic hash matching against our known fake image database. This provides 100% certainty of the result.".into(),
            technical_details: "SHA256 hash comparison confirmed exact binary match with previously verified synthetic content.".into(),
            confidence_reason: "Hash-based identification provides absolute certainty (100%) as it compares exact file signatures.".into(),
        },
        NarrativeCase::HybridFake => Narrative {
            title: "🤖 AI + Statistical Analysis".into(),
            explanation: "Multiple detection layers confirmed synthetic content: neural network classification combined with statistical pattern analysis.".into(),
            technical_details: format!(
                "AI Model: {:.1}% fake confidence. Statistical Score: {:.1}% synthetic pattern match.",
                ai,
                stats_score(response) * 100.0
            ),
            confidence_reason: "Hybrid approach combines deep learning predictions with forensic statistical analysis for reliable detection.".into(),
        },
        NarrativeCase::SuspiciousFake => Narrative {
            title: "⚠️ Suspicious Pattern Detected".into(),
            explanation: "Image shows characteristics consistent with AI generation, though with moderate confidence requiring further verification.".into(),
            technical_details: format!(
                "Statistical analysis detected potential synthetic artifacts. AI model confidence: {:.1}%.",
                ai
            ),
            confidence_reason: "Borderline detection - statistical patterns suggest AI generation but confidence is not absolute.".into(),
        },
        NarrativeCase::NeuralFake => Narrative {
            title: "🧠 Neural Network Classification".into(),
            explanation: "Deep learning model classified this image as synthetically generated based on learned patterns from extensive training data.".into(),
            technical_details: format!(
                "Convolutional neural network analysis showed {:.1}% probability of AI generation.",
                ai
            ),
            confidence_reason: "AI model prediction based on millions of learned parameters identifying synthetic image characteristics.".into(),
        },
        NarrativeCase::Authentic => Narrative {
            title: "✅ Authentic Content Verified".into(),
            explanation: "Image analysis confirms natural, human-captured content with no detectable synthetic artifacts or manipulation.".into(),
            technical_details: format!(
                "AI model confidence: {:.1}% authentic. Statistical analysis confirmed natural image patterns.",
                100.0 - ai
            ),
            confidence_reason: "Multiple verification layers confirmed the absence of AI generation artifacts and manipulation traces.".into(),
        },
    }
}
