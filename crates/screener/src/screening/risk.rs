//! Deterministic risk classification over a response set.
//!
//! Two variants exist on purpose: the basic three-indicator form backs the
//! legacy single-shot screening, while the conversational path always uses
//! the extended six-indicator form with its safety-first override.

use super::domain::{AnswerValue, ResponseSet, RiskLevel};

/// Selects which indicator set a fallback assessment counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskModel {
    Basic,
    Extended,
}

impl RiskModel {
    pub fn classify(self, responses: &ResponseSet) -> RiskLevel {
        match self {
            Self::Basic => basic_risk_level(responses),
            Self::Extended => extended_risk_level(responses),
        }
    }
}

/// Three-indicator classification: mood, stress, symptom count.
/// High at two or more indicators.
pub fn basic_risk_level(responses: &ResponseSet) -> RiskLevel {
    let indicators = [
        low_mood(responses),
        high_stress(responses),
        multiple_symptoms(responses),
    ];

    match indicators.iter().filter(|set| **set).count() {
        count if count >= 2 => RiskLevel::High,
        1 => RiskLevel::Moderate,
        _ => RiskLevel::Low,
    }
}

/// Six-indicator classification. An explicit suicidal-ideation flag
/// classifies High unconditionally; otherwise High requires three of the
/// remaining five indicators.
pub fn extended_risk_level(responses: &ResponseSet) -> RiskLevel {
    if suicidal_ideation(responses) {
        return RiskLevel::High;
    }

    let indicators = [
        low_mood(responses),
        high_stress(responses),
        multiple_symptoms(responses),
        sleep_disruption(responses),
        missing_social_support(responses),
    ];

    match indicators.iter().filter(|set| **set).count() {
        count if count >= 3 => RiskLevel::High,
        0 => RiskLevel::Low,
        _ => RiskLevel::Moderate,
    }
}

fn low_mood(responses: &ResponseSet) -> bool {
    match responses.get("mood") {
        Some(AnswerValue::Text(value)) => matches!(value.trim(), "1" | "2"),
        Some(answer) => matches!(answer.as_number(), Some(rating) if rating <= 2.0),
        None => false,
    }
}

fn high_stress(responses: &ResponseSet) -> bool {
    responses
        .get("stress_level")
        .and_then(AnswerValue::as_number)
        .is_some_and(|level| level > 7.0)
}

fn multiple_symptoms(responses: &ResponseSet) -> bool {
    responses
        .get("symptoms")
        .is_some_and(|answer| answer.list_len() > 1)
}

fn suicidal_ideation(responses: &ResponseSet) -> bool {
    answer_matches(responses, "suicidal_thoughts", &["yes"])
}

fn sleep_disruption(responses: &ResponseSet) -> bool {
    answer_matches(responses, "sleep_changes", &["significant"])
}

fn missing_social_support(responses: &ResponseSet) -> bool {
    answer_matches(responses, "social_support", &["none", "no"])
}

fn answer_matches(responses: &ResponseSet, key: &str, accepted: &[&str]) -> bool {
    responses
        .get(key)
        .and_then(AnswerValue::as_text)
        .map(|value| value.trim().to_ascii_lowercase())
        .is_some_and(|value| accepted.contains(&value.as_str()))
}
