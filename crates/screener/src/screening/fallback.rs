//! Deterministic screening outcomes for when the model call is unavailable
//! or returns something unusable. Total: never fails, always yields a fully
//! populated outcome.

use super::domain::{
    AnalysisResult, ConversationHistory, ConversationTurn, ResponseSet, ScreeningOutcome,
    ScreeningStep,
};
use super::risk::RiskModel;
use std::collections::BTreeMap;

const FIRST_TURN_FOLLOW_UPS: [&str; 3] = [
    "How long have you been experiencing these feelings?",
    "How are these feelings affecting your daily life and routines?",
    "Do you have people in your life you can talk to for support?",
];

const GUIDANCE: &str =
    "We recommend speaking with a mental health professional for a comprehensive assessment.";

/// Build a structurally valid outcome without any external call.
///
/// On the first turn the conversation stays open with three generic
/// follow-ups and the current responses are recorded as a user turn. On a
/// continuation the assessment is finalized with the static resource
/// directory, and the history passes through unchanged.
pub fn generate(
    responses: &ResponseSet,
    mut history: ConversationHistory,
    risk_model: RiskModel,
) -> ScreeningStep {
    let risk_level = risk_model.classify(responses);

    if history.is_empty() {
        let serialized = serde_json::to_string(responses).unwrap_or_default();
        history.push(ConversationTurn::user(serialized));

        return ScreeningStep {
            outcome: ScreeningOutcome {
                analysis: AnalysisResult {
                    risk_level,
                    observations: vec![
                        "Initial screening responses recorded".to_string(),
                        "More information is needed to complete the assessment".to_string(),
                    ],
                    recommended_resources: BTreeMap::new(),
                    guidance: String::new(),
                },
                follow_up_questions: FIRST_TURN_FOLLOW_UPS
                    .iter()
                    .map(|question| question.to_string())
                    .collect(),
                conversation_complete: false,
                using_fallback: true,
            },
            history,
        };
    }

    ScreeningStep {
        outcome: ScreeningOutcome {
            analysis: AnalysisResult {
                risk_level,
                observations: vec![
                    "Screening completed with standard assessment".to_string(),
                    "Professional consultation recommended".to_string(),
                ],
                recommended_resources: resource_directory(),
                guidance: GUIDANCE.to_string(),
            },
            follow_up_questions: Vec::new(),
            conversation_complete: true,
            using_fallback: true,
        },
        history,
    }
}

fn resource_directory() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        (
            "Crisis Support".to_string(),
            vec![
                "South Jersey Crisis Helpline: 1-800-273-8255".to_string(),
                "National Suicide Prevention Lifeline: 988".to_string(),
            ],
        ),
        (
            "Local Counseling".to_string(),
            vec![
                "South Jersey Behavioral Health Innovation Center".to_string(),
                "Family Service Association of Southern New Jersey".to_string(),
            ],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::domain::{RiskLevel, TurnRole};
    use serde_json::json;

    fn responses(value: serde_json::Value) -> ResponseSet {
        serde_json::from_value(value).expect("valid response set")
    }

    #[test]
    fn first_turn_stays_open_with_three_questions() {
        let step = generate(
            &responses(json!({ "mood": "3" })),
            Vec::new(),
            RiskModel::Extended,
        );

        assert!(!step.outcome.conversation_complete);
        assert!(step.outcome.using_fallback);
        assert_eq!(step.outcome.follow_up_questions.len(), 3);
        assert!(step.outcome.analysis.recommended_resources.is_empty());
        assert!(step.outcome.analysis.guidance.is_empty());
    }

    #[test]
    fn first_turn_records_the_responses_as_a_user_turn() {
        let payload = responses(json!({ "mood": "2", "stress_level": 9 }));
        let step = generate(&payload, Vec::new(), RiskModel::Extended);

        assert_eq!(step.history.len(), 1);
        assert_eq!(step.history[0].role, TurnRole::User);
        let replayed: ResponseSet =
            serde_json::from_str(&step.history[0].content).expect("turn holds the payload");
        assert_eq!(replayed, payload);
    }

    #[test]
    fn continuation_finalizes_with_the_resource_directory() {
        let history = vec![
            ConversationTurn::user("{\"mood\":\"1\"}"),
            ConversationTurn::assistant("{\"conversation_complete\":false}"),
        ];
        let step = generate(
            &responses(json!({ "sleep_changes": "significant" })),
            history.clone(),
            RiskModel::Extended,
        );

        assert!(step.outcome.conversation_complete);
        assert!(step.outcome.follow_up_questions.is_empty());
        assert!(step
            .outcome
            .analysis
            .recommended_resources
            .contains_key("Crisis Support"));
        assert_eq!(
            step.outcome.analysis.recommended_resources["Local Counseling"].len(),
            2
        );
        assert_eq!(step.outcome.analysis.guidance, GUIDANCE);
        // Continuations never rewrite what was already exchanged.
        assert_eq!(step.history, history);
    }

    #[test]
    fn risk_comes_from_the_selected_heuristic() {
        let payload = responses(json!({ "mood": "1", "stress_level": 9 }));

        let basic = generate(&payload, Vec::new(), RiskModel::Basic);
        assert_eq!(basic.outcome.analysis.risk_level, RiskLevel::High);

        let extended = generate(&payload, Vec::new(), RiskModel::Extended);
        assert_eq!(extended.outcome.analysis.risk_level, RiskLevel::Moderate);
    }
}
