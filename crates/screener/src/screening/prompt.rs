//! Instruction text sent to the model. Pure string assembly: the template
//! branches on whether this is the first turn or a continuation of an
//! existing conversation.

use super::domain::{ConversationTurn, ResponseSet, TurnRole};

/// Marker substituted for prior assistant turns when replaying history, so
/// the prompt stays bounded and the model never re-reads its own raw JSON.
pub const ASSISTANT_TURN_PLACEHOLDER: &str = "[assistant reply omitted]";

/// Build the instruction text for the current turn.
pub fn build(responses: &ResponseSet, history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        initial_prompt(responses)
    } else {
        continuation_prompt(responses, history)
    }
}

fn initial_prompt(responses: &ResponseSet) -> String {
    let serialized = serde_json::to_string_pretty(responses).unwrap_or_default();

    let prompt_parts = [
        "You are a compassionate mental health screening assistant specializing in providing supportive, non-diagnostic guidance.",
        "Analyze the following user responses carefully:",
        serialized.as_str(),
        "",
        "Assess the information available so far, decide what is still missing, and ask 1-3 targeted follow-up questions that would most improve the assessment.",
        "",
        "IMPORTANT GUIDELINES:",
        "- Do NOT provide a clinical diagnosis",
        "- Maintain a compassionate, supportive tone",
        "- Recommend professional consultation when appropriate",
        "- Set conversation_complete to true only when sufficient information has been gathered",
        "",
        "Respond with a single syntactically valid JSON object and no surrounding prose, using exactly these keys:",
        "risk_level, observations, follow_up_questions, conversation_complete",
        "",
        "Example:",
        r#"{"risk_level": "Moderate", "observations": ["..."], "follow_up_questions": ["..."], "conversation_complete": false}"#,
    ];

    prompt_parts.join("\n")
}

fn continuation_prompt(responses: &ResponseSet, history: &[ConversationTurn]) -> String {
    let serialized = serde_json::to_string_pretty(responses).unwrap_or_default();
    let replay = redacted_replay(history);

    let prompt_parts = [
        "You are a compassionate mental health screening assistant continuing an in-progress screening conversation.",
        "New responses from the user:",
        serialized.as_str(),
        "",
        "Conversation so far:",
        replay.as_str(),
        "",
        "Integrate the new information with what was already gathered, avoid repeating questions you have already asked, and either continue probing or finalize the assessment.",
        "",
        "IMPORTANT GUIDELINES:",
        "- Do NOT provide a clinical diagnosis",
        "- Maintain a compassionate, supportive tone",
        "- Recommend professional consultation when appropriate",
        "- Set conversation_complete to true only when sufficient information has been gathered",
        "",
        "Respond with a single syntactically valid JSON object and no surrounding prose, using exactly these keys:",
        "risk_level, observations, recommended_resources, guidance, follow_up_questions, conversation_complete",
        "",
        "Example:",
        r#"{"risk_level": "Moderate", "observations": ["..."], "recommended_resources": {"Crisis Support": ["..."]}, "guidance": "...", "follow_up_questions": [], "conversation_complete": true}"#,
    ];

    prompt_parts.join("\n")
}

fn redacted_replay(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| match turn.role {
            TurnRole::User => format!("user: {}", turn.content),
            TurnRole::Assistant => format!("assistant: {ASSISTANT_TURN_PLACEHOLDER}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
