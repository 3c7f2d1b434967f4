use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One answer from the screening form. Forms submit free text, numeric
/// ratings, and multi-select lists, so all three shapes are accepted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl AnswerValue {
    /// Numeric view of the answer. Ratings arrive either as numbers or as
    /// numeric strings depending on the form frontend.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(value) => Some(*value),
            AnswerValue::Text(value) => value.trim().parse().ok(),
            AnswerValue::List(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn list_len(&self) -> usize {
        match self {
            AnswerValue::List(items) => items.len(),
            _ => 0,
        }
    }
}

/// Flat mapping of question id to answer, supplied fresh on every call.
pub type ResponseSet = BTreeMap<String, AnswerValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One message exchanged with the model. The sequence alternates user and
/// assistant turns, starting with user, and is only ever appended to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

pub type ConversationHistory = Vec<ConversationTurn>;

/// Coarse classification produced by the risk heuristic and by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }

    /// Lenient mapping for model output; anything unrecognized falls to the
    /// Moderate default rather than failing the decode.
    pub fn from_model_text(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Moderate,
        }
    }
}

/// Assessment payload. Every field has a defined default, so downstream
/// consumers never see a partial result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub risk_level: RiskLevel,
    pub observations: Vec<String>,
    pub recommended_resources: BTreeMap<String, Vec<String>>,
    pub guidance: String,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            risk_level: RiskLevel::Moderate,
            observations: Vec::new(),
            recommended_resources: BTreeMap::new(),
            guidance: String::new(),
        }
    }
}

/// Result of one orchestration step. `follow_up_questions` is non-empty only
/// while the conversation is still open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningOutcome {
    pub analysis: AnalysisResult,
    pub follow_up_questions: Vec<String>,
    pub conversation_complete: bool,
    pub using_fallback: bool,
}

/// One screening conversation plus the updated history it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningStep {
    pub outcome: ScreeningOutcome,
    pub history: ConversationHistory,
}

/// Resumable multi-turn screening, owned by the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningSession {
    pub id: String,
    pub history: ConversationHistory,
    pub is_complete: bool,
    pub last_updated: DateTime<Utc>,
}

impl ScreeningSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            history: Vec::new(),
            is_complete: false,
            last_updated: Utc::now(),
        }
    }
}

impl Default for ScreeningSession {
    fn default() -> Self {
        Self::new()
    }
}
