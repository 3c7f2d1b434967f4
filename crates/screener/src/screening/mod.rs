pub mod domain;
pub mod fallback;
pub mod gateway;
pub mod prompt;
pub mod risk;
pub mod session;
pub mod service;

pub use domain::{
    AnalysisResult, AnswerValue, ConversationHistory, ConversationTurn, ResponseSet, RiskLevel,
    ScreeningOutcome, ScreeningSession, TurnRole,
};
pub use gateway::{AnthropicClient, ModelClient, ModelClientError, ScreeningGateway};
pub use risk::RiskModel;
pub use service::{ScreeningService, SessionStatus, SubmissionResult};
pub use session::{InMemorySessionStore, SessionStore, SessionStoreError};
