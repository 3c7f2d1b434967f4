//! Entry point for screening submissions: resolves the session, runs the
//! model gateway, and persists the updated conversation.

use super::domain::{ConversationHistory, ResponseSet, ScreeningOutcome, ScreeningSession};
use super::gateway::{ModelClient, ModelClientError, ScreeningGateway};
use super::risk::RiskModel;
use super::session::{SessionStore, SessionStoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Orchestrates one screening turn end to end. The model-call path can never
/// fail a submission; only the session store can surface an error here.
pub struct ScreeningService<S, C> {
    store: Arc<S>,
    gateway: ScreeningGateway<C>,
}

/// What one submission hands back to the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub session_id: String,
    pub outcome: ScreeningOutcome,
}

/// Read-only view for the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub is_complete: bool,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error("session store error: {0}")]
    Store(#[from] SessionStoreError),
}

impl<S, C> ScreeningService<S, C>
where
    S: SessionStore + 'static,
    C: ModelClient + 'static,
{
    pub fn new(store: Arc<S>, client: Arc<C>) -> Self {
        Self {
            store,
            gateway: ScreeningGateway::new(client),
        }
    }

    /// Start or continue a screening conversation. An unknown or absent
    /// session id starts a fresh session rather than erroring.
    pub async fn submit(
        &self,
        session_id: Option<String>,
        responses: ResponseSet,
    ) -> Result<SubmissionResult, ScreeningServiceError> {
        let mut session = match session_id {
            Some(id) => self.store.get(&id)?.unwrap_or_else(ScreeningSession::new),
            None => ScreeningSession::new(),
        };

        let history = std::mem::take(&mut session.history);
        let step = self
            .gateway
            .assess(&responses, history, RiskModel::Extended)
            .await;

        session.history = step.history;
        session.is_complete = step.outcome.conversation_complete;
        session.last_updated = Utc::now();

        info!(
            session_id = %session.id,
            complete = session.is_complete,
            fallback = step.outcome.using_fallback,
            "screening turn processed"
        );

        let session_id = session.id.clone();
        self.store.put(session)?;

        Ok(SubmissionResult {
            session_id,
            outcome: step.outcome,
        })
    }

    /// Status lookup for an existing session; `None` once expired or never
    /// known, which the HTTP layer turns into a 404.
    pub fn status(&self, id: &str) -> Result<Option<SessionStatus>, ScreeningServiceError> {
        Ok(self.store.get(id)?.map(|session| SessionStatus {
            session_id: session.id,
            is_complete: session.is_complete,
            last_updated: session.last_updated,
        }))
    }

    /// Check whether the configured model client can complete a request.
    pub async fn model_check(&self) -> Result<(), ModelClientError> {
        self.gateway.ping().await
    }

    /// Legacy single-shot contract: no session, caller-supplied history, and
    /// the basic risk variant when the fallback has to answer.
    pub async fn screen_once(
        &self,
        responses: ResponseSet,
        history: ConversationHistory,
    ) -> ScreeningOutcome {
        self.gateway
            .assess(&responses, history, RiskModel::Basic)
            .await
            .outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::domain::{ConversationTurn, RiskLevel};
    use crate::screening::gateway::ModelClientError;
    use crate::screening::session::InMemorySessionStore;
    use async_trait::async_trait;
    use serde_json::json;

    struct DownClient;

    #[async_trait]
    impl ModelClient for DownClient {
        async fn complete(&self, _: &[ConversationTurn]) -> Result<String, ModelClientError> {
            Err(ModelClientError::MissingApiKey)
        }
    }

    fn service_with_store() -> (
        ScreeningService<InMemorySessionStore, DownClient>,
        Arc<InMemorySessionStore>,
    ) {
        let store = Arc::new(InMemorySessionStore::with_ttl_hours(24));
        (
            ScreeningService::new(store.clone(), Arc::new(DownClient)),
            store,
        )
    }

    fn service() -> ScreeningService<InMemorySessionStore, DownClient> {
        service_with_store().0
    }

    fn responses(value: serde_json::Value) -> ResponseSet {
        serde_json::from_value(value).expect("valid response set")
    }

    #[tokio::test]
    async fn submissions_accumulate_history_across_turns() {
        let (service, store) = service_with_store();

        let first = service
            .submit(None, responses(json!({ "mood": "2" })))
            .await
            .expect("first turn succeeds");
        let status = service
            .status(&first.session_id)
            .expect("status lookup succeeds")
            .expect("session exists");
        assert!(!status.is_complete);
        let first_len = store
            .get(&first.session_id)
            .expect("store get succeeds")
            .expect("session stored")
            .history
            .len();

        let second = service
            .submit(
                Some(first.session_id.clone()),
                responses(json!({ "sleep_changes": "significant" })),
            )
            .await
            .expect("second turn succeeds");

        assert_eq!(second.session_id, first.session_id);
        assert!(second.outcome.conversation_complete);
        assert!(second.outcome.follow_up_questions.is_empty());

        let second_len = store
            .get(&second.session_id)
            .expect("store get succeeds")
            .expect("session stored")
            .history
            .len();
        assert!(second_len >= first_len);
        assert_eq!(first.outcome.follow_up_questions.len(), 3);
    }

    #[tokio::test]
    async fn unknown_session_id_starts_fresh_instead_of_erroring() {
        let service = service();
        let result = service
            .submit(
                Some("definitely-not-a-session".to_string()),
                responses(json!({ "mood": "3" })),
            )
            .await
            .expect("submission succeeds");

        assert_ne!(result.session_id, "definitely-not-a-session");
        assert!(!result.outcome.conversation_complete);
    }

    #[tokio::test]
    async fn status_returns_none_for_expired_or_unknown_sessions() {
        let service = service();
        assert!(service
            .status("missing")
            .expect("status lookup succeeds")
            .is_none());
    }

    #[tokio::test]
    async fn legacy_single_shot_uses_the_basic_risk_variant() {
        let service = service();
        // Two indicators: High under basic, only Moderate under extended.
        let outcome = service
            .screen_once(responses(json!({ "mood": "1", "stress_level": 9 })), Vec::new())
            .await;

        assert!(outcome.using_fallback);
        assert_eq!(outcome.analysis.risk_level, RiskLevel::High);
    }
}
