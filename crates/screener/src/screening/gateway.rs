//! Outbound model call and the mapping of its reply onto a screening
//! outcome. Every failure mode on this path resolves through the
//! deterministic fallback; the gateway itself never returns an error.

use super::domain::{
    AnalysisResult, ConversationHistory, ConversationTurn, ResponseSet, RiskLevel,
    ScreeningOutcome, ScreeningStep,
};
use super::risk::RiskModel;
use super::{fallback, prompt};
use crate::config::GatewayConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Seam for the outbound completion call so the orchestrator can be
/// exercised with stub clients.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the accumulated turns and return the assistant's raw text.
    async fn complete(&self, messages: &[ConversationTurn]) -> Result<String, ModelClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelClientError {
    #[error("model API key is not configured")]
    MissingApiKey,
    #[error("model request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("model API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model response envelope is missing assistant text")]
    MalformedEnvelope,
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ConversationTurn],
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    content: Vec<EnvelopeBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum EnvelopeBlock {
    Text { text: String },
}

/// HTTP client for the Anthropic Messages API.
pub struct AnthropicClient {
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    http: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, ModelClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            http,
        })
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn complete(&self, messages: &[ConversationTurn]) -> Result<String, ModelClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ModelClientError::MissingApiKey)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).map_err(|_| ModelClientError::MissingApiKey)?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let request = MessageRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages,
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .headers(headers)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: MessageEnvelope = response
            .json()
            .await
            .map_err(|_| ModelClientError::MalformedEnvelope)?;

        envelope
            .content
            .into_iter()
            .map(|block| match block {
                EnvelopeBlock::Text { text } => text,
            })
            .next()
            .ok_or(ModelClientError::MalformedEnvelope)
    }
}

/// Shape the model is instructed to emit. Every field defaults so a reply
/// that parses but omits keys still maps onto a complete outcome.
#[derive(Debug, Default, Deserialize)]
struct ModelReply {
    #[serde(default)]
    risk_level: Option<String>,
    #[serde(default)]
    observations: Vec<String>,
    #[serde(default)]
    recommended_resources: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    guidance: String,
    #[serde(default)]
    follow_up_questions: Vec<String>,
    #[serde(default)]
    conversation_complete: bool,
}

impl ModelReply {
    fn into_outcome(self) -> ScreeningOutcome {
        let risk_level = self
            .risk_level
            .as_deref()
            .map(RiskLevel::from_model_text)
            .unwrap_or(RiskLevel::Moderate);

        // Follow-ups only make sense while the conversation is open.
        let follow_up_questions = if self.conversation_complete {
            Vec::new()
        } else {
            self.follow_up_questions
        };

        ScreeningOutcome {
            analysis: AnalysisResult {
                risk_level,
                observations: self.observations,
                recommended_resources: self.recommended_resources,
                guidance: self.guidance,
            },
            follow_up_questions,
            conversation_complete: self.conversation_complete,
            using_fallback: false,
        }
    }
}

/// Performs one assessment turn against the model and guarantees a
/// well-formed step whatever the upstream does.
pub struct ScreeningGateway<C> {
    client: Arc<C>,
}

impl<C> ScreeningGateway<C>
where
    C: ModelClient,
{
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Connectivity check: send one trivial turn and discard the reply.
    /// Surfaces the typed client error so callers can report why the model
    /// is unreachable.
    pub async fn ping(&self) -> Result<(), ModelClientError> {
        self.client
            .complete(&[ConversationTurn::user("Reply with OK.")])
            .await
            .map(|_| ())
    }

    /// Run one turn: prompt the model with the replayed history plus the new
    /// responses, decode strictly, and fall back on any failure.
    pub async fn assess(
        &self,
        responses: &ResponseSet,
        history: ConversationHistory,
        risk_model: RiskModel,
    ) -> ScreeningStep {
        let instruction = prompt::build(responses, &history);

        let mut messages = history.clone();
        messages.push(ConversationTurn::user(instruction));

        let raw = match self.client.complete(&messages).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "model call failed, using fallback assessment");
                return fallback::generate(responses, history, risk_model);
            }
        };

        let reply: ModelReply = match serde_json::from_str(&raw) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "model reply was not valid JSON, using fallback assessment");
                return fallback::generate(responses, history, risk_model);
            }
        };

        messages.push(ConversationTurn::assistant(raw));

        ScreeningStep {
            outcome: reply.into_outcome(),
            history: messages,
        }
    }
}
