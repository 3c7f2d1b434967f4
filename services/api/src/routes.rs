use crate::infra::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use screener::error::AppError;
use screener::screening::{
    AnalysisResult, ConversationHistory, ModelClient, ResponseSet, ScreeningService, SessionStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScreeningRequest {
    #[serde(default)]
    pub(crate) session_id: Option<String>,
    pub(crate) responses: ResponseSet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScreeningResponse {
    pub(crate) success: bool,
    pub(crate) session_id: String,
    pub(crate) analysis: AnalysisResult,
    pub(crate) follow_up_questions: Vec<String>,
    pub(crate) is_complete: bool,
    pub(crate) using_fallback: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionStatusResponse {
    pub(crate) success: bool,
    pub(crate) session_id: String,
    pub(crate) is_complete: bool,
    pub(crate) last_updated: DateTime<Utc>,
}

/// Body of the legacy `/submit-screening` contract: sessionless, with the
/// caller optionally carrying its own history between calls.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LegacyScreeningRequest {
    pub(crate) responses: ResponseSet,
    #[serde(default)]
    pub(crate) conversation_history: ConversationHistory,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LegacyScreeningResponse {
    pub(crate) success: bool,
    pub(crate) analysis: AnalysisResult,
    pub(crate) follow_up_questions: Vec<String>,
    pub(crate) conversation_complete: bool,
    pub(crate) using_fallback: bool,
}

pub(crate) fn screening_routes<S, C>(service: Arc<ScreeningService<S, C>>) -> Router
where
    S: SessionStore + 'static,
    C: ModelClient + 'static,
{
    Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/screening",
            axum::routing::post(submit_screening_endpoint::<S, C>),
        )
        .route(
            "/api/v1/screening/:session_id",
            axum::routing::get(session_status_endpoint::<S, C>),
        )
        .route(
            "/submit-screening",
            axum::routing::post(legacy_screening_endpoint::<S, C>),
        )
        .route(
            "/api/v1/test-model",
            axum::routing::get(test_model_endpoint::<S, C>),
        )
        .with_state(service)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn submit_screening_endpoint<S, C>(
    State(service): State<Arc<ScreeningService<S, C>>>,
    payload: Result<Json<ScreeningRequest>, JsonRejection>,
) -> Result<Json<ScreeningResponse>, AppError>
where
    S: SessionStore + 'static,
    C: ModelClient + 'static,
{
    let Json(payload) = payload?;
    let result = service.submit(payload.session_id, payload.responses).await?;

    Ok(Json(ScreeningResponse {
        success: true,
        session_id: result.session_id,
        analysis: result.outcome.analysis,
        follow_up_questions: result.outcome.follow_up_questions,
        is_complete: result.outcome.conversation_complete,
        using_fallback: result.outcome.using_fallback,
    }))
}

pub(crate) async fn session_status_endpoint<S, C>(
    State(service): State<Arc<ScreeningService<S, C>>>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError>
where
    S: SessionStore + 'static,
    C: ModelClient + 'static,
{
    match service.status(&session_id)? {
        Some(status) => Ok(Json(SessionStatusResponse {
            success: true,
            session_id: status.session_id,
            is_complete: status.is_complete,
            last_updated: status.last_updated,
        })
        .into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Session not found or expired" })),
        )
            .into_response()),
    }
}

pub(crate) async fn legacy_screening_endpoint<S, C>(
    State(service): State<Arc<ScreeningService<S, C>>>,
    payload: Result<Json<LegacyScreeningRequest>, JsonRejection>,
) -> Result<Json<LegacyScreeningResponse>, AppError>
where
    S: SessionStore + 'static,
    C: ModelClient + 'static,
{
    let Json(payload) = payload?;
    let outcome = service
        .screen_once(payload.responses, payload.conversation_history)
        .await;

    Ok(Json(LegacyScreeningResponse {
        success: true,
        analysis: outcome.analysis,
        follow_up_questions: outcome.follow_up_questions,
        conversation_complete: outcome.conversation_complete,
        using_fallback: outcome.using_fallback,
    }))
}

/// Connectivity check against the configured model backend. Screening itself
/// degrades to the fallback path, so this is the one place a broken client
/// surfaces directly.
pub(crate) async fn test_model_endpoint<S, C>(
    State(service): State<Arc<ScreeningService<S, C>>>,
) -> Response
where
    S: SessionStore + 'static,
    C: ModelClient + 'static,
{
    match service.model_check().await {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Model API connection successful",
        }))
        .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": format!("Model API connection failed: {}", err),
            })),
        )
            .into_response(),
    }
}
