//! HTTP API endpoint handlers.
//!
//! WebSocket ルータと同じユースケースを消費する第二の配信経路。
//! 状態を変更するエンドポイントは WebSocket 側と同じブロードキャストを流す。

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{
        CreatePollRequest, HistoryRecordDto, PollDetailDto, PollResultsResponse,
    },
    ui::{
        broadcast::{broadcast_poll_created, broadcast_poll_ended, broadcast_poll_started},
        deadline::arm_poll_deadline,
        state::AppState,
    },
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the current poll snapshot
pub async fn get_poll(State(state): State<Arc<AppState>>) -> Result<Json<PollDetailDto>, StatusCode> {
    let (poll, _stats) = state.snapshot_usecase.poll_status().await;
    match poll {
        Some(overview) => Ok(Json(overview.into())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Get the current poll results
pub async fn get_poll_results(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PollResultsResponse>, StatusCode> {
    let (results, _stats) = state.snapshot_usecase.results().await;
    match results {
        Some(results) => Ok(Json(results.into())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Get the finalized poll history
pub async fn get_poll_history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryRecordDto>> {
    let records = state.snapshot_usecase.poll_history().await;
    Json(records.into_iter().map(Into::into).collect())
}

/// Create a new poll (in waiting state)
///
/// WebSocket の create-poll と違って回答受付は自動で始めない。
/// 開始は POST /api/poll/start で行う。
pub async fn create_poll(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePollRequest>,
) -> Result<(StatusCode, Json<PollDetailDto>), StatusCode> {
    match state
        .create_poll_usecase
        .execute(request.question, request.options, request.time_limit)
        .await
    {
        Ok(created) => {
            state.poll_deadline.cancel();
            broadcast_poll_created(&state, &created).await;
            Ok((StatusCode::CREATED, Json(created.overview.into())))
        }
        Err(e) => {
            tracing::warn!("Failed to create poll over HTTP: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

/// Start accepting responses on the current poll
pub async fn start_poll(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PollDetailDto>, StatusCode> {
    match state.start_poll_usecase.execute().await {
        Ok(started) => {
            arm_poll_deadline(
                state.clone(),
                started.overview.epoch,
                started.overview.time_limit_secs,
            );
            broadcast_poll_started(&state, &started).await;
            Ok(Json(started.overview.into()))
        }
        Err(e) => {
            tracing::warn!("Failed to start poll over HTTP: {}", e);
            Err(StatusCode::CONFLICT)
        }
    }
}

/// End the current poll manually
pub async fn end_poll(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PollResultsResponse>, StatusCode> {
    match state.end_poll_usecase.execute(None).await {
        Ok(ended) => {
            state.poll_deadline.cancel();
            broadcast_poll_ended(&state, &ended).await;
            Ok(Json(ended.results.clone().into()))
        }
        Err(e) => {
            tracing::warn!("Failed to end poll over HTTP: {}", e);
            Err(StatusCode::CONFLICT)
        }
    }
}
