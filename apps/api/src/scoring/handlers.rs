//! Axum route handlers for the Scoring API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::ProviderMode;
use crate::scoring::breakdown::ScoreBreakdown;
use crate::scoring::coordinator::score_job;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub mode: ProviderMode,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub job_id: Uuid,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub job_id: Uuid,
    /// Cosmetic synthetic progress, 0–100. Carries no information about
    /// actual AI-side progress.
    pub progress: u8,
    pub in_flight: bool,
}

/// POST /api/v1/jobs/:id/score
///
/// Runs one scoring call for the job. Rejected with 409 while a previous
/// request for the same job is still pending.
pub async fn handle_score_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let breakdown = score_job(&state, job_id, request.mode).await?;
    Ok(Json(ScoreResponse { job_id, breakdown }))
}

/// GET /api/v1/jobs/:id/score/progress
///
/// Polled by the UI while a scoring request is in flight.
pub async fn handle_score_progress(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Json<ProgressResponse> {
    Json(ProgressResponse {
        job_id,
        progress: state.progress.get(job_id),
        in_flight: state.flights.is_pending(job_id),
    })
}
