//! Axum route handlers for the two report surfaces.
//!
//! The full-page analysis view and the slide-over detail panel embed the
//! same `build_report` output; only the surrounding job fields differ.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::report::view::{build_report, ExpandState, ScoreReport};
use crate::scoring::breakdown::ScoreBreakdown;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExpandQuery {
    /// Index of the section to render expanded; absent = all collapsed.
    pub expanded: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisView {
    pub job_id: Uuid,
    pub title: String,
    pub company: String,
    pub report: ScoreReport,
}

#[derive(Debug, Serialize)]
pub struct PanelView {
    pub job_id: Uuid,
    pub title: String,
    pub status: String,
    pub report: ScoreReport,
}

/// GET /api/v1/jobs/:id/report
///
/// Full-page analysis view.
pub async fn handle_analysis_view(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<ExpandQuery>,
) -> Result<Json<AnalysisView>, AppError> {
    let job = fetch_job(&state, job_id).await?;
    let report = report_for(&job, params.expanded);
    Ok(Json(AnalysisView {
        job_id: job.id,
        title: job.title,
        company: job.company,
        report,
    }))
}

/// GET /api/v1/jobs/:id/panel
///
/// Slide-over detail panel — embeds the identical report.
pub async fn handle_panel_view(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<ExpandQuery>,
) -> Result<Json<PanelView>, AppError> {
    let job = fetch_job(&state, job_id).await?;
    let report = report_for(&job, params.expanded);
    Ok(Json(PanelView {
        job_id: job.id,
        title: job.title,
        status: job.status,
        report,
    }))
}

fn report_for(job: &JobRow, expanded: Option<usize>) -> ScoreReport {
    let breakdown = job.detailed_score.as_ref().map(ScoreBreakdown::from_stored);
    build_report(breakdown.as_ref(), ExpandState::with_expanded(expanded))
}

async fn fetch_job(state: &AppState, job_id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn job_with_score(detailed_score: Option<serde_json::Value>) -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            url: None,
            location: None,
            description: "Rust backend role".to_string(),
            status: "saved".to_string(),
            detailed_score,
            scored_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_report_for_unscored_job() {
        let job = job_with_score(None);
        assert_eq!(report_for(&job, None), ScoreReport::Unscored);
    }

    #[test]
    fn test_report_for_scored_job_uses_stored_breakdown() {
        let job = job_with_score(Some(json!({
            "overall_score": 77,
            "sections": [{"dimension": "Skills", "score": 77}]
        })));
        match report_for(&job, None) {
            ScoreReport::Scored(report) => assert_eq!(report.hero.overall_score, 77),
            ScoreReport::Unscored => panic!("expected scored report"),
        }
    }

    #[test]
    fn test_report_for_malformed_stored_value_degrades_to_unscored() {
        let job = job_with_score(Some(json!([1, 2, 3])));
        assert_eq!(report_for(&job, None), ScoreReport::Unscored);
    }
}
