pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::notify::handle_drain_notifications;
use crate::report::handlers as report;
use crate::resume::handlers as resume;
use crate::scoring::handlers as scoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job listing (Kanban board)
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route("/api/v1/jobs", post(jobs::handle_create_job))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route("/api/v1/jobs/:id", delete(jobs::handle_delete_job))
        .route("/api/v1/jobs/:id/status", patch(jobs::handle_update_status))
        // Scoring
        .route("/api/v1/jobs/:id/score", post(scoring::handle_score_job))
        .route(
            "/api/v1/jobs/:id/score/progress",
            get(scoring::handle_score_progress),
        )
        // Score report surfaces
        .route("/api/v1/jobs/:id/report", get(report::handle_analysis_view))
        .route("/api/v1/jobs/:id/panel", get(report::handle_panel_view))
        // Résumé
        .route("/api/v1/resumes", post(resume::handle_upload_resume))
        .route("/api/v1/resumes/current", get(resume::handle_current_resume))
        .route("/api/v1/jobs/:id/enhance", post(resume::handle_enhance_resume))
        // Notifications
        .route("/api/v1/notifications", get(handle_drain_notifications))
        .with_state(state)
}
