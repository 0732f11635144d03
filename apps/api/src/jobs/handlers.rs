//! Axum route handlers for the job listing CRUD.
//!
//! Thin handlers over the `jobs` table. The job-detail response is cached in
//! Redis; every mutation invalidates the cached entry.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{job_status, JobRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    /// Optional Kanban column filter.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub company: String,
    pub url: Option<String>,
    pub location: Option<String>,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobRow>,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = match &params.status {
        Some(status) => {
            sqlx::query_as::<_, JobRow>(
                "SELECT * FROM jobs WHERE status = $1 ORDER BY created_at DESC",
            )
            .bind(status)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
                .fetch_all(&state.db)
                .await?
        }
    };

    Ok(Json(JobListResponse { jobs }))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if request.description.trim().is_empty() {
        return Err(AppError::Validation(
            "description cannot be empty".to_string(),
        ));
    }

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs (id, title, company, url, location, description, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&request.title)
    .bind(&request.company)
    .bind(&request.url)
    .bind(&request.location)
    .bind(&request.description)
    .bind(job_status::SAVED)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs/:id
///
/// Cache-first: a hit skips the database entirely. Scoring runs and job
/// mutations invalidate the cached entry.
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    if let Some(job) = state.cache.get(job_id).await {
        return Ok(Json(job));
    }

    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    state.cache.put(&job).await;
    Ok(Json(job))
}

/// PATCH /api/v1/jobs/:id/status
///
/// Moves a job between Kanban columns.
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<StatusCode, AppError> {
    if !job_status::is_valid(&request.status) {
        return Err(AppError::Validation(format!(
            "Invalid status '{}'. Expected one of: {}",
            request.status,
            job_status::ALL.join(", ")
        )));
    }

    let result = sqlx::query("UPDATE jobs SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(&request.status)
        .bind(job_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }

    state.cache.invalidate(job_id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }

    state.cache.invalidate(job_id).await;
    Ok(StatusCode::NO_CONTENT)
}
