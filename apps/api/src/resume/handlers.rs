//! Axum route handlers for résumé upload and per-job enhancement.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::{enhance_prompt, ENHANCE_SYSTEM};
use crate::llm_client::ProviderMode;
use crate::models::job::{JobRow, ResumeRow};
use crate::scoring::breakdown::ScoreBreakdown;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub resume_id: Uuid,
    pub filename: String,
    pub extracted_chars: usize,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    /// Single provider only; compare mode is a scoring concept.
    pub mode: Option<ProviderMode>,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub job_id: Uuid,
    pub enhanced_resume: String,
    pub model_used: String,
}

/// POST /api/v1/resumes
///
/// Multipart upload of a CV. PDF payloads are run through text extraction;
/// plain-text payloads are stored as-is.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .unwrap_or("uploaded_cv.pdf")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((filename, data));
    }

    let (filename, data) = upload
        .ok_or_else(|| AppError::Validation("Missing 'file' field in upload".to_string()))?;

    let body = extract_resume_text(&filename, &data)?;
    if body.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not extract any text from the uploaded file".to_string(),
        ));
    }

    let resume = sqlx::query_as::<_, ResumeRow>(
        "INSERT INTO resumes (id, filename, body) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&filename)
    .bind(&body)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Stored résumé {} ({} chars extracted from {})",
        resume.id,
        resume.body.len(),
        resume.filename
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            resume_id: resume.id,
            filename: resume.filename,
            extracted_chars: resume.body.len(),
        }),
    ))
}

/// GET /api/v1/resumes/current
pub async fn handle_current_resume(
    State(state): State<AppState>,
) -> Result<Json<ResumeRow>, AppError> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes ORDER BY uploaded_at DESC LIMIT 1")
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No résumé uploaded yet".to_string()))
}

/// POST /api/v1/jobs/:id/enhance
///
/// Rewrites the current résumé for one job posting. When the job carries a
/// score breakdown, its enhancement priorities steer the rewrite.
pub async fn handle_enhance_resume(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<EnhanceRequest>,
) -> Result<Json<EnhanceResponse>, AppError> {
    let mode = request.mode.unwrap_or(ProviderMode::OpenAi);
    if mode == ProviderMode::Compare {
        return Err(AppError::Validation(
            "Enhancement uses a single provider; choose openai or gemini".to_string(),
        ));
    }

    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let resume = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes ORDER BY uploaded_at DESC LIMIT 1",
    )
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::Validation("No résumé uploaded. Upload a résumé before enhancing.".to_string())
    })?;

    let priorities = job
        .detailed_score
        .as_ref()
        .map(ScoreBreakdown::from_stored)
        .map(|b| b.cv_enhancement_priority)
        .unwrap_or_default();

    let providers = state.providers.for_mode(mode).map_err(AppError::Llm)?;
    let provider = providers[0];

    let prompt = enhance_prompt(&resume.body, &job.title, &job.description, &priorities);
    let enhanced = provider
        .call_text(ENHANCE_SYSTEM, &prompt)
        .await
        .map_err(AppError::Llm)?;

    Ok(Json(EnhanceResponse {
        job_id,
        enhanced_resume: enhanced,
        model_used: format!("{} ({})", provider.name().to_uppercase(), provider.model_id()),
    }))
}

/// PDF uploads go through text extraction; anything else is treated as
/// UTF-8 text.
fn extract_resume_text(filename: &str, data: &[u8]) -> Result<String, AppError> {
    if filename.to_lowercase().ends_with(".pdf") || data.starts_with(b"%PDF") {
        pdf_extract::extract_text_from_mem(data)
            .map_err(|e| AppError::Validation(format!("Failed to parse PDF: {e}")))
    } else {
        String::from_utf8(data.to_vec())
            .map_err(|_| AppError::Validation("Upload is neither a PDF nor UTF-8 text".to_string()))
    }
}
