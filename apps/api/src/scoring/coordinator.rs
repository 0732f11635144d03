//! Scoring Trigger — orchestrates one scoring run for one job.
//!
//! Flow: single-flight guard → load job + current résumé → synthetic
//! progress begins → provider call(s) under timeout → normalize →
//! (compare: pick best) → persist → invalidate cached detail → notify.
//!
//! On failure nothing is written: the previous breakdown (if any) stays
//! visible and a one-shot failure notification carries the error message.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::{scoring_prompt, SCORING_SYSTEM};
use crate::llm_client::{LlmError, ProviderMode, ScoreProvider};
use crate::models::job::{JobRow, ResumeRow};
use crate::scoring::breakdown::{ProviderOutcome, RawBreakdown, ScoreBreakdown};
use crate::scoring::normalize::normalize;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Single-flight guard
// ────────────────────────────────────────────────────────────────────────────

/// At most one scoring request per job may be in flight. A second request is
/// a conflict, not a queued request.
#[derive(Clone, Default)]
pub struct ScoreFlights {
    inner: Arc<Mutex<HashSet<Uuid>>>,
}

impl ScoreFlights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the job for one run. `None` when a run is already pending.
    /// The claim is released when the returned guard drops — on success,
    /// failure, or panic alike.
    pub fn try_begin(&self, job_id: Uuid) -> Option<FlightGuard> {
        let mut set = self.lock();
        if set.insert(job_id) {
            Some(FlightGuard {
                set: self.inner.clone(),
                job_id,
            })
        } else {
            None
        }
    }

    pub fn is_pending(&self, job_id: Uuid) -> bool {
        self.lock().contains(&job_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Uuid>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct FlightGuard {
    set: Arc<Mutex<HashSet<Uuid>>>,
    job_id: Uuid,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.job_id);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring run
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full scoring flow for one job and returns the attached breakdown.
pub async fn score_job(
    state: &AppState,
    job_id: Uuid,
    mode: ProviderMode,
) -> Result<ScoreBreakdown, AppError> {
    let _guard = state.flights.try_begin(job_id).ok_or_else(|| {
        AppError::Conflict(format!("Scoring already in progress for job {job_id}"))
    })?;

    let job = fetch_job(&state.db, job_id).await?;
    let resume = fetch_current_resume(&state.db).await?;
    let providers = state.providers.for_mode(mode).map_err(AppError::Llm)?;

    info!("Scoring job {job_id} ({}) with mode {}", job.title, mode.label());
    state.progress.begin(job_id);

    let result = run_providers(&providers, &job, &resume, state.config.scoring_timeout_secs).await;

    // The indicator completes visually on success and failure alike.
    state.progress.finish(job_id);

    match result {
        Ok(mut breakdown) => {
            breakdown.scored_at = Some(Utc::now());
            persist_breakdown(&state.db, job_id, &breakdown).await?;
            state.cache.invalidate(job_id).await;
            state.notifier.success(format!(
                "Scored \"{}\" — {}/100 via {}",
                job.title,
                breakdown.overall_score,
                provider_names(&breakdown, mode)
            ));
            Ok(breakdown)
        }
        Err(e) => {
            state.notifier.failure(notification_message(&e));
            Err(e)
        }
    }
}

/// Calls the resolved provider(s) and produces one canonical breakdown.
///
/// Compare mode queries both providers concurrently and keeps the higher
/// overall score (tie: first attempted). If exactly one provider fails the
/// run degrades to the surviving result; both failing fails the run.
async fn run_providers(
    providers: &[&dyn ScoreProvider],
    job: &JobRow,
    resume: &ResumeRow,
    timeout_secs: u64,
) -> Result<ScoreBreakdown, AppError> {
    let prompt = scoring_prompt(&resume.body, &job.title, &job.description);

    if let [provider] = providers {
        let breakdown = score_with(*provider, &prompt, timeout_secs).await?;
        return Ok(breakdown);
    }

    // Compare mode: both calls run concurrently; attempted order is kept for
    // the results list.
    let (first, second) = (providers[0], providers[1]);
    let (a, b) = tokio::join!(
        score_with(first, &prompt, timeout_secs),
        score_with(second, &prompt, timeout_secs),
    );

    let mut outcomes: Vec<(&dyn ScoreProvider, ScoreBreakdown)> = Vec::new();
    for (provider, result) in [(first, a), (second, b)] {
        match result {
            Ok(breakdown) => outcomes.push((provider, breakdown)),
            Err(e) => warn!("Compare run: provider {} failed: {e}", provider.name()),
        }
    }

    match outcomes.len() {
        0 => Err(AppError::Llm(LlmError::EmptyContent)),
        _ => Ok(merge_compare(outcomes)),
    }
}

/// One provider call under the configured timeout, normalized, with the
/// provider identity stamped when the response carried none.
async fn score_with(
    provider: &dyn ScoreProvider,
    prompt: &str,
    timeout_secs: u64,
) -> Result<ScoreBreakdown, AppError> {
    let call = provider.call_json(SCORING_SYSTEM, prompt);
    let raw_value: Value = tokio::time::timeout(Duration::from_secs(timeout_secs), call)
        .await
        .map_err(|_| LlmError::TimedOut { secs: timeout_secs })?
        .map_err(AppError::Llm)?;

    let raw: RawBreakdown = serde_json::from_value(raw_value)
        .map_err(|e| AppError::Llm(LlmError::Parse(e)))?;

    let mut breakdown = normalize(raw);
    if breakdown.model_used == "Unknown" {
        breakdown.model_used = format!(
            "{} ({})",
            provider.name().to_uppercase(),
            provider.model_id()
        );
    }
    Ok(breakdown)
}

/// Picks the best outcome and builds the merged compare-mode breakdown.
/// The winner's fields carry over wholesale; the per-provider outcome list
/// records every surviving attempt in attempted order.
fn merge_compare(outcomes: Vec<(&dyn ScoreProvider, ScoreBreakdown)>) -> ScoreBreakdown {
    let results: Vec<ProviderOutcome> = outcomes
        .iter()
        .map(|(provider, breakdown)| ProviderOutcome {
            provider: provider.name().to_string(),
            overall_score: breakdown.overall_score,
            model_used: breakdown.model_used.clone(),
        })
        .collect();

    // Strictly-greater keeps the first attempted on ties.
    let (winner, mut merged) = outcomes
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.1.overall_score > best.1.overall_score {
                candidate
            } else {
                best
            }
        })
        .expect("merge_compare requires at least one outcome");

    merged.compare_mode = true;
    merged.best_provider = Some(winner.name().to_string());
    merged.results = results;
    merged
}

/// Failure notifications carry the error's message verbatim, with a generic
/// fallback when the error has no message. Provider API errors surface the
/// upstream message alone, without the status-code prefix.
fn notification_message(e: &AppError) -> String {
    let text = match e {
        AppError::Llm(LlmError::Api { message, .. }) => message.clone(),
        other => other.to_string(),
    };
    failure_text(&text)
}

fn failure_text(message: &str) -> String {
    if message.trim().is_empty() {
        "Scoring failed. Please try again.".to_string()
    } else {
        message.to_string()
    }
}

fn provider_names(breakdown: &ScoreBreakdown, mode: ProviderMode) -> String {
    if breakdown.compare_mode {
        let names: Vec<&str> = breakdown.results.iter().map(|r| r.provider.as_str()).collect();
        format!("compare ({})", names.join(", "))
    } else {
        mode.label().to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence
// ────────────────────────────────────────────────────────────────────────────

async fn fetch_job(pool: &PgPool, job_id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

async fn fetch_current_resume(pool: &PgPool) -> Result<ResumeRow, AppError> {
    sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes ORDER BY uploaded_at DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        AppError::Validation("No résumé uploaded. Upload a résumé before scoring.".to_string())
    })
}

/// The breakdown column is replaced in a single UPDATE — the old value stays
/// visible until the new one fully replaces it.
async fn persist_breakdown(
    pool: &PgPool,
    job_id: Uuid,
    breakdown: &ScoreBreakdown,
) -> Result<(), AppError> {
    let value = serde_json::to_value(breakdown)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize breakdown: {e}")))?;

    sqlx::query(
        "UPDATE jobs SET detailed_score = $1, scored_at = $2, updated_at = NOW() WHERE id = $3",
    )
    .bind(&value)
    .bind(breakdown.scored_at)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(())
}
