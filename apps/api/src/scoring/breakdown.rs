//! Score breakdown data model.
//!
//! Two shapes live here: the RAW shape (`RawBreakdown`) that tolerates every
//! field-name variant the providers and historical pipeline versions have
//! produced, and the CANONICAL shape (`ScoreBreakdown`) that everything
//! downstream consumes. Only `normalize` converts between them — the
//! presentation layer never sees a raw field name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ────────────────────────────────────────────────────────────────────────────
// Canonical shape
// ────────────────────────────────────────────────────────────────────────────

/// The full multi-dimensional AI-generated fit assessment for one job.
/// Persisted as JSONB on the job row; replaced atomically by a fresh scoring
/// call (last write wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub overall_score: i64,
    pub overall_justification: Option<String>,
    /// Empty means "not yet scored" — distinct from all-zero scores.
    pub sections: Vec<ScoreSection>,
    /// Resolved model identity; "Unknown" when nothing resolvable.
    pub model_used: String,
    pub interview_probability: Option<InterviewProbability>,
    pub fit_assessment_label: Option<String>,
    pub key_risks: Vec<String>,
    pub cv_enhancement_priority: Vec<String>,
    pub gap_analysis: Option<GapAnalysis>,
    pub compare_mode: bool,
    pub best_provider: Option<String>,
    /// Per-provider outcomes of a compare run, in attempted order.
    pub results: Vec<ProviderOutcome>,
    pub scored_at: Option<DateTime<Utc>>,
}

impl ScoreBreakdown {
    /// A breakdown with no sections is treated as "not yet scored".
    pub fn is_scored(&self) -> bool {
        !self.sections.is_empty()
    }

    /// Tolerantly re-ingests a persisted breakdown. Malformed stored data
    /// degrades to an unscored breakdown rather than failing the render.
    pub fn from_stored(value: &Value) -> Self {
        let raw = serde_json::from_value::<RawBreakdown>(value.clone()).unwrap_or_default();
        super::normalize::normalize(raw)
    }
}

/// One evaluation dimension within a breakdown, e.g. "Skills Match".
///
/// Persists with the provider-native `strong_points`/`weak_points` names so
/// stored breakdowns re-ingest through the tolerant reader unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSection {
    pub dimension: String,
    pub score: i64,
    /// In [0,1]; rendered as a rounded whole percentage when present.
    pub weight: Option<f64>,
    #[serde(rename = "strong_points")]
    pub strengths: Vec<String>,
    #[serde(rename = "weak_points")]
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterviewProbability {
    High,
    Medium,
    Low,
}

impl InterviewProbability {
    /// Case-insensitive parse; anything unrecognized is `None` (renders N/A).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

/// Itemized point deductions explaining the distance between a score and 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub gap_breakdown: Vec<GapItem>,
    /// Filled with `100 - overall_score` by the normalizer when absent.
    pub total_gap_percentage: i64,
    pub improvement_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapItem {
    pub category: String,
    pub gap_points: i64,
    pub reason: String,
}

/// One provider's result within a compare run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOutcome {
    pub provider: String,
    pub overall_score: i64,
    pub model_used: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Raw (tolerant) shape
// ────────────────────────────────────────────────────────────────────────────

/// The loosely-typed score response as a provider (or an older pipeline
/// version) produced it. Every field is optional; both names of every
/// dual-named pair are separate fields so the normalizer — not serde — owns
/// the resolution order. Unknown extra fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBreakdown {
    pub overall_score: Option<i64>,
    pub overall_justification: Option<String>,
    #[serde(default)]
    pub sections: Vec<RawSection>,
    pub model_used: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub interview_probability: Option<String>,
    /// Legacy name for `interview_probability`.
    pub interview_probability_model: Option<String>,
    pub fit_assessment_label: Option<String>,
    #[serde(default)]
    pub key_risks: Vec<String>,
    pub cv_enhancement_priority: Option<Vec<String>>,
    /// Legacy plural of `cv_enhancement_priority`.
    pub cv_enhancement_priorities: Option<Vec<String>>,
    pub gap_analysis: Option<RawGapAnalysis>,
    #[serde(default)]
    pub compare_mode: bool,
    pub best_provider: Option<String>,
    pub results: Option<RawResults>,
    pub scored_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSection {
    pub dimension: Option<String>,
    pub score: Option<i64>,
    pub weight: Option<f64>,
    pub strong: Option<Vec<String>>,
    pub strong_points: Option<Vec<String>>,
    pub weak: Option<Vec<String>>,
    pub weak_points: Option<Vec<String>>,
    pub recommendations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGapAnalysis {
    #[serde(default)]
    pub gap_breakdown: Vec<RawGapItem>,
    pub total_gap_percentage: Option<i64>,
    #[serde(default)]
    pub improvement_actions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGapItem {
    pub category: Option<String>,
    pub gap_points: Option<i64>,
    pub reason: Option<String>,
}

/// Compare-run results arrive either as our canonical outcome list or as a
/// legacy provider-name → result mapping. Map iteration order is preserved
/// (serde_json `preserve_order`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawResults {
    List(Vec<RawOutcome>),
    Map(serde_json::Map<String, Value>),
}

/// One tolerantly-read entry of a compare-result list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOutcome {
    pub provider: Option<String>,
    pub overall_score: Option<i64>,
    pub model_used: Option<String>,
    pub model: Option<String>,
}
