//! Breakdown Normalizer — converts a raw, schema-tolerant AI response into
//! the canonical `ScoreBreakdown`.
//!
//! Resolution policy, per field, in priority order:
//! 1. canonical name if present, 2. legacy/alternate name, 3. computed
//! default, 4. absent/empty. Missing optional fields never raise — the
//! provider's output shape is not controlled by this system.
//!
//! This is the single place dual-named fields are resolved. Downstream code
//! (presentation, persistence, compare merging) only ever sees the canonical
//! shape.

use super::breakdown::{
    GapAnalysis, GapItem, InterviewProbability, ProviderOutcome, RawBreakdown, RawGapAnalysis,
    RawResults, RawSection, ScoreBreakdown, ScoreSection,
};

/// Normalizes a raw breakdown. Pure and infallible.
pub fn normalize(raw: RawBreakdown) -> ScoreBreakdown {
    let overall_score = clamp_score(raw.overall_score.unwrap_or(0));

    let sections: Vec<ScoreSection> = raw
        .sections
        .into_iter()
        .filter_map(normalize_section)
        .collect();

    let model_used = resolve_model_identity(raw.model_used, raw.provider, raw.model);

    let interview_probability =
        resolve_probability(raw.interview_probability, raw.interview_probability_model);

    let cv_enhancement_priority = raw
        .cv_enhancement_priority
        .or(raw.cv_enhancement_priorities)
        .unwrap_or_default();

    let gap_analysis = raw
        .gap_analysis
        .map(|g| normalize_gap_analysis(g, overall_score));

    let results = raw.results.map(normalize_results).unwrap_or_default();

    ScoreBreakdown {
        overall_score,
        overall_justification: raw.overall_justification,
        sections,
        model_used,
        interview_probability,
        fit_assessment_label: raw.fit_assessment_label,
        key_risks: raw.key_risks,
        cv_enhancement_priority,
        gap_analysis,
        compare_mode: raw.compare_mode,
        best_provider: raw.best_provider,
        results,
        scored_at: raw.scored_at,
    }
}

/// `model_used` verbatim if set; else `provider` + `model` synthesized as
/// `"<PROVIDER-UPPERCASED> (<model>)"`; else whichever of the two is set;
/// else `"Unknown"`.
fn resolve_model_identity(
    model_used: Option<String>,
    provider: Option<String>,
    model: Option<String>,
) -> String {
    if let Some(used) = non_blank(model_used) {
        return used;
    }
    match (non_blank(provider), non_blank(model)) {
        (Some(provider), Some(model)) => format!("{} ({model})", provider.to_uppercase()),
        (None, Some(model)) => model,
        (Some(provider), None) => provider,
        (None, None) => "Unknown".to_string(),
    }
}

/// Reads either field name; case-folds; unrecognized values become `None`
/// (rendered as the literal badge `N/A`) rather than failing.
fn resolve_probability(
    current: Option<String>,
    legacy: Option<String>,
) -> Option<InterviewProbability> {
    non_blank(current)
        .or(non_blank(legacy))
        .and_then(|v| InterviewProbability::parse(&v))
}

/// Sections missing a dimension label carry nothing renderable and are
/// dropped. First non-missing of each `strong`/`strong_points` and
/// `weak`/`weak_points` pair wins.
fn normalize_section(raw: RawSection) -> Option<ScoreSection> {
    let dimension = non_blank(raw.dimension)?;
    Some(ScoreSection {
        dimension,
        score: clamp_score(raw.score.unwrap_or(0)),
        weight: raw.weight,
        strengths: raw.strong.or(raw.strong_points).unwrap_or_default(),
        weaknesses: raw.weak.or(raw.weak_points).unwrap_or_default(),
        recommendations: raw.recommendations.unwrap_or_default(),
    })
}

fn normalize_gap_analysis(raw: RawGapAnalysis, overall_score: i64) -> GapAnalysis {
    let gap_breakdown = raw
        .gap_breakdown
        .into_iter()
        .filter_map(|item| {
            let category = non_blank(item.category)?;
            Some(GapItem {
                category,
                gap_points: item.gap_points.unwrap_or(0),
                reason: item.reason.unwrap_or_default(),
            })
        })
        .collect();

    GapAnalysis {
        gap_breakdown,
        total_gap_percentage: raw
            .total_gap_percentage
            .unwrap_or(100 - overall_score)
            .clamp(0, 100),
        improvement_actions: raw.improvement_actions,
    }
}

/// Compare results arrive either as the canonical outcome list or as a
/// legacy provider-name → result map. Map insertion order is preserved.
fn normalize_results(raw: RawResults) -> Vec<ProviderOutcome> {
    match raw {
        RawResults::List(outcomes) => outcomes
            .into_iter()
            .map(|o| ProviderOutcome {
                overall_score: clamp_score(o.overall_score.unwrap_or(0)),
                model_used: resolve_model_identity(o.model_used, o.provider.clone(), o.model),
                provider: o.provider.unwrap_or_else(|| "unknown".to_string()),
            })
            .collect(),
        RawResults::Map(map) => map
            .into_iter()
            .map(|(provider, value)| {
                let nested = serde_json::from_value::<RawBreakdown>(value).unwrap_or_default();
                ProviderOutcome {
                    overall_score: clamp_score(nested.overall_score.unwrap_or(0)),
                    model_used: resolve_model_identity(
                        nested.model_used,
                        nested.provider.or_else(|| Some(provider.clone())),
                        nested.model,
                    ),
                    provider,
                }
            })
            .collect(),
    }
}

fn clamp_score(score: i64) -> i64 {
    score.clamp(0, 100)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_json(value: serde_json::Value) -> ScoreBreakdown {
        normalize(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_model_used_verbatim_wins() {
        let b = from_json(json!({
            "overall_score": 80,
            "model_used": "GEMINI (gemini-2.0-flash)",
            "provider": "openai",
            "model": "gpt-4o-mini"
        }));
        assert_eq!(b.model_used, "GEMINI (gemini-2.0-flash)");
    }

    #[test]
    fn test_model_used_synthesized_from_provider_and_model() {
        let b = from_json(json!({
            "overall_score": 80,
            "provider": "gemini",
            "model": "gemini-2.0-flash"
        }));
        assert_eq!(b.model_used, "GEMINI (gemini-2.0-flash)");
    }

    #[test]
    fn test_model_used_falls_back_to_single_field() {
        let only_model = from_json(json!({"model": "gpt-4o-mini"}));
        assert_eq!(only_model.model_used, "gpt-4o-mini");

        let only_provider = from_json(json!({"provider": "openai"}));
        assert_eq!(only_provider.model_used, "openai");
    }

    #[test]
    fn test_model_used_unknown_when_nothing_set() {
        let b = from_json(json!({"overall_score": 10}));
        assert_eq!(b.model_used, "Unknown");
    }

    #[test]
    fn test_probability_prefers_current_name_over_legacy() {
        let b = from_json(json!({
            "interview_probability": "high",
            "interview_probability_model": "LOW"
        }));
        assert_eq!(b.interview_probability, Some(InterviewProbability::High));
    }

    #[test]
    fn test_probability_reads_legacy_name_when_current_absent() {
        let b = from_json(json!({"interview_probability_model": "medium"}));
        assert_eq!(b.interview_probability, Some(InterviewProbability::Medium));
    }

    #[test]
    fn test_probability_unrecognized_becomes_none() {
        let b = from_json(json!({"interview_probability": "almost certain"}));
        assert_eq!(b.interview_probability, None);
    }

    #[test]
    fn test_enhancement_priority_prefers_singular_over_legacy_plural() {
        let b = from_json(json!({
            "cv_enhancement_priority": ["a"],
            "cv_enhancement_priorities": ["b", "c"]
        }));
        assert_eq!(b.cv_enhancement_priority, vec!["a"]);

        let legacy = from_json(json!({"cv_enhancement_priorities": ["b", "c"]}));
        assert_eq!(legacy.cv_enhancement_priority, vec!["b", "c"]);
    }

    #[test]
    fn test_section_strong_wins_over_strong_points() {
        let b = from_json(json!({
            "sections": [{
                "dimension": "Skills",
                "score": 90,
                "strong": ["Rust"],
                "strong_points": ["Python"]
            }]
        }));
        assert_eq!(b.sections[0].strengths, vec!["Rust"]);
    }

    #[test]
    fn test_section_falls_back_to_strong_points() {
        let b = from_json(json!({
            "sections": [{
                "dimension": "Skills",
                "score": 90,
                "strong_points": ["Python"]
            }]
        }));
        assert_eq!(b.sections[0].strengths, vec!["Python"]);
    }

    #[test]
    fn test_section_empty_when_both_evidence_names_absent() {
        let b = from_json(json!({
            "sections": [{"dimension": "Skills", "score": 90}]
        }));
        assert!(b.sections[0].strengths.is_empty());
        assert!(b.sections[0].weaknesses.is_empty());
        assert!(b.sections[0].recommendations.is_empty());
    }

    #[test]
    fn test_section_present_empty_strong_wins_over_populated_fallback() {
        // "First non-missing wins" — an explicitly empty `weak` beats
        // a populated legacy `weak_points`.
        let b = from_json(json!({
            "sections": [{
                "dimension": "Skills",
                "score": 90,
                "weak": [],
                "weak_points": ["Go"]
            }]
        }));
        assert!(b.sections[0].weaknesses.is_empty());
    }

    #[test]
    fn test_section_without_dimension_is_dropped() {
        let b = from_json(json!({
            "sections": [
                {"score": 90},
                {"dimension": "Experience", "score": 70}
            ]
        }));
        assert_eq!(b.sections.len(), 1);
        assert_eq!(b.sections[0].dimension, "Experience");
    }

    #[test]
    fn test_total_gap_percentage_defaults_to_complement_of_overall() {
        let b = from_json(json!({
            "overall_score": 67,
            "gap_analysis": {
                "gap_breakdown": [
                    {"category": "Cloud", "gap_points": 10, "reason": "No GCP"}
                ]
            }
        }));
        assert_eq!(b.gap_analysis.unwrap().total_gap_percentage, 33);
    }

    #[test]
    fn test_total_gap_percentage_explicit_value_kept() {
        let b = from_json(json!({
            "overall_score": 67,
            "gap_analysis": {"gap_breakdown": [], "total_gap_percentage": 21}
        }));
        assert_eq!(b.gap_analysis.unwrap().total_gap_percentage, 21);
    }

    #[test]
    fn test_scores_clamped_to_0_100() {
        let b = from_json(json!({
            "overall_score": 150,
            "sections": [{"dimension": "Skills", "score": -5}]
        }));
        assert_eq!(b.overall_score, 100);
        assert_eq!(b.sections[0].score, 0);
    }

    #[test]
    fn test_empty_sections_is_not_scored() {
        let b = from_json(json!({"overall_score": 80}));
        assert!(!b.is_scored());

        let scored = from_json(json!({
            "overall_score": 0,
            "sections": [{"dimension": "Skills", "score": 0}]
        }));
        // All-zero scores are still "scored" — distinct from missing sections.
        assert!(scored.is_scored());
    }

    #[test]
    fn test_compare_results_map_preserves_insertion_order() {
        let b = from_json(json!({
            "overall_score": 85,
            "compare_mode": true,
            "best_provider": "gemini",
            "results": {
                "openai": {"overall_score": 80, "model": "gpt-4o-mini", "provider": "openai"},
                "gemini": {"overall_score": 85, "model": "gemini-2.0-flash", "provider": "gemini"}
            }
        }));
        let providers: Vec<&str> = b.results.iter().map(|r| r.provider.as_str()).collect();
        assert_eq!(providers, vec!["openai", "gemini"]);
        assert_eq!(b.results[1].overall_score, 85);
        assert_eq!(b.results[0].model_used, "OPENAI (gpt-4o-mini)");
    }

    #[test]
    fn test_compare_results_map_entry_without_provider_field_uses_key() {
        let b = from_json(json!({
            "compare_mode": true,
            "results": {"gemini": {"overall_score": 60, "model": "gemini-2.0-flash"}}
        }));
        assert_eq!(b.results[0].provider, "gemini");
        assert_eq!(b.results[0].model_used, "GEMINI (gemini-2.0-flash)");
    }

    #[test]
    fn test_fully_absent_optionals_degrade_to_defaults() {
        let b = from_json(json!({}));
        assert_eq!(b.overall_score, 0);
        assert!(b.overall_justification.is_none());
        assert!(b.sections.is_empty());
        assert!(b.key_risks.is_empty());
        assert!(b.cv_enhancement_priority.is_empty());
        assert!(b.gap_analysis.is_none());
        assert!(!b.compare_mode);
        assert!(b.results.is_empty());
        assert!(b.scored_at.is_none());
    }
}
