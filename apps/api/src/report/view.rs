//! Score report view model.
//!
//! `build_report` is a pure function of the canonical breakdown and the
//! expand index: identical inputs produce identical output. Optional fields
//! degrade to omitted blocks or placeholders — a partial breakdown never
//! fails a render.

use serde::Serialize;

use crate::scoring::breakdown::{ScoreBreakdown, ScoreSection};

/// Color band for a 0–100 score. One canonical threshold table, applied to
/// the hero and every section bar alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Excellent,
    Great,
    Good,
    Partial,
    Weak,
}

impl ScoreBand {
    pub fn for_score(score: i64) -> Self {
        match score {
            s if s >= 80 => Self::Excellent,
            s if s >= 65 => Self::Great,
            s if s >= 50 => Self::Good,
            s if s >= 30 => Self::Partial,
            _ => Self::Weak,
        }
    }

    /// CSS class for the gradient-coded color band.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Excellent => "score-excellent",
            Self::Great => "score-great",
            Self::Good => "score-good",
            Self::Partial => "score-partial",
            Self::Weak => "score-weak",
        }
    }
}

/// Which section (if any) is expanded. At most one at a time; toggling the
/// expanded section collapses it. Resets naturally per mount — the state is
/// owned by the caller, never global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandState {
    expanded: Option<usize>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State with one section already expanded (e.g. from a query param).
    pub fn with_expanded(index: Option<usize>) -> Self {
        Self { expanded: index }
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    pub fn toggle(&mut self, index: usize) {
        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
    }
}

// ────────────────────────────────────────────────────────────────────────────
// View model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScoreReport {
    /// The job has no breakdown yet — a defined empty/call-to-action state.
    Unscored,
    Scored(ScoredReport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredReport {
    pub hero: Hero,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    pub sections: Vec<SectionRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_risks: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enhancement_priorities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<GapView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare: Option<CompareView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scored_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hero {
    pub overall_score: i64,
    pub band: ScoreBand,
    pub band_class: &'static str,
    /// `HIGH` / `MEDIUM` / `LOW`, or the literal `N/A`.
    pub interview_probability: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_label: Option<String>,
    pub model_used: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionRow {
    pub index: usize,
    pub dimension: String,
    pub score: i64,
    pub band: ScoreBand,
    /// Rounded whole percentage; omitted entirely when no weight is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_percent: Option<u8>,
    pub expanded: bool,
    /// Present only while the row is expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<SectionDetail>,
}

/// Sub-blocks of an expanded section. Each is omitted when its resolved
/// list is empty — never shown empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strengths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapView {
    pub total_gap_percentage: i64,
    pub items: Vec<GapItemView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub improvement_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapItemView {
    pub category: String,
    pub gap_points: i64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareView {
    /// Best provider name, uppercased for the summary line.
    pub best_provider: String,
    /// Providers queried, joined `", "` in stored order.
    pub providers: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Builds the report for one job. `None` (or a breakdown with no sections)
/// renders the unscored state and performs no further computation.
pub fn build_report(breakdown: Option<&ScoreBreakdown>, expand: ExpandState) -> ScoreReport {
    let breakdown = match breakdown {
        Some(b) if b.is_scored() => b,
        _ => return ScoreReport::Unscored,
    };
    let expanded = expand.expanded();

    let hero = Hero {
        overall_score: breakdown.overall_score,
        band: ScoreBand::for_score(breakdown.overall_score),
        band_class: ScoreBand::for_score(breakdown.overall_score).css_class(),
        interview_probability: breakdown
            .interview_probability
            .map(|p| p.badge().to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        fit_label: breakdown.fit_assessment_label.clone(),
        model_used: breakdown.model_used.clone(),
    };

    let sections = breakdown
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| build_section_row(index, section, expanded == Some(index)))
        .collect();

    // The gap block renders only when there are itemized deductions,
    // regardless of other gap fields being present.
    let gap = breakdown
        .gap_analysis
        .as_ref()
        .filter(|g| !g.gap_breakdown.is_empty())
        .map(|g| GapView {
            total_gap_percentage: g.total_gap_percentage,
            items: g
                .gap_breakdown
                .iter()
                .map(|item| GapItemView {
                    category: item.category.clone(),
                    gap_points: item.gap_points,
                    reason: item.reason.clone(),
                })
                .collect(),
            improvement_actions: g.improvement_actions.clone(),
        });

    let compare = breakdown.compare_mode.then(|| CompareView {
        best_provider: breakdown
            .best_provider
            .as_deref()
            .unwrap_or("unknown")
            .to_uppercase(),
        providers: breakdown
            .results
            .iter()
            .map(|r| r.provider.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    });

    ScoreReport::Scored(ScoredReport {
        hero,
        justification: breakdown.overall_justification.clone(),
        sections,
        key_risks: breakdown.key_risks.clone(),
        enhancement_priorities: breakdown.cv_enhancement_priority.clone(),
        gap,
        compare,
        scored_at: breakdown
            .scored_at
            .map(|t| t.format("%b %-d, %Y %H:%M UTC").to_string()),
    })
}

fn build_section_row(index: usize, section: &ScoreSection, expanded: bool) -> SectionRow {
    let detail = expanded.then(|| SectionDetail {
        strengths: non_empty(&section.strengths),
        weaknesses: non_empty(&section.weaknesses),
        recommendations: non_empty(&section.recommendations),
    });

    SectionRow {
        index,
        dimension: section.dimension.clone(),
        score: section.score,
        band: ScoreBand::for_score(section.score),
        weight_percent: section.weight.map(|w| (w * 100.0).round() as u8),
        expanded,
        detail,
    }
}

fn non_empty(list: &[String]) -> Option<Vec<String>> {
    if list.is_empty() {
        None
    } else {
        Some(list.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::breakdown::RawBreakdown;
    use crate::scoring::normalize::normalize;
    use serde_json::json;

    fn breakdown_from(value: serde_json::Value) -> ScoreBreakdown {
        let raw: RawBreakdown = serde_json::from_value(value).unwrap();
        normalize(raw)
    }

    fn scored(report: &ScoreReport) -> &ScoredReport {
        match report {
            ScoreReport::Scored(s) => s,
            ScoreReport::Unscored => panic!("expected a scored report"),
        }
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(ScoreBand::for_score(100), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(80), ScoreBand::Excellent);
        assert_eq!(ScoreBand::for_score(79), ScoreBand::Great);
        assert_eq!(ScoreBand::for_score(65), ScoreBand::Great);
        assert_eq!(ScoreBand::for_score(64), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(50), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(49), ScoreBand::Partial);
        assert_eq!(ScoreBand::for_score(30), ScoreBand::Partial);
        assert_eq!(ScoreBand::for_score(29), ScoreBand::Weak);
        assert_eq!(ScoreBand::for_score(0), ScoreBand::Weak);
    }

    #[test]
    fn test_none_breakdown_renders_unscored() {
        assert_eq!(build_report(None, ExpandState::new()), ScoreReport::Unscored);
    }

    #[test]
    fn test_empty_sections_renders_unscored() {
        let breakdown = breakdown_from(json!({"overall_score": 85}));
        assert_eq!(build_report(Some(&breakdown), ExpandState::new()), ScoreReport::Unscored);
    }

    #[test]
    fn test_hero_scenario_with_strengths_only() {
        // Hero 85, one "Skills" row, strengths sub-block with "Python",
        // no weaknesses sub-block.
        let breakdown = breakdown_from(json!({
            "overall_score": 85,
            "sections": [{
                "dimension": "Skills",
                "score": 90,
                "strong_points": ["Python"],
                "weak": []
            }]
        }));

        let report = build_report(Some(&breakdown), ExpandState::with_expanded(Some(0)));
        let report = scored(&report);

        assert_eq!(report.hero.overall_score, 85);
        assert_eq!(report.hero.band, ScoreBand::Excellent);
        assert_eq!(report.hero.interview_probability, "N/A");
        assert_eq!(report.sections.len(), 1);

        let row = &report.sections[0];
        assert_eq!(row.dimension, "Skills");
        assert!(row.expanded);
        let detail = row.detail.as_ref().unwrap();
        assert_eq!(detail.strengths.as_deref(), Some(&["Python".to_string()][..]));
        assert!(detail.weaknesses.is_none());
        assert!(detail.recommendations.is_none());
    }

    #[test]
    fn test_collapsed_rows_carry_no_detail() {
        let breakdown = breakdown_from(json!({
            "overall_score": 70,
            "sections": [
                {"dimension": "Skills", "score": 70, "strong": ["Rust"]},
                {"dimension": "Experience", "score": 60}
            ]
        }));

        let report = build_report(Some(&breakdown), ExpandState::with_expanded(Some(1)));
        let report = scored(&report);
        assert!(!report.sections[0].expanded);
        assert!(report.sections[0].detail.is_none());
        assert!(report.sections[1].expanded);
    }

    #[test]
    fn test_gap_block_requires_itemized_breakdown() {
        // Other gap fields present, but no items — block must not render.
        let no_items = breakdown_from(json!({
            "overall_score": 67,
            "sections": [{"dimension": "Skills", "score": 67}],
            "gap_analysis": {"total_gap_percentage": 33, "improvement_actions": ["Learn Go"]}
        }));
        let report = build_report(Some(&no_items), ExpandState::new());
        assert!(scored(&report).gap.is_none());

        let with_items = breakdown_from(json!({
            "overall_score": 67,
            "sections": [{"dimension": "Skills", "score": 67}],
            "gap_analysis": {
                "gap_breakdown": [{"category": "Cloud", "gap_points": 10, "reason": "No GCP"}]
            }
        }));
        let report = build_report(Some(&with_items), ExpandState::new());
        let gap = scored(&report).gap.as_ref().unwrap();
        assert_eq!(gap.total_gap_percentage, 33);
        assert_eq!(gap.items[0].category, "Cloud");
    }

    #[test]
    fn test_compare_summary_scenario() {
        // Best provider reads "GEMINI"; providers list reads "openai, gemini".
        let breakdown = breakdown_from(json!({
            "overall_score": 85,
            "sections": [{"dimension": "Skills", "score": 85}],
            "compare_mode": true,
            "best_provider": "gemini",
            "results": {
                "openai": {"overall_score": 80},
                "gemini": {"overall_score": 85}
            }
        }));

        let report = build_report(Some(&breakdown), ExpandState::new());
        let compare = scored(&report).compare.as_ref().unwrap();
        assert_eq!(compare.best_provider, "GEMINI");
        assert_eq!(compare.providers, "openai, gemini");
    }

    #[test]
    fn test_compare_summary_absent_for_single_provider_runs() {
        let breakdown = breakdown_from(json!({
            "overall_score": 85,
            "sections": [{"dimension": "Skills", "score": 85}]
        }));
        let report = build_report(Some(&breakdown), ExpandState::new());
        assert!(scored(&report).compare.is_none());
    }

    #[test]
    fn test_weight_badge_rounded_or_omitted() {
        let breakdown = breakdown_from(json!({
            "overall_score": 70,
            "sections": [
                {"dimension": "Skills", "score": 70, "weight": 0.346},
                {"dimension": "Experience", "score": 70}
            ]
        }));
        let report = build_report(Some(&breakdown), ExpandState::new());
        let report = scored(&report);
        assert_eq!(report.sections[0].weight_percent, Some(35));
        assert_eq!(report.sections[1].weight_percent, None);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let breakdown = breakdown_from(json!({
            "overall_score": 42,
            "interview_probability": "low",
            "sections": [{"dimension": "Skills", "score": 42, "weak_points": ["No Rust"]}],
            "key_risks": ["Career gap"]
        }));

        let first = build_report(Some(&breakdown), ExpandState::with_expanded(Some(0)));
        let second = build_report(Some(&breakdown), ExpandState::with_expanded(Some(0)));
        assert_eq!(first, second);

        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn test_expand_state_toggle_semantics() {
        let mut state = ExpandState::new();
        assert_eq!(state.expanded(), None);

        // Toggling i twice returns to fully collapsed.
        state.toggle(2);
        assert_eq!(state.expanded(), Some(2));
        state.toggle(2);
        assert_eq!(state.expanded(), None);

        // Expanding j while i is expanded collapses i.
        state.toggle(0);
        state.toggle(3);
        assert_eq!(state.expanded(), Some(3));
    }

    #[test]
    fn test_unknown_probability_renders_na_badge() {
        let breakdown = breakdown_from(json!({
            "overall_score": 55,
            "interview_probability": "banana",
            "sections": [{"dimension": "Skills", "score": 55}]
        }));
        let report = build_report(Some(&breakdown), ExpandState::new());
        assert_eq!(scored(&report).hero.interview_probability, "N/A");
    }

    #[test]
    fn test_out_of_range_expand_index_expands_nothing() {
        let breakdown = breakdown_from(json!({
            "overall_score": 55,
            "sections": [{"dimension": "Skills", "score": 55}]
        }));
        let report = build_report(Some(&breakdown), ExpandState::with_expanded(Some(9)));
        assert!(scored(&report).sections.iter().all(|s| !s.expanded));
    }
}
