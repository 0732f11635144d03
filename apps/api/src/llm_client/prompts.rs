// Prompt constants and builders for scoring and résumé enhancement.
// The prompt content is an opaque external contract — the rest of the system
// only depends on the tolerant response schema, never on this wording.

/// System prompt for fit scoring. Enforces JSON-only output.
pub const SCORING_SYSTEM: &str = "You are an expert technical recruiter. \
    You evaluate how well a candidate's résumé fits a specific job posting. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// System prompt for per-job résumé enhancement.
pub const ENHANCE_SYSTEM: &str = "You are an expert résumé writer. \
    You rewrite a candidate's résumé to better match a specific job posting \
    without inventing experience the candidate does not have. \
    Respond with the rewritten résumé as plain text only.";

/// Builds the scoring prompt for one résumé / job-posting pair.
pub fn scoring_prompt(resume_text: &str, job_title: &str, job_description: &str) -> String {
    format!(
        "RESUME:\n{resume_text}\n\n\
         JOB POSTING ({job_title}):\n{job_description}\n\n\
         TASK: Score the fit of this résumé against the posting. Return a JSON object with:\n\
         - overall_score: integer 0-100\n\
         - overall_justification: short free text\n\
         - sections: array of {{dimension, score (0-100), weight (0-1), \
           strong_points: [string], weak_points: [string], recommendations: [string]}} \
           covering at least Skills Match, Experience Level, and Role Alignment\n\
         - interview_probability: one of HIGH, MEDIUM, LOW\n\
         - fit_assessment_label: short label, e.g. \"Strong fit\"\n\
         - key_risks: array of short strings\n\
         - cv_enhancement_priority: array of short strings, most impactful first\n\
         - gap_analysis: {{gap_breakdown: [{{category, gap_points (integer), reason}}], \
           total_gap_percentage (integer), improvement_actions: [string]}}"
    )
}

/// Builds the enhancement prompt. `priorities` come from the job's stored
/// score breakdown when one exists.
pub fn enhance_prompt(
    resume_text: &str,
    job_title: &str,
    job_description: &str,
    priorities: &[String],
) -> String {
    let priority_block = if priorities.is_empty() {
        String::new()
    } else {
        format!(
            "\nPRIORITIES (address these first):\n- {}\n",
            priorities.join("\n- ")
        )
    };

    format!(
        "RESUME:\n{resume_text}\n\n\
         JOB POSTING ({job_title}):\n{job_description}\n\
         {priority_block}\n\
         TASK: Rewrite the résumé to better match this posting. Keep every claim \
         truthful to the original résumé. Return plain text only."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_prompt_embeds_resume_and_posting() {
        let prompt = scoring_prompt("Rust engineer, 5 years", "Backend Engineer", "We need Rust.");
        assert!(prompt.contains("Rust engineer, 5 years"));
        assert!(prompt.contains("Backend Engineer"));
        assert!(prompt.contains("overall_score"));
    }

    #[test]
    fn test_enhance_prompt_lists_priorities() {
        let priorities = vec!["Add Kubernetes".to_string(), "Quantify impact".to_string()];
        let prompt = enhance_prompt("resume", "Title", "desc", &priorities);
        assert!(prompt.contains("- Add Kubernetes"));
        assert!(prompt.contains("- Quantify impact"));
    }

    #[test]
    fn test_enhance_prompt_omits_empty_priority_block() {
        let prompt = enhance_prompt("resume", "Title", "desc", &[]);
        assert!(!prompt.contains("PRIORITIES"));
    }
}
