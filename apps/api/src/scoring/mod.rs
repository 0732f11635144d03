// Scoring pipeline: tolerant raw schema → normalizer → canonical breakdown,
// plus the trigger that runs provider calls and attaches results to jobs.
// All LLM calls go through llm_client — no direct provider calls here.

pub mod breakdown;
pub mod coordinator;
pub mod handlers;
pub mod normalize;
pub mod progress;
