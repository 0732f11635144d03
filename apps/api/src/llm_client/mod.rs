/// LLM Client — the single point of entry for all provider API calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// All LLM interactions MUST go through this module.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub mod gemini;
pub mod openai;
pub mod prompts;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Scoring call timed out after {secs}s")]
    TimedOut { secs: u64 },

    #[error("Provider '{0}' has no API key configured")]
    NotConfigured(&'static str),
}

/// Which provider(s) a scoring run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    OpenAi,
    Gemini,
    Compare,
}

impl ProviderMode {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderMode::OpenAi => "openai",
            ProviderMode::Gemini => "gemini",
            ProviderMode::Compare => "compare",
        }
    }
}

/// A scoring-capable LLM provider. Carried in `AppState` behind
/// `ProviderRegistry`; handlers and the coordinator never see concrete
/// client types.
#[async_trait]
pub trait ScoreProvider: Send + Sync {
    /// Short provider name, e.g. "openai".
    fn name(&self) -> &'static str;

    /// Model identifier sent to the API, e.g. "gpt-4o-mini".
    fn model_id(&self) -> &'static str;

    /// Makes a raw call and returns the text of the first completion.
    async fn call_text(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Calls the provider and parses the response text as JSON.
    /// The prompt must instruct the model to return valid JSON.
    async fn call_json(&self, system: &str, prompt: &str) -> Result<Value, LlmError> {
        let text = self.call_text(system, prompt).await?;
        let stripped = strip_json_fences(&text);
        serde_json::from_str(stripped).map_err(LlmError::Parse)
    }
}

/// Holds whichever provider clients have API keys configured.
/// Built once at startup and injected via `AppState`.
pub struct ProviderRegistry {
    openai: Option<OpenAiClient>,
    gemini: Option<GeminiClient>,
}

impl ProviderRegistry {
    pub fn new(openai: Option<OpenAiClient>, gemini: Option<GeminiClient>) -> Self {
        Self { openai, gemini }
    }

    pub fn openai(&self) -> Result<&dyn ScoreProvider, LlmError> {
        self.openai
            .as_ref()
            .map(|c| c as &dyn ScoreProvider)
            .ok_or(LlmError::NotConfigured("openai"))
    }

    pub fn gemini(&self) -> Result<&dyn ScoreProvider, LlmError> {
        self.gemini
            .as_ref()
            .map(|c| c as &dyn ScoreProvider)
            .ok_or(LlmError::NotConfigured("gemini"))
    }

    /// Resolves the providers a mode targets, in attempted order.
    /// Compare mode requires both providers to be configured.
    pub fn for_mode(&self, mode: ProviderMode) -> Result<Vec<&dyn ScoreProvider>, LlmError> {
        match mode {
            ProviderMode::OpenAi => Ok(vec![self.openai()?]),
            ProviderMode::Gemini => Ok(vec![self.gemini()?]),
            ProviderMode::Compare => Ok(vec![self.openai()?, self.gemini()?]),
        }
    }

    pub fn configured_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.openai.is_some() {
            names.push("openai");
        }
        if self.gemini.is_some() {
            names.push("gemini");
        }
        names
    }
}

/// Shared retry policy for provider calls: retries on 429 and 5xx with
/// exponential backoff (1s, 2s, 4s), returns other statuses to the caller.
pub(crate) async fn send_with_retry<F>(
    build_request: F,
    provider: &'static str,
) -> Result<reqwest::Response, LlmError>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s, 4s
            let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "{provider} call attempt {attempt} failed, retrying after {}ms...",
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build_request().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("{provider} API returned {status}: {body}");
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        return Ok(response);
    }

    Err(last_error.unwrap_or(LlmError::RateLimited {
        retries: MAX_RETRIES,
    }))
}

/// Extracts an error message from a provider error body.
/// Both OpenAI and Gemini wrap it as `{"error": {"message": ...}}`.
pub(crate) fn extract_api_error(status: u16, body: String) -> LlmError {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub(crate) fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Builds the shared HTTP client for provider calls.
pub(crate) fn build_http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .expect("Failed to build HTTP client")
}
