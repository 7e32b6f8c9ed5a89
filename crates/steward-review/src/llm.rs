use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use steward_core::{LlmConfig, StewardError};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// A language model that turns one prompt into one text response.
#[async_trait]
pub trait ReviewModel: Send + Sync {
    /// Model identifier, for diagnostics.
    fn model(&self) -> &str;

    /// Send `prompt` and return the response text.
    async fn generate(&self, prompt: &str) -> Result<String, StewardError>;
}

/// Client for the Gemini `generateContent` endpoint.
///
/// # Examples
///
/// ```
/// use steward_core::LlmConfig;
/// use steward_review::llm::{GeminiClient, ReviewModel};
///
/// let client = GeminiClient::new(&LlmConfig::default(), "test-key").unwrap();
/// assert_eq!(client.model(), "gemini-1.5-pro");
/// ```
pub struct GeminiClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl GeminiClient {
    /// Create a new client from configuration and an API key.
    ///
    /// # Errors
    ///
    /// Returns [`StewardError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self, StewardError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StewardError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!(
            "{base_url}/v1beta/models/{}:generateContent",
            self.config.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> Result<String, StewardError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let feedback = response
            .prompt_feedback
            .map(|f| f.to_string())
            .unwrap_or_else(|| "none".into());
        return Err(StewardError::Llm(format!(
            "response contained no candidates (prompt feedback: {feedback})"
        )));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(StewardError::Llm(format!(
            "response contained no text (finish reason: {reason})"
        )));
    }
    Ok(text)
}

#[async_trait]
impl ReviewModel for GeminiClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, StewardError> {
        let url = self.endpoint();
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: self
                .config
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        };

        debug!(model = %self.config.model, prompt_len = prompt.len(), "sending prompt");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StewardError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(StewardError::Llm(format!(
                "Gemini API error {status}: {body_text}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| StewardError::Llm(format!("failed to parse response: {e}")))?;

        extract_text(parsed)
    }
}
