//! LLM Client: the single point of entry for generative-AI calls.
//!
//! Talks to the Google Gemini REST API (`generateContent` and model listing).
//! Callers go through `generate_with_fallback`, which tries a short, ordered
//! list of model names once each. There is no backoff or per-model retry.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Models tried in order, fastest/cheapest first.
pub const DEFAULT_MODELS: &[&str] = &["gemini-1.5-flash", "gemini-1.5-pro"];

const GENERATE_METHOD: &str = "generateContent";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("All models failed. Tried: {tried}. Last error: {last_error}")]
    AllModelsFailed { tried: String, last_error: String },
}

/// A model advertised by the listing endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Name without the `models/` resource prefix.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }
}

/// The generative backend seam. `GeminiClient` is the production
/// implementation; tests substitute scripted backends.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError>;

    /// Returns the text of the first candidate.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini REST client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    async fn error_from(response: reqwest::Response) -> LlmError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GeminiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        LlmError::Api { status, message }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let listing: ListModelsResponse = response.json().await?;
        Ok(listing.models)
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!("{}/models/{model}:{GENERATE_METHOD}", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: GenerateResponse = response.json().await?;
        if let Some(usage) = &body.usage_metadata {
            debug!(
                "Gemini call succeeded: model={model}, prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }
        body.text().ok_or(LlmError::EmptyContent)
    }
}

/// A successful generation and the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub model: String,
    pub text: String,
}

/// Orders the candidate models: the listing hint first when it is not
/// already one of the defaults, then the defaults.
pub fn model_candidates(hint: Option<&str>) -> Vec<String> {
    let mut models: Vec<String> = DEFAULT_MODELS.iter().map(|m| m.to_string()).collect();
    if let Some(hint) = hint {
        if !models.iter().any(|m| m == hint) {
            models.insert(0, hint.to_string());
        }
    }
    models
}

/// First listed model that supports `generateContent`. Listing failures are
/// not fatal.
async fn discover_model_hint(backend: &dyn GenerativeBackend) -> Option<String> {
    match backend.list_models().await {
        Ok(models) => models
            .iter()
            .find(|m| m.supported_generation_methods.iter().any(|g| g == GENERATE_METHOD))
            .map(|m| m.short_name().to_string()),
        Err(e) => {
            debug!("Model listing failed, using defaults: {e}");
            None
        }
    }
}

/// Tries each candidate model once, in order, returning the first non-empty
/// answer.
pub async fn generate_with_fallback(
    backend: &dyn GenerativeBackend,
    prompt: &str,
) -> Result<Generated, LlmError> {
    let hint = discover_model_hint(backend).await;
    let models = model_candidates(hint.as_deref());
    let mut last_error: Option<LlmError> = None;

    for model in &models {
        match backend.generate(model, prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!("Generation succeeded with model {model}");
                return Ok(Generated {
                    model: model.clone(),
                    text,
                });
            }
            Ok(_) => {
                warn!("Model {model} returned empty content");
                last_error = Some(LlmError::EmptyContent);
            }
            Err(e) => {
                warn!("Model {model} failed: {e}");
                last_error = Some(e);
            }
        }
    }

    Err(LlmError::AllModelsFailed {
        tried: models.join(", "),
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no models to try".to_string()),
    })
}

/// Strips a Markdown code fence around a JSON answer: a leading "```json",
/// then a leading "```", then a trailing "```".
pub fn strip_json_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    }
    if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Backend with canned per-model answers that records call order.
    pub(crate) struct ScriptedBackend {
        pub listing: Result<Vec<ModelInfo>, ()>,
        pub answers: HashMap<String, Result<String, String>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        pub(crate) fn new(answers: &[(&str, Result<&str, &str>)]) -> Self {
            Self {
                listing: Err(()),
                answers: answers
                    .iter()
                    .map(|(m, r)| {
                        (
                            m.to_string(),
                            (*r).map(str::to_string).map_err(str::to_string),
                        )
                    })
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerativeBackend for ScriptedBackend {
        async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
            self.listing.clone().map_err(|_| LlmError::Api {
                status: 403,
                message: "listing forbidden".to_string(),
            })
        }

        async fn generate(&self, model: &str, _prompt: &str) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push(model.to_string());
            match self.answers.get(model) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(message)) => Err(LlmError::Api {
                    status: 404,
                    message: message.clone(),
                }),
                None => Err(LlmError::Api {
                    status: 404,
                    message: format!("model {model} not found"),
                }),
            }
        }
    }

    fn model(name: &str, methods: &[&str]) -> ModelInfo {
        ModelInfo {
            name: format!("models/{name}"),
            supported_generation_methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_model_candidates_hint_goes_first() {
        assert_eq!(
            model_candidates(Some("gemini-2.0-flash")),
            vec!["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"]
        );
    }

    #[test]
    fn test_model_candidates_known_hint_not_duplicated() {
        assert_eq!(
            model_candidates(Some("gemini-1.5-pro")),
            vec!["gemini-1.5-flash", "gemini-1.5-pro"]
        );
        assert_eq!(model_candidates(None), DEFAULT_MODELS.to_vec());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]
        }))
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("{\"a\":1}"));

        let empty: GenerateResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[tokio::test]
    async fn test_fallback_uses_second_model_after_failure() {
        let backend = ScriptedBackend::new(&[
            ("gemini-1.5-flash", Err("quota exceeded")),
            ("gemini-1.5-pro", Ok("{}")),
        ]);
        let generated = generate_with_fallback(&backend, "prompt").await.unwrap();
        assert_eq!(generated.model, "gemini-1.5-pro");
        assert_eq!(
            *backend.calls.lock().unwrap(),
            vec!["gemini-1.5-flash", "gemini-1.5-pro"]
        );
    }

    #[tokio::test]
    async fn test_fallback_treats_empty_answer_as_failure() {
        let backend = ScriptedBackend::new(&[
            ("gemini-1.5-flash", Ok("   ")),
            ("gemini-1.5-pro", Ok("{\"ok\": true}")),
        ]);
        let generated = generate_with_fallback(&backend, "prompt").await.unwrap();
        assert_eq!(generated.text, "{\"ok\": true}");
    }

    #[tokio::test]
    async fn test_fallback_tries_listed_model_first() {
        let mut backend = ScriptedBackend::new(&[("gemini-exp", Ok("{}"))]);
        backend.listing = Ok(vec![
            model("embedding-001", &["embedContent"]),
            model("gemini-exp", &["generateContent", "countTokens"]),
        ]);
        let generated = generate_with_fallback(&backend, "prompt").await.unwrap();
        assert_eq!(generated.model, "gemini-exp");
        assert_eq!(*backend.calls.lock().unwrap(), vec!["gemini-exp"]);
    }

    #[tokio::test]
    async fn test_fallback_reports_all_tried_models() {
        let backend = ScriptedBackend::new(&[]);
        let err = generate_with_fallback(&backend, "prompt").await.unwrap_err();
        match err {
            LlmError::AllModelsFailed { tried, last_error } => {
                assert_eq!(tried, "gemini-1.5-flash, gemini-1.5-pro");
                assert!(last_error.contains("gemini-1.5-pro"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Each model is tried exactly once.
        assert_eq!(backend.calls.lock().unwrap().len(), 2);
    }
}
