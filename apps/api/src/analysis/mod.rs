//! AI career analysis of an uploaded resume PDF.

pub mod handlers;
pub mod prompts;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{generate_with_fallback, strip_json_fences, GenerativeBackend};

const RAW_RESPONSE_PREVIEW_CHARS: usize = 1000;
const RESUME_TEXT_PREVIEW_CHARS: usize = 200;

fn char_prefix(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Runs the recommendation prompt through the model fallback and parses the
/// answer as JSON. With `debug` set, transport failures carry their detail.
pub async fn analyze_resume_text(
    backend: &dyn GenerativeBackend,
    resume_text: &str,
    debug: bool,
) -> Result<Value, AppError> {
    let prompt = prompts::recommendation_prompt(resume_text);

    let generated = generate_with_fallback(backend, &prompt)
        .await
        .map_err(|e| AppError::Llm {
            message: format!("Error processing resume: {e}"),
            debug_detail: debug.then(|| e.to_string()),
        })?;
    info!("Resume analysis generated by {}", generated.model);

    let answer = strip_json_fences(&generated.text);
    serde_json::from_str(answer).map_err(|e| {
        warn!("AI answer is not valid JSON: {e}");
        AppError::AnalysisParse {
            raw_response: char_prefix(answer, RAW_RESPONSE_PREVIEW_CHARS),
            json_error: e.to_string(),
            resume_text_preview: char_prefix(resume_text, RESUME_TEXT_PREVIEW_CHARS),
        }
    })
}

pub fn analysis_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}
