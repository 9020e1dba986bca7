use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::analysis::{analysis_timestamp, analyze_resume_text};
use crate::ats::pdf_text::PdfUpload;
use crate::auth::session::Session;
use crate::auth::LOGIN_URL;
use crate::errors::AppError;
use crate::state::AppState;

pub const RESULTS_URL: &str = "/ai/analysis-results/";

#[derive(Debug, Serialize)]
pub struct AnalysisResults {
    pub analysis: Value,
    pub top_companies: Value,
    pub study_plan: Value,
    pub analysis_timestamp: Option<String>,
}

impl AnalysisResults {
    pub fn new(analysis: Value, analysis_timestamp: Option<String>) -> Self {
        let top_companies = analysis
            .get("top_companies")
            .cloned()
            .unwrap_or_else(|| json!([]));
        let study_plan = analysis
            .get("study_plan")
            .cloned()
            .unwrap_or_else(|| json!({}));
        Self {
            analysis,
            top_companies,
            study_plan,
            analysis_timestamp,
        }
    }
}

/// POST /ai/analyze-resume/
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    mut session: Session,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    session.require_user(LOGIN_URL, &uri)?;
    let backend = state.llm.clone().ok_or(AppError::AiUnavailable)?;

    let upload = PdfUpload::from_body(multipart).await?;
    let resume_text = upload.extract_text().await?;

    let analysis = analyze_resume_text(backend.as_ref(), &resume_text, state.config.debug).await?;

    session.data.ai_analysis = Some(analysis);
    session.data.analysis_timestamp = Some(analysis_timestamp());
    let jar = session.save().await?;

    Ok((
        jar,
        Json(json!({ "success": true, "redirect_url": RESULTS_URL })),
    )
        .into_response())
}

/// Any other method on /ai/analyze-resume/. Anonymous callers still get the
/// login redirect first.
pub async fn handle_analyze_wrong_method(session: Session, uri: Uri) -> Result<Response, AppError> {
    session.require_user(LOGIN_URL, &uri)?;
    Err(AppError::MethodNotAllowed)
}

/// GET /ai/analysis-results/
pub async fn handle_results(session: Session, uri: Uri) -> Result<Response, AppError> {
    session.require_user(LOGIN_URL, &uri)?;
    let Some(analysis) = session.data.ai_analysis.clone() else {
        return Ok(Redirect::to("/dashboard/").into_response());
    };
    let results = AnalysisResults::new(analysis, session.data.analysis_timestamp.clone());
    Ok(Json(results).into_response())
}
