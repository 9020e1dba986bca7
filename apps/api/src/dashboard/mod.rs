//! Dashboard statistics, PDF ATS check and profile.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::Uri,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::ats::pdf_text::PdfUpload;
use crate::ats::score_text;
use crate::auth::session::Session;
use crate::auth::{users, LOGIN_URL, REGISTER_URL};
use crate::errors::AppError;
use crate::models::resume::ResumeSummary;
use crate::resumes::repository::{self, ResumeStats};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_resumes: i64,
    pub analyzed_count: i64,
    pub avg_ats: i64,
    pub last_updated: Option<DateTime<Utc>>,
    pub selected_template: Option<String>,
    pub resumes: Vec<ResumeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ats_score_result: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ats_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub email: String,
    pub total_resumes: usize,
    pub resumes: Vec<ResumeSummary>,
}

/// Average ATS score rounded half to even; 0 without resumes.
pub fn rounded_average(avg: Option<f64>) -> i64 {
    avg.map(|a| a.round_ties_even() as i64).unwrap_or(0)
}

async fn dashboard(
    state: &AppState,
    session: &Session,
    uri: &Uri,
) -> Result<DashboardResponse, AppError> {
    let user_id = session.require_user(REGISTER_URL, uri)?;
    let ResumeStats {
        total,
        analyzed,
        avg_ats,
        last_updated,
    } = repository::stats(&state.db, user_id).await?;
    let resumes = repository::list_summaries(&state.db, user_id).await?;

    Ok(DashboardResponse {
        total_resumes: total,
        analyzed_count: analyzed,
        avg_ats: rounded_average(avg_ats),
        last_updated,
        selected_template: session.data.selected_template.clone(),
        resumes,
        ats_score_result: None,
        ats_error: None,
    })
}

/// Scores an uploaded resume PDF. Exactly one of the two values is set: the
/// score, or the message to show in place of it.
pub async fn score_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> (Option<u8>, Option<String>) {
    let scored = match PdfUpload::from_body(multipart).await {
        Ok(upload) => upload.extract_text().await.map(|text| score_text(&text)),
        Err(e) => Err(e),
    };
    match scored {
        Ok(score) => {
            info!("Scored uploaded PDF: {score}");
            (Some(score), None)
        }
        Err(e) => {
            info!("Uploaded PDF not scored: {e}");
            (None, Some(e.user_message()))
        }
    }
}

/// GET /dashboard/
pub async fn handle_dashboard(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
) -> Result<Json<DashboardResponse>, AppError> {
    Ok(Json(dashboard(&state, &session, &uri).await?))
}

/// POST /dashboard/
/// Scores an uploaded PDF. Upload and extraction problems are reported in
/// `ats_error` rather than as an HTTP error.
pub async fn handle_dashboard_upload(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DashboardResponse>, AppError> {
    let mut response = dashboard(&state, &session, &uri).await?;
    (response.ats_score_result, response.ats_error) = score_upload(multipart).await;
    Ok(Json(response))
}

/// GET /profile/
pub async fn handle_profile(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_id = session.require_user(LOGIN_URL, &uri)?;
    let user = users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let resumes = repository::list_summaries(&state.db, user_id).await?;

    Ok(Json(ProfileResponse {
        email: user.email,
        total_resumes: resumes.len(),
        resumes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::FromRequest,
        http::{header, Request},
    };

    async fn upload_body(
        content_type: &str,
        body: String,
    ) -> Result<Multipart, MultipartRejection> {
        let request = Request::builder()
            .method("POST")
            .uri("/dashboard/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await
    }

    async fn file_upload(
        field: &str,
        file_name: &str,
        contents: &str,
    ) -> Result<Multipart, MultipartRejection> {
        let body = format!(
            "--B\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{contents}\r\n--B--\r\n"
        );
        upload_body("multipart/form-data; boundary=B", body).await
    }

    #[tokio::test]
    async fn test_score_upload_reports_missing_file() {
        let multipart = file_upload("other", "cv.pdf", "%PDF").await;
        assert_eq!(
            score_upload(multipart).await,
            (None, Some("Please upload a PDF file.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_score_upload_treats_plain_form_as_missing_file() {
        let multipart = upload_body(
            "application/x-www-form-urlencoded",
            "resume_pdf=cv.pdf".to_string(),
        )
        .await;
        assert!(multipart.is_err());
        assert_eq!(
            score_upload(multipart).await,
            (None, Some("Please upload a PDF file.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_score_upload_rejects_docx() {
        let multipart = file_upload("resume_pdf", "cv.docx", "PK").await;
        assert_eq!(
            score_upload(multipart).await,
            (None, Some("Only PDF files are supported.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_score_upload_reports_unreadable_pdf() {
        let multipart = file_upload("resume_pdf", "cv.pdf", "definitely not a pdf").await;
        assert_eq!(
            score_upload(multipart).await,
            (
                None,
                Some("Error reading PDF file. Please try another file.".to_string())
            )
        );
    }

    #[test]
    fn test_rounded_average() {
        assert_eq!(rounded_average(None), 0);
        assert_eq!(rounded_average(Some(72.5)), 72);
        assert_eq!(rounded_average(Some(73.5)), 74);
        assert_eq!(rounded_average(Some(41.2)), 41);
    }

    #[test]
    fn test_error_fields_omitted_when_absent() {
        let response = DashboardResponse {
            total_resumes: 0,
            analyzed_count: 0,
            avg_ats: 0,
            last_updated: None,
            selected_template: None,
            resumes: Vec::new(),
            ats_score_result: None,
            ats_error: None,
        };
        let json = serde_json::to_value(response).unwrap();
        assert!(json.get("ats_error").is_none());
        assert!(json.get("ats_score_result").is_none());
        assert_eq!(json["avg_ats"], 0);
    }
}
