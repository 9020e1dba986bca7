use std::collections::BTreeMap;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::ats::pdf_text::PdfTextError;
use crate::auth::password::PasswordError;
use crate::auth::session::SessionError;

/// Per-field validation messages, keyed by form field name.
pub type FormErrors = BTreeMap<String, Vec<String>>;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid form submission")]
    InvalidForm(FormErrors),

    /// Anonymous request to a login-required route. Renders as a redirect.
    #[error("Login required")]
    LoginRequired { location: String },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Password hashing error: {0}")]
    Password(#[from] PasswordError),

    #[error("PDF read error: {0}")]
    PdfRead(String),

    #[error("AI backend not configured")]
    AiUnavailable,

    #[error("LLM error: {message}")]
    Llm {
        message: String,
        debug_detail: Option<String>,
    },

    #[error("AI response parsing failed: {json_error}")]
    AnalysisParse {
        raw_response: String,
        json_error: String,
        resume_text_preview: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<PdfTextError> for AppError {
    fn from(err: PdfTextError) -> Self {
        match err {
            PdfTextError::Unreadable(detail) => AppError::PdfRead(detail),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details): (StatusCode, &str, String, Option<Value>) =
            match self {
                AppError::LoginRequired { location } => {
                    return (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response();
                }
                AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
                AppError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None)
                }
                AppError::InvalidForm(errors) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_FORM",
                    "Please correct the errors below".to_string(),
                    Some(json!(errors)),
                ),
                AppError::MethodNotAllowed => (
                    StatusCode::METHOD_NOT_ALLOWED,
                    "METHOD_NOT_ALLOWED",
                    "Only POST requests allowed".to_string(),
                    None,
                ),
                AppError::Database(e) => {
                    tracing::error!("Database error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DATABASE_ERROR",
                        "A database error occurred".to_string(),
                        None,
                    )
                }
                AppError::Session(e) => {
                    tracing::error!("Session error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "SESSION_ERROR",
                        "A session error occurred".to_string(),
                        None,
                    )
                }
                AppError::Password(e) => {
                    tracing::error!("Password hashing error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal server error occurred".to_string(),
                        None,
                    )
                }
                AppError::PdfRead(detail) => {
                    tracing::warn!("PDF read failed: {detail}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "PDF_READ_ERROR",
                        "Error reading PDF file. Please try another file.".to_string(),
                        None,
                    )
                }
                AppError::AiUnavailable => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI_UNAVAILABLE",
                    "Google AI API key not configured. Set GOOGLE_AI_API_KEY in the environment"
                        .to_string(),
                    None,
                ),
                AppError::Llm {
                    message,
                    debug_detail,
                } => {
                    tracing::error!("LLM error: {message}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "LLM_ERROR",
                        "An AI processing error occurred".to_string(),
                        debug_detail.map(|d| json!({ "detail": d })),
                    )
                }
                AppError::AnalysisParse {
                    raw_response,
                    json_error,
                    resume_text_preview,
                } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI_RESPONSE_PARSE_ERROR",
                    "AI response parsing failed".to_string(),
                    Some(json!({
                        "raw_response": raw_response,
                        "json_error": json_error,
                        "resume_text_preview": resume_text_preview,
                    })),
                ),
                AppError::Storage(msg) => {
                    tracing::error!("Storage error: {msg}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "STORAGE_ERROR",
                        "A storage error occurred".to_string(),
                        None,
                    )
                }
            };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_required_renders_redirect() {
        let response = AppError::LoginRequired {
            location: "/login/?next=/profile/".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login/?next=/profile/"
        );
    }

    #[test]
    fn test_pdf_errors_map_by_kind() {
        assert!(matches!(
            AppError::from(PdfTextError::NotPdf),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(PdfTextError::Unreadable("bad xref".into())),
            AppError::PdfRead(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidForm(FormErrors::new()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MethodNotAllowed.into_response().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
