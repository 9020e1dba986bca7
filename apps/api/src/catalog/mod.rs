//! Template catalog and template selection.

use axum::{
    extract::{Path, State},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use sqlx::PgPool;
use tracing::debug;

use crate::auth::session::Session;
use crate::auth::LOGIN_URL;
use crate::errors::AppError;
use crate::models::template::ResumeTemplateRow;
use crate::render::TemplateKind;
use crate::resumes::handlers::load_owned;
use crate::state::AppState;

pub async fn list_templates(pool: &PgPool) -> Result<Vec<ResumeTemplateRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resume_templates ORDER BY id")
        .fetch_all(pool)
        .await
}

/// ASCII letters, digits, hyphens and underscores, at least one.
pub fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[derive(Debug, Serialize)]
pub struct TemplateChoice {
    pub slug: &'static str,
    pub name: &'static str,
    pub preview_url: String,
    pub pdf_url: String,
}

pub fn template_choices(resume_id: i64) -> Vec<TemplateChoice> {
    TemplateKind::ALL
        .into_iter()
        .map(|t| TemplateChoice {
            slug: t.slug(),
            name: t.display_name(),
            preview_url: format!("/resume/{resume_id}/preview/{}/", t.slug()),
            pdf_url: format!("/resume/{resume_id}/pdf/{}/", t.slug()),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct SelectTemplateResponse {
    pub resume_id: i64,
    pub full_name: String,
    pub templates: Vec<TemplateChoice>,
}

/// GET /templates/
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeTemplateRow>>, AppError> {
    Ok(Json(list_templates(&state.db).await?))
}

/// GET /build/:slug/
/// Remembers the chosen layout for this session. Segments that are not
/// slugs do not name a route.
pub async fn handle_build(
    mut session: Session,
    uri: Uri,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    if !is_slug(&slug) {
        return Err(AppError::NotFound(format!("No template '{slug}'")));
    }
    session.require_user(LOGIN_URL, &uri)?;
    debug!("Selected template '{slug}'");
    session.data.selected_template = Some(slug);
    let jar = session.save().await?;
    Ok((jar, Redirect::to("/dashboard/")).into_response())
}

/// GET /resume/:id/templates/
pub async fn handle_select(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Json<SelectTemplateResponse>, AppError> {
    let user_id = session.require_user(LOGIN_URL, &uri)?;
    let resume = load_owned(&state, id, user_id).await?;
    Ok(Json(SelectTemplateResponse {
        resume_id: resume.id,
        full_name: resume.full_name,
        templates: template_choices(id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_slug() {
        assert!(is_slug("modern_photo_style"));
        assert!(is_slug("two-column-2"));
        assert!(!is_slug(""));
        assert!(!is_slug("bad.slug"));
        assert!(!is_slug("caf\u{e9}"));
        assert!(!is_slug("a b"));
    }

    #[test]
    fn test_template_choices_cover_every_layout() {
        let choices = template_choices(5);
        assert_eq!(choices.len(), 3);
        assert_eq!(choices[0].slug, "professional_classic");
        assert_eq!(choices[1].preview_url, "/resume/5/preview/creative_minimal/");
        assert_eq!(choices[2].pdf_url, "/resume/5/pdf/modern_photo_style/");
    }
}
