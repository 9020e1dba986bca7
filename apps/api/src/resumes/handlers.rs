use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::ats::{score_breakdown, ScoreBreakdown};
use crate::auth::session::Session;
use crate::auth::LOGIN_URL;
use crate::errors::AppError;
use crate::models::resume::{ResumeFields, ResumeRow};
use crate::render::html::render_preview;
use crate::render::pdf::render_pdf;
use crate::render::{ResumeView, TemplateKind, UnknownTemplate};
use crate::resumes::form::ResumeForm;
use crate::resumes::pages::resume_form;
use crate::resumes::repository;
use crate::resumes::text::plain_text;
use crate::state::AppState;
use crate::storage;

#[derive(Serialize)]
pub struct ResumeResponse {
    #[serde(flatten)]
    pub resume: ResumeRow,
    pub photo_url: Option<String>,
}

impl From<ResumeRow> for ResumeResponse {
    fn from(resume: ResumeRow) -> Self {
        let photo_url = resume
            .photo_key
            .as_ref()
            .map(|_| format!("/resume/{}/photo/", resume.id));
        Self { resume, photo_url }
    }
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub resume_id: i64,
    pub ats_score: i32,
    pub breakdown: ScoreBreakdown,
}

pub fn templates_url(id: i64) -> String {
    format!("/resume/{id}/templates/")
}

pub(crate) async fn load_owned(
    state: &AppState,
    id: i64,
    user_id: Uuid,
) -> Result<ResumeRow, AppError> {
    repository::get_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(|| not_found(id))
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Resume {id} not found"))
}

async fn parse_valid_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ResumeForm, AppError> {
    let multipart = multipart
        .map_err(|e| AppError::Validation(format!("Expected a multipart form: {e}")))?;
    let mut form = ResumeForm::from_multipart(multipart).await?;
    form.validate().map_err(|errors| {
        info!("Resume form rejected: {:?}", errors.keys().collect::<Vec<_>>());
        AppError::InvalidForm(errors)
    })?;
    Ok(form)
}

async fn upload_photo(
    state: &AppState,
    user_id: Uuid,
    form: &mut ResumeForm,
) -> Result<Option<String>, AppError> {
    match form.photo.take() {
        Some(photo) => storage::put_photo(
            &state.s3,
            &state.config.s3_bucket,
            user_id,
            &photo.content_type,
            photo.bytes,
        )
        .await
        .map(Some),
        None => Ok(None),
    }
}

async fn discard_photo(state: &AppState, key: &str) {
    if let Err(e) = storage::delete_photo(&state.s3, &state.config.s3_bucket, key).await {
        warn!("Could not remove photo {key}: {e}");
    }
}

/// The stored photo nothing will point at once a save settles: the fresh
/// upload when the save failed, the previous photo when a new one replaced it.
fn stale_photo<'a, T>(
    saved: &Result<T, AppError>,
    uploaded: Option<&'a str>,
    previous: Option<&'a str>,
) -> Option<&'a str> {
    match saved {
        Err(_) => uploaded,
        Ok(_) => uploaded.and(previous),
    }
}

/// GET /resume/new/
pub async fn handle_new_page(session: Session, uri: Uri) -> Result<Html<String>, AppError> {
    session.require_user(LOGIN_URL, &uri)?;
    let fields = ResumeFields::default();
    Ok(Html(resume_form("New resume", "/resume/new/", &fields, false)))
}

/// POST /resume/new/
pub async fn handle_create(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let user_id = session.require_user(LOGIN_URL, &uri)?;
    let mut form = parse_valid_form(multipart).await?;
    let photo_key = upload_photo(&state, user_id, &mut form).await?;

    let saved = repository::insert(&state.db, user_id, &form.fields, photo_key.as_deref())
        .await
        .map_err(AppError::from);
    if let Some(key) = stale_photo(&saved, photo_key.as_deref(), None) {
        discard_photo(&state, key).await;
    }
    let resume = saved?;
    info!("Created resume {} for user {user_id}", resume.id);
    Ok(Redirect::to(&templates_url(resume.id)).into_response())
}

/// GET /resume/:id/
pub async fn handle_get(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Json<ResumeResponse>, AppError> {
    let user_id = session.require_user(LOGIN_URL, &uri)?;
    let resume = load_owned(&state, id, user_id).await?;
    Ok(Json(resume.into()))
}

/// GET /resume/:id/edit/
pub async fn handle_edit_page(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let user_id = session.require_user(LOGIN_URL, &uri)?;
    let resume = load_owned(&state, id, user_id).await?;
    let action = format!("/resume/{id}/edit/");
    Ok(Html(resume_form(
        "Edit resume",
        &action,
        &resume.fields(),
        resume.photo_key.is_some(),
    )))
}

/// POST /resume/:id/edit/
/// Full-form resubmission. A new photo replaces the stored one; no photo
/// keeps it.
pub async fn handle_edit(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let user_id = session.require_user(LOGIN_URL, &uri)?;
    let existing = load_owned(&state, id, user_id).await?;

    let mut form = parse_valid_form(multipart).await?;
    let new_photo = upload_photo(&state, user_id, &mut form).await?;

    let saved = repository::update(&state.db, id, user_id, &form.fields, new_photo.as_deref())
        .await
        .map_err(AppError::from)
        .and_then(|row| row.ok_or_else(|| not_found(id)));
    let stale = stale_photo(
        &saved,
        new_photo.as_deref(),
        existing.photo_key.as_deref(),
    );
    if let Some(key) = stale {
        discard_photo(&state, key).await;
    }
    let updated = saved?;
    info!("Updated resume {}", updated.id);
    Ok(Redirect::to(&templates_url(updated.id)).into_response())
}

/// POST /resume/:id/delete/
pub async fn handle_delete(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    let user_id = session.require_user(LOGIN_URL, &uri)?;
    let removed = repository::delete(&state.db, id, user_id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(key) = &removed.photo_key {
        discard_photo(&state, key).await;
    }
    info!("Deleted resume {id} for user {user_id}");
    Ok(Redirect::to("/dashboard/"))
}

/// POST /resume/:id/analyze/
/// Scores the stored resume text and marks the resume as analyzed.
pub async fn handle_analyze(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let user_id = session.require_user(LOGIN_URL, &uri)?;
    let resume = load_owned(&state, id, user_id).await?;

    let breakdown = score_breakdown(&plain_text(&resume));
    let score = i32::from(breakdown.score);
    repository::set_ats_score(&state.db, id, user_id, score)
        .await?
        .ok_or_else(|| not_found(id))?;

    info!("Resume {id} scored {score}");
    Ok(Json(AnalyzeResponse {
        resume_id: id,
        ats_score: score,
        breakdown,
    }))
}

/// GET /resume/:id/photo/
pub async fn handle_photo(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let user_id = session.require_user(LOGIN_URL, &uri)?;
    let resume = load_owned(&state, id, user_id).await?;
    let key = resume
        .photo_key
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} has no photo")))?;

    let bytes = storage::get_photo(&state.s3, &state.config.s3_bucket, &key).await?;
    Ok((
        [(header::CONTENT_TYPE, storage::content_type_for_key(&key))],
        bytes,
    )
        .into_response())
}

/// GET /resume/:id/preview/:template/
pub async fn handle_preview(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path((id, template)): Path<(i64, String)>,
) -> Result<Response, AppError> {
    let user_id = session.require_user(LOGIN_URL, &uri)?;
    let resume = load_owned(&state, id, user_id).await?;

    let template = match template.parse::<TemplateKind>() {
        Ok(template) => template,
        Err(UnknownTemplate(slug)) => {
            debug!("Unknown template '{slug}' requested for resume {id}");
            return Ok(Redirect::to(&templates_url(id)).into_response());
        }
    };
    let view = ResumeView::new(resume, template);
    Ok(Html(render_preview(&view)).into_response())
}

/// GET /resume/:id/pdf/:template/
pub async fn handle_pdf(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path((id, template)): Path<(i64, String)>,
) -> Result<Response, AppError> {
    let user_id = session.require_user(LOGIN_URL, &uri)?;
    let resume = load_owned(&state, id, user_id).await?;

    let template = match template.parse::<TemplateKind>() {
        Ok(template) => template,
        Err(UnknownTemplate(slug)) => {
            debug!("Unknown template '{slug}' requested for resume {id}");
            return Ok(Redirect::to(&templates_url(id)).into_response());
        }
    };
    let view = ResumeView::new(resume, template);

    let rendered = tokio::task::spawn_blocking(move || render_pdf(&view)).await;
    match rendered {
        Ok(Ok(bytes)) => Ok((
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"resume_{id}.pdf\""),
                ),
            ],
            bytes,
        )
            .into_response()),
        Ok(Err(e)) => {
            error!("PDF export of resume {id} failed: {e}");
            Ok((StatusCode::INTERNAL_SERVER_ERROR, "Error generating PDF").into_response())
        }
        Err(e) => {
            error!("PDF export task for resume {id} failed: {e}");
            Ok((StatusCode::INTERNAL_SERVER_ERROR, "Error generating PDF").into_response())
        }
    }
}
