use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use email_address::EmailAddress;
use serde::Deserialize;
use tracing::info;

use crate::auth::pages::{self, AuthForm};
use crate::auth::session::{safe_next, Session};
use crate::auth::users;
use crate::errors::AppError;
use crate::state::AppState;

pub const MIN_PASSWORD_CHARS: usize = 8;
const DEFAULT_REDIRECT: &str = "/dashboard/";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Lower-cased, trimmed e-mail, or the message to show.
pub fn normalize_email(email: &str) -> Result<String, &'static str> {
    let email = email.trim();
    if email.is_empty() || !EmailAddress::is_valid(email) {
        return Err("Enter a valid email address.");
    }
    Ok(email.to_lowercase())
}

fn redirect_target(form_next: Option<&str>, query_next: Option<&str>) -> String {
    safe_next(form_next.filter(|n| !n.trim().is_empty()).or(query_next))
        .unwrap_or_else(|| DEFAULT_REDIRECT.to_string())
}

fn form_page(status: StatusCode, kind: AuthForm, creds: &Credentials, error: &str) -> Response {
    (
        status,
        Html(pages::auth_form(
            kind,
            &creds.email,
            creds.next.as_deref(),
            Some(error),
        )),
    )
        .into_response()
}

/// GET /
pub async fn handle_landing() -> Html<String> {
    Html(pages::landing())
}

/// GET /register/
pub async fn handle_register_page(Query(q): Query<NextQuery>) -> Html<String> {
    Html(pages::auth_form(AuthForm::Register, "", q.next.as_deref(), None))
}

/// POST /register/
pub async fn handle_register(
    State(state): State<AppState>,
    mut session: Session,
    Query(q): Query<NextQuery>,
    Form(creds): Form<Credentials>,
) -> Result<Response, AppError> {
    let email = match normalize_email(&creds.email) {
        Ok(email) => email,
        Err(msg) => return Ok(form_page(StatusCode::BAD_REQUEST, AuthForm::Register, &creds, msg)),
    };
    if creds.password.chars().count() < MIN_PASSWORD_CHARS {
        return Ok(form_page(
            StatusCode::BAD_REQUEST,
            AuthForm::Register,
            &creds,
            "Password must be at least 8 characters.",
        ));
    }

    let hash = state.passwords.hash(&creds.password).await?;
    let Some(user) = users::create_user(&state.db, &email, &hash).await? else {
        return Ok(form_page(
            StatusCode::BAD_REQUEST,
            AuthForm::Register,
            &creds,
            "A user with that email already exists.",
        ));
    };

    let jar = session.login(user.id).await?;
    let target = redirect_target(creds.next.as_deref(), q.next.as_deref());
    Ok((jar, Redirect::to(&target)).into_response())
}

/// GET /login/
pub async fn handle_login_page(Query(q): Query<NextQuery>) -> Html<String> {
    Html(pages::auth_form(AuthForm::Login, "", q.next.as_deref(), None))
}

/// POST /login/
pub async fn handle_login(
    State(state): State<AppState>,
    mut session: Session,
    Query(q): Query<NextQuery>,
    Form(creds): Form<Credentials>,
) -> Result<Response, AppError> {
    const INVALID: &str = "Invalid email or password";

    let Ok(email) = normalize_email(&creds.email) else {
        return Ok(form_page(StatusCode::OK, AuthForm::Login, &creds, INVALID));
    };
    let Some(user) = users::find_by_email(&state.db, &email).await? else {
        state.passwords.verify_unknown(&creds.password).await?;
        return Ok(form_page(StatusCode::OK, AuthForm::Login, &creds, INVALID));
    };
    if !state
        .passwords
        .verify(&creds.password, &user.password_hash)
        .await?
    {
        info!("Failed login for user {}", user.id);
        return Ok(form_page(StatusCode::OK, AuthForm::Login, &creds, INVALID));
    }

    let jar = session.login(user.id).await?;
    let target = redirect_target(creds.next.as_deref(), q.next.as_deref());
    Ok((jar, Redirect::to(&target)).into_response())
}

/// GET|POST /logout/
pub async fn handle_logout(session: Session) -> Result<Response, AppError> {
    let jar = session.logout().await?;
    Ok((jar, Redirect::to("/login/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), Ok("ada@example.com".to_string()));
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("").is_err());
    }

    #[test]
    fn test_redirect_target_prefers_form_then_query() {
        assert_eq!(redirect_target(Some("/profile/"), Some("/templates/")), "/profile/");
        assert_eq!(redirect_target(Some(""), Some("/templates/")), "/templates/");
        assert_eq!(redirect_target(None, None), "/dashboard/");
        assert_eq!(redirect_target(Some("https://evil.example/"), None), "/dashboard/");
    }
}
