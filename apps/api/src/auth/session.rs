//! Cookie-keyed server-side sessions.
//!
//! The browser holds only an opaque id in the `sessionid` cookie; the data
//! lives in a `SessionStore` (Redis in production) as JSON with a TTL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Uri},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use redis::AsyncCommands;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";
const KEY_PREFIX: &str = "session:";
/// Throwaway origin for building query strings.
const QUERY_BASE: &str = "http://localhost/";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("corrupt session payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Everything kept per browser session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Option<Uuid>,
    pub selected_template: Option<String>,
    pub ai_analysis: Option<Value>,
    pub analysis_timestamp: Option<String>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<SessionData>, SessionError>;
    async fn save(&self, id: &str, data: &SessionData, ttl: Duration) -> Result<(), SessionError>;
    async fn delete(&self, id: &str) -> Result<(), SessionError>;
}

pub struct RedisSessionStore {
    client: redis::Client,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &str) -> Result<Option<SessionData>, SessionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(format!("{KEY_PREFIX}{id}")).await?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(SessionError::from)
    }

    async fn save(&self, id: &str, data: &SessionData, ttl: Duration) -> Result<(), SessionError> {
        let payload = serde_json::to_string(data)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(format!("{KEY_PREFIX}{id}"), payload, ttl.as_secs())
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(format!("{KEY_PREFIX}{id}")).await?;
        Ok(())
    }
}

/// Request-scoped session handle, extracted from the cookie.
pub struct Session {
    id: Option<String>,
    pub data: SessionData,
    store: Arc<dyn SessionStore>,
    ttl: Duration,
    secure_cookie: bool,
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

        let (id, data) = match cookie_id {
            Some(id) => match state.sessions.load(&id).await? {
                Some(data) => (Some(id), data),
                // Expired or forged id: start over with a fresh one on save.
                None => (None, SessionData::default()),
            },
            None => (None, SessionData::default()),
        };

        Ok(Session {
            id,
            data,
            store: state.sessions.clone(),
            ttl: Duration::from_secs(state.config.session_ttl_secs),
            secure_cookie: state.config.session_cookie_secure,
        })
    }
}

impl Session {
    /// The logged-in user, or a redirect to `login_url` carrying the
    /// requested path as `next`.
    pub fn require_user(&self, login_url: &str, uri: &Uri) -> Result<Uuid, AppError> {
        self.data.user_id.ok_or_else(|| AppError::LoginRequired {
            location: login_redirect(login_url, uri),
        })
    }

    /// Persists the data and returns the cookie to send back.
    pub async fn save(&mut self) -> Result<CookieJar, AppError> {
        let id = self
            .id
            .get_or_insert_with(|| Uuid::new_v4().simple().to_string())
            .clone();
        self.store.save(&id, &self.data, self.ttl).await?;
        Ok(CookieJar::new().add(self.cookie(id)))
    }

    /// Logs `user_id` in under a fresh session id, dropping the old one.
    pub async fn login(&mut self, user_id: Uuid) -> Result<CookieJar, AppError> {
        if let Some(old) = self.id.take() {
            self.store.delete(&old).await?;
        }
        self.data.user_id = Some(user_id);
        debug!("Session rotated for user {user_id}");
        self.save().await
    }

    /// Deletes the stored session and expires the cookie.
    pub async fn logout(self) -> Result<CookieJar, AppError> {
        if let Some(id) = &self.id {
            self.store.delete(id).await?;
        }
        Ok(CookieJar::new().remove(Cookie::build(SESSION_COOKIE).path("/")))
    }

    fn cookie(&self, id: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .max_age(time_duration(self.ttl))
            .build()
    }
}

fn time_duration(ttl: Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

/// `{login_url}?next={path}`. The `next` value is form-urlencoded with its
/// slashes left readable.
pub fn login_redirect(login_url: &str, uri: &Uri) -> String {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    match Url::parse_with_params(QUERY_BASE, [("next", target)]) {
        Ok(url) => {
            let query = url.query().unwrap_or_default().replace("%2F", "/");
            format!("{login_url}?{query}")
        }
        Err(e) => {
            debug!("Could not encode next={target}: {e}");
            login_url.to_string()
        }
    }
}

/// Only local absolute paths are accepted as post-login targets.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    let local = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    local.then(|| next.to_string())
}
