use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::auth::password::PasswordHasher;
use crate::auth::session::SessionStore;
use crate::config::Config;
use crate::llm_client::GenerativeBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Redis-backed in production.
    pub sessions: Arc<dyn SessionStore>,
    pub s3: S3Client,
    /// `None` when no usable Google AI key is configured.
    pub llm: Option<Arc<dyn GenerativeBackend>>,
    pub config: Config,
    pub passwords: PasswordHasher,
}
