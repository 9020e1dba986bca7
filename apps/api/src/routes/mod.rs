pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::auth::handlers as auth;
use crate::catalog;
use crate::dashboard;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(auth::handle_landing))
        // Auth
        .route(
            "/register/",
            get(auth::handle_register_page).post(auth::handle_register),
        )
        .route(
            "/login/",
            get(auth::handle_login_page).post(auth::handle_login),
        )
        .route(
            "/logout/",
            get(auth::handle_logout).post(auth::handle_logout),
        )
        // Dashboard
        .route(
            "/dashboard/",
            get(dashboard::handle_dashboard).post(dashboard::handle_dashboard_upload),
        )
        .route("/profile/", get(dashboard::handle_profile))
        // Templates
        .route("/templates/", get(catalog::handle_list))
        .route("/build/:slug/", get(catalog::handle_build))
        .route("/resume/:id/templates/", get(catalog::handle_select))
        // Resumes
        .route(
            "/resume/new/",
            get(resumes::handle_new_page).post(resumes::handle_create),
        )
        .route("/resume/:id/", get(resumes::handle_get))
        .route(
            "/resume/:id/edit/",
            get(resumes::handle_edit_page).post(resumes::handle_edit),
        )
        .route("/resume/:id/delete/", post(resumes::handle_delete))
        .route("/resume/:id/analyze/", post(resumes::handle_analyze))
        .route("/resume/:id/photo/", get(resumes::handle_photo))
        .route(
            "/resume/:id/preview/:template/",
            get(resumes::handle_preview),
        )
        .route("/resume/:id/pdf/:template/", get(resumes::handle_pdf))
        // AI analysis
        .route(
            "/ai/analyze-resume/",
            post(analysis::handle_analyze_resume).fallback(analysis::handle_analyze_wrong_method),
        )
        .route("/ai/analysis-results/", get(analysis::handle_results))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aws_sdk_s3::config::{BehaviorVersion, Region};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::password::PasswordHasher;
    use crate::auth::session::tests::MemorySessionStore;
    use crate::auth::session::{SessionData, SESSION_COOKIE};
    use crate::config::Config;
    use crate::llm_client::tests::ScriptedBackend;
    use crate::llm_client::GenerativeBackend;

    const SID: &str = "test-session";

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/unused".to_string(),
            redis_url: "redis://localhost".to_string(),
            s3_bucket: "resumes".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            google_ai_api_key: None,
            port: 0,
            rust_log: "info".to_string(),
            debug: false,
            session_ttl_secs: 60,
            session_cookie_secure: false,
            max_upload_bytes: 1024 * 1024,
        }
    }

    /// State whose database is never reached by the routes under test.
    fn test_state(
        sessions: Arc<MemorySessionStore>,
        llm: Option<Arc<dyn GenerativeBackend>>,
    ) -> AppState {
        let config = test_config();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        AppState {
            db,
            sessions,
            s3: aws_sdk_s3::Client::from_conf(s3_config),
            llm,
            config,
            passwords: PasswordHasher::fast(),
        }
    }

    async fn logged_in(data: SessionData) -> Arc<MemorySessionStore> {
        let store = Arc::new(MemorySessionStore::default());
        let data = SessionData {
            user_id: Some(Uuid::new_v4()),
            ..data
        };
        store.sessions.write().await.insert(SID.to_string(), data);
        store
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn with_session(mut req: Request<Body>) -> Request<Body> {
        req.headers_mut().insert(
            header::COOKIE,
            format!("{SESSION_COOKIE}={SID}").parse().unwrap(),
        );
        req
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn url_encoded_post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("resume_pdf=cv.pdf&full_name=Ada"))
            .unwrap()
    }

    fn pdf_multipart(file_name: &str) -> Request<Body> {
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"resume_pdf\"; \
             filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n\
             not really a pdf\r\n--{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/ai/analyze-resume/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(Arc::default(), None));
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["ai_analysis"], false);
    }

    #[tokio::test]
    async fn test_public_pages_render() {
        for uri in ["/", "/login/?next=/profile/", "/register/"] {
            let app = build_router(test_state(Arc::default(), None));
            let response = app.oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_anonymous_requests_redirect_to_login() {
        let cases = [
            ("/dashboard/", "/register/?next=/dashboard/"),
            ("/profile/", "/login/?next=/profile/"),
            ("/build/creative_minimal/", "/login/?next=/build/creative_minimal/"),
            ("/resume/3/", "/login/?next=/resume/3/"),
            ("/resume/new/", "/login/?next=/resume/new/"),
            ("/resume/3/edit/", "/login/?next=/resume/3/edit/"),
            (
                "/resume/3/preview/creative_minimal/",
                "/login/?next=/resume/3/preview/creative_minimal/",
            ),
            ("/ai/analysis-results/", "/login/?next=/ai/analysis-results/"),
            ("/ai/analyze-resume/", "/login/?next=/ai/analyze-resume/"),
        ];
        for (uri, expected) in cases {
            let app = build_router(test_state(Arc::default(), None));
            let response = app.oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), expected);
        }
    }

    #[tokio::test]
    async fn test_anonymous_form_posts_redirect_before_body_parsing() {
        let cases = [
            ("/ai/analyze-resume/", "/login/?next=/ai/analyze-resume/"),
            ("/resume/new/", "/login/?next=/resume/new/"),
            ("/resume/3/edit/", "/login/?next=/resume/3/edit/"),
            ("/dashboard/", "/register/?next=/dashboard/"),
        ];
        for (uri, expected) in cases {
            let app = build_router(test_state(Arc::default(), None));
            let response = app.oneshot(url_encoded_post(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), expected);
        }
    }

    #[tokio::test]
    async fn test_analyze_without_multipart_body_asks_for_pdf() {
        let store = logged_in(SessionData::default()).await;
        let backend: Arc<dyn GenerativeBackend> = Arc::new(ScriptedBackend::new(&[]));
        let app = build_router(test_state(store, Some(backend)));
        let response = app
            .oneshot(with_session(url_encoded_post("/ai/analyze-resume/")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Please upload a PDF file.");
    }

    #[tokio::test]
    async fn test_resume_form_without_multipart_body_is_json_error() {
        let store = logged_in(SessionData::default()).await;
        let app = build_router(test_state(store, None));
        let response = app
            .oneshot(with_session(url_encoded_post("/resume/new/")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_new_resume_page_renders_form() {
        let store = logged_in(SessionData::default()).await;
        let app = build_router(test_state(store, None));
        let response = app
            .oneshot(with_session(get("/resume/new/")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("name=\"career_objective\""));
    }

    #[tokio::test]
    async fn test_build_rejects_non_slug() {
        let store = logged_in(SessionData::default()).await;
        let app = build_router(test_state(store.clone(), None));
        let response = app
            .oneshot(with_session(get("/build/bad.slug/")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.sessions.read().await[SID].selected_template, None);
    }

    #[tokio::test]
    async fn test_analyze_rejects_get_for_logged_in_user() {
        let store = logged_in(SessionData::default()).await;
        let app = build_router(test_state(store, None));
        let response = app
            .oneshot(with_session(get("/ai/analyze-resume/")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Only POST requests allowed");
    }

    #[tokio::test]
    async fn test_analyze_without_api_key_is_server_error() {
        let store = logged_in(SessionData::default()).await;
        let app = build_router(test_state(store, None));
        let response = app
            .oneshot(with_session(pdf_multipart("cv.pdf")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "AI_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_pdf_upload() {
        let store = logged_in(SessionData::default()).await;
        let backend: Arc<dyn GenerativeBackend> = Arc::new(ScriptedBackend::new(&[]));
        let app = build_router(test_state(store, Some(backend)));
        let response = app
            .oneshot(with_session(pdf_multipart("cv.docx")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Only PDF files are supported.");
    }

    #[tokio::test]
    async fn test_results_without_analysis_go_to_dashboard() {
        let store = logged_in(SessionData::default()).await;
        let app = build_router(test_state(store, None));
        let response = app
            .oneshot(with_session(get("/ai/analysis-results/")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard/");
    }

    #[tokio::test]
    async fn test_results_return_stored_analysis() {
        let store = logged_in(SessionData {
            ai_analysis: Some(json!({"top_companies": [{"name": "Acme"}]})),
            analysis_timestamp: Some("2026-01-01 09:00:00.000000".to_string()),
            ..Default::default()
        })
        .await;
        let app = build_router(test_state(store, None));
        let response = app
            .oneshot(with_session(get("/ai/analysis-results/")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["top_companies"][0]["name"], "Acme");
        assert_eq!(body["study_plan"], json!({}));
    }

    #[tokio::test]
    async fn test_build_stores_selected_template() {
        let store = logged_in(SessionData::default()).await;
        let app = build_router(test_state(store.clone(), None));
        let response = app
            .oneshot(with_session(get("/build/modern_photo_style/")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard/");
        assert_eq!(
            store.sessions.read().await[SID].selected_template.as_deref(),
            Some("modern_photo_style")
        );
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let store = logged_in(SessionData::default()).await;
        let app = build_router(test_state(store.clone(), None));
        let response = app.oneshot(with_session(get("/logout/"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login/");
        assert!(store.sessions.read().await.is_empty());
    }
}
